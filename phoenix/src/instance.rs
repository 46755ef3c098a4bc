use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::TypeKey;

/// Type-erased implementation object as returned by a constructor.
pub type Object = Arc<dyn Any + Send + Sync>;

/// Type-erased handle to a resolved contract value.
///
/// An `Instance` wraps an `Arc<C>` for some contract `C` (which may be a trait
/// object) and remembers the contract it was created for. Cloning an instance
/// clones the inner `Arc`, so every clone refers to the same object.
///
/// # Examples
///
/// ```rust
/// use phoenix::Instance;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "Hello".into()
///     }
/// }
///
/// let instance = Instance::new::<dyn Greeter>(Arc::new(English));
/// let greeter = instance.downcast::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "Hello");
/// assert!(instance.downcast::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Instance {
    contract: TypeKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<C>(value: Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            contract: TypeKey::of::<C>(),
            value: Arc::new(value),
        }
    }

    /// Returns the contract this instance was created for.
    pub fn contract(&self) -> TypeKey {
        self.contract
    }

    /// Returns the wrapped value if it was created for contract `C`.
    pub fn downcast<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + 'static,
    {
        self.value.downcast_ref::<Arc<C>>().cloned()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}
