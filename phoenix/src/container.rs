use std::sync::{Arc, Weak};

use tracing::trace;

use crate::descriptor::upcast;
use crate::resolver::{ResolveContext, Resolver};
use crate::{
    ContainerError, ContainerOptions, Export, Implements, InjectionReport, Injectable, Instance,
    Module, Override, TypeKey,
};

/// Inversion-of-control container.
///
/// A container maps contracts (usually trait objects) to implementations and
/// builds object graphs on demand. `Container` is a cheap handle: clones refer
/// to the same registrations and cached instances.
///
/// # Examples
///
/// ```rust
/// use phoenix::{Container, Injectable};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Injectable)]
/// #[export(dyn Greeter)]
/// struct EnglishGreeter;
///
/// impl Greeter for EnglishGreeter {
///     fn greet(&self) -> String {
///         "Hello".into()
///     }
/// }
///
/// #[derive(Injectable)]
/// #[export(Self, NonShared)]
/// struct Welcome {
///     greeter: Arc<dyn Greeter>,
/// }
///
/// let container = Container::new();
/// container
///     .register_type::<dyn Greeter, EnglishGreeter>()
///     .register_type::<Welcome, Welcome>();
///
/// let first = container.resolve::<Welcome>().unwrap();
/// let second = container.resolve::<Welcome>().unwrap();
/// assert!(!Arc::ptr_eq(&first, &second));
/// assert!(Arc::ptr_eq(&first.greeter, &second.greeter));
/// assert_eq!(first.greeter.greet(), "Hello");
/// ```
#[derive(Clone)]
pub struct Container {
    resolver: Arc<Resolver>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        let container = Self {
            resolver: Arc::new(Resolver::new(options)),
        };
        container.register_instance::<ContainerRef>(Arc::new(container.downgrade()));
        container
    }

    /// Binds contract `C` to implementation `I`.
    ///
    /// The creation policy comes from the export declaration of `I`; without
    /// one, every resolution builds a new instance. If `C` is already bound,
    /// the earlier binding is kept. Use `register_type::<I, I>()` to make an
    /// implementation its own contract.
    pub fn register_type<C, I>(&self) -> &Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.resolver.register_type(
            TypeKey::of::<C>(),
            Arc::new(I::descriptor()),
            upcast::<C, I>,
            None,
        );
        self
    }

    /// Binds contract `C` to implementation `I`, replacing the export
    /// declaration of `I` with `export`.
    ///
    /// The instance is shared under the contract named by `export`, which may
    /// differ from `C`.
    pub fn register_type_with<C, I>(&self, export: Export) -> &Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.resolver.register_type(
            TypeKey::of::<C>(),
            Arc::new(I::descriptor()),
            upcast::<C, I>,
            Some(export),
        );
        self
    }

    /// Registers every exported type of `module` under its exported contract.
    pub fn register_module(&self, module: &dyn Module) -> &Self {
        self.resolver.register_module(module);
        self
    }

    /// Registers a pre-built object as the shared instance of contract `C`.
    pub fn register_instance<C>(&self, instance: Arc<C>) -> &Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolver
            .register_instance(TypeKey::of::<C>(), Instance::new(instance));
        self
    }

    pub fn resolve<C>(&self) -> Result<Arc<C>, ContainerError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Ok(self.resolve_reported::<C>(&[])?.value)
    }

    /// Resolves contract `C`, passing `overrides` to the constructor of its
    /// implementation by parameter name.
    pub fn resolve_with<C>(&self, overrides: &[Override]) -> Result<Arc<C>, ContainerError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Ok(self.resolve_reported::<C>(overrides)?.value)
    }

    /// Resolves contract `C` and returns the property injection failures of
    /// every object built along the way.
    pub fn resolve_reported<C>(
        &self,
        overrides: &[Override],
    ) -> Result<Resolved<C>, ContainerError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let contract = TypeKey::of::<C>();
        let _span = tracing::debug_span!("resolve", %contract).entered();
        let mut ctx = ResolveContext::default();
        let instance = self.resolver.resolve(contract, overrides, &mut ctx)?;
        let value = instance
            .downcast::<C>()
            .ok_or(ContainerError::ContractMismatch {
                contract,
                implementation: instance.contract(),
            })?;
        trace!("Type {} is resolved", contract);
        Ok(Resolved {
            value,
            reports: ctx.reports,
        })
    }

    pub fn is_registered<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        self.resolver.is_registered(TypeKey::of::<C>())
    }

    /// Checks whether the binding of `C` caches a single instance.
    pub fn is_shared<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        self.resolver.is_shared(TypeKey::of::<C>())
    }

    /// Checks whether the shared instance of `C` has already been built.
    pub fn is_instantiated<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        self.resolver.is_instantiated(TypeKey::of::<C>())
    }

    pub fn options(&self) -> &ContainerOptions {
        self.resolver.options()
    }

    pub fn downgrade(&self) -> ContainerRef {
        ContainerRef {
            resolver: Arc::downgrade(&self.resolver),
        }
    }

    /// Checks whether both handles refer to the same container.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.resolver, &other.resolver)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak handle to a container.
///
/// Every container registers a `ContainerRef` to itself, so types can depend
/// on the container that builds them without keeping it alive.
#[derive(Clone)]
pub struct ContainerRef {
    resolver: Weak<Resolver>,
}

impl ContainerRef {
    pub fn upgrade(&self) -> Option<Container> {
        self.resolver.upgrade().map(|resolver| Container { resolver })
    }
}

/// Resolved value together with the property injection failures of the graph.
pub struct Resolved<C>
where
    C: ?Sized,
{
    pub value: Arc<C>,
    pub reports: Vec<InjectionReport>,
}

impl<C> Resolved<C>
where
    C: ?Sized,
{
    /// Returns `true` when every object of the graph was injected without errors.
    pub fn is_clean(&self) -> bool {
        self.reports.is_empty()
    }
}
