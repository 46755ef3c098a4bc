//! Statically supplied type metadata consumed by the resolver.
//!
//! A [`TypeDescriptor`] tells the container everything it needs to know about
//! an implementation: which contract it exports and with which
//! [`CreationPolicy`], how to construct it, which properties to inject after
//! construction, and whether to notify it once injection is done.
//!
//! Descriptors are usually generated with `#[derive(Injectable)]`, but can be
//! written by hand:
//!
//! ```rust
//! use phoenix::{
//!     Container, ConstructorDescriptor, Export, Import, Injectable, TypeDescriptor, implements,
//! };
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! implements!(FixedClock: dyn Clock);
//!
//! impl Injectable for FixedClock {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>()
//!             .export(Export::shared::<dyn Clock, Self>())
//!             .constructor(ConstructorDescriptor::new(|_| Ok(FixedClock)))
//!             .build()
//!     }
//! }
//!
//! struct Scheduler {
//!     clock: Import<dyn Clock>,
//! }
//!
//! impl Injectable for Scheduler {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::builder::<Self>()
//!             .constructor(ConstructorDescriptor::new(|_| {
//!                 Ok(Scheduler { clock: Import::new() })
//!             }))
//!             .import::<dyn Clock>("clock", |this| &this.clock)
//!             .build()
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_type::<dyn Clock, FixedClock>()
//!     .register_type::<Scheduler, Scheduler>();
//!
//! let scheduler = container.resolve::<Scheduler>().unwrap();
//! assert_eq!(scheduler.clock.get().unwrap().now(), 42);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::{ContainerError, Instance, Object, PropertyError, StdError, TypeKey};

/// Controls whether a contract/implementation pair caches a single instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CreationPolicy {
    /// One instance per container, built on first resolution.
    #[default]
    Shared,
    /// A fresh instance for every resolution.
    NonShared,
}

/// Conversion of a built implementation into one of its contracts.
///
/// Every type implements `Implements<Self>`. Implementations of trait-object
/// contracts are declared with [`implements!`](crate::implements) or generated
/// by `#[derive(Injectable)]`.
pub trait Implements<C>: Send + Sync + 'static
where
    C: ?Sized,
{
    fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T> Implements<T> for T
where
    T: Send + Sync + 'static,
{
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares that implementation types can be used as trait-object contracts.
///
/// ```rust
/// use phoenix::implements;
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// struct File;
///
/// impl Reader for File {}
/// impl Writer for File {}
///
/// implements!(File: dyn Reader, dyn Writer);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty: $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$contract> for $implementation {
                fn upcast(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}

pub(crate) type Upcast = fn(Object) -> Option<Instance>;

pub(crate) fn upcast<C, I>(object: Object) -> Option<Instance>
where
    C: ?Sized + Send + Sync + 'static,
    I: Implements<C>,
{
    let object = object.downcast::<I>().ok()?;
    Some(Instance::new::<C>(<I as Implements<C>>::upcast(object)))
}

/// Export declaration attached to an implementation.
///
/// The declaration names the contract under which the implementation is
/// registered by module scanning, and the contract under which it is shared
/// when the policy is [`CreationPolicy::Shared`].
#[derive(Clone, Copy)]
pub struct Export {
    contract: TypeKey,
    policy: CreationPolicy,
    upcast: Upcast,
}

impl Export {
    pub fn new<C, I>(policy: CreationPolicy) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        Self {
            contract: TypeKey::of::<C>(),
            policy,
            upcast: upcast::<C, I>,
        }
    }

    pub fn shared<C, I>() -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        Self::new::<C, I>(CreationPolicy::Shared)
    }

    pub fn non_shared<C, I>() -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        Self::new::<C, I>(CreationPolicy::NonShared)
    }

    pub fn contract(&self) -> TypeKey {
        self.contract
    }

    pub fn policy(&self) -> CreationPolicy {
        self.policy
    }

    pub(crate) fn upcast(&self) -> Upcast {
        self.upcast
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export")
            .field("contract", &self.contract)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Named constructor parameter.
#[derive(Clone, Copy, Debug)]
pub struct Parameter {
    name: &'static str,
    contract: TypeKey,
}

impl Parameter {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contract(&self) -> TypeKey {
        self.contract
    }
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    implementation: TypeKey,
    values: std::vec::IntoIter<(Parameter, Instance)>,
}

impl Arguments {
    pub(crate) fn new(implementation: TypeKey, values: Vec<(Parameter, Instance)>) -> Self {
        Self {
            implementation,
            values: values.into_iter(),
        }
    }

    /// Takes the next argument as contract `C`.
    pub fn next<C>(&mut self) -> Result<Arc<C>, ContainerError>
    where
        C: ?Sized + 'static,
    {
        let expected = TypeKey::of::<C>();
        match self.values.next() {
            Some((parameter, value)) => {
                value
                    .downcast::<C>()
                    .ok_or(ContainerError::ArgumentMismatch {
                        implementation: self.implementation,
                        parameter: parameter.name,
                        expected,
                    })
            }
            None => Err(ContainerError::ArgumentMismatch {
                implementation: self.implementation,
                parameter: "<missing>",
                expected,
            }),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

type Invoke = Arc<dyn Fn(&mut Arguments) -> Result<Object, StdError> + Send + Sync>;

/// Constructor of an implementation: ordered parameters plus the function
/// building the object from resolved arguments.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    parameters: Vec<Parameter>,
    preferred: bool,
    invoke: Invoke,
}

impl ConstructorDescriptor {
    pub fn new<T, F>(build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Arguments) -> Result<T, StdError> + Send + Sync + 'static,
    {
        Self {
            parameters: Vec::new(),
            preferred: false,
            invoke: Arc::new(move |args| Ok(Arc::new(build(args)?) as Object)),
        }
    }

    /// Appends a parameter resolved as contract `C` unless overridden by `name`.
    pub fn param<C>(mut self, name: &'static str) -> Self
    where
        C: ?Sized + 'static,
    {
        self.parameters.push(Parameter {
            name,
            contract: TypeKey::of::<C>(),
        });
        self
    }

    /// Marks this constructor as the preferred injection constructor.
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn is_preferred(&self) -> bool {
        self.preferred
    }

    pub(crate) fn invoke(&self, args: &mut Arguments) -> Result<Object, StdError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("parameters", &self.parameters)
            .field("preferred", &self.preferred)
            .finish_non_exhaustive()
    }
}

/// Slot for a property-injected dependency.
///
/// The slot starts empty and can be filled once. The container only fills
/// slots that are still empty.
pub struct Import<C>
where
    C: ?Sized,
{
    slot: OnceLock<Arc<C>>,
}

impl<C> Import<C>
where
    C: ?Sized,
{
    pub fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Creates a slot that is already filled and will be skipped by injection.
    pub fn with(value: Arc<C>) -> Self {
        Self {
            slot: OnceLock::from(value),
        }
    }

    pub fn get(&self) -> Option<&Arc<C>> {
        self.slot.get()
    }

    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Fills the slot, handing the value back if it was already filled.
    pub fn set(&self, value: Arc<C>) -> Result<(), Arc<C>> {
        self.slot.set(value)
    }
}

impl<C> Default for Import<C>
where
    C: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Import<C>
where
    C: ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Import")
            .field("set", &self.is_set())
            .finish()
    }
}

type IsSet = Arc<dyn Fn(&Object) -> Result<bool, PropertyError> + Send + Sync>;
type Assign = Arc<dyn Fn(&Object, Instance) -> Result<(), PropertyError> + Send + Sync>;

/// Import-marked property injected after construction.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: &'static str,
    contract: TypeKey,
    is_set: IsSet,
    assign: Assign,
}

impl PropertyDescriptor {
    /// Property backed by an [`Import`] slot.
    pub fn import<T, C>(name: &'static str, slot: fn(&T) -> &Import<C>) -> Self
    where
        T: Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
    {
        Self::with_accessors::<T, C, _, _>(
            name,
            move |this| Ok(slot(this).is_set()),
            move |this, value| slot(this).set(value).map_err(|_| PropertyError::AlreadySet),
        )
    }

    /// Property with custom accessors, which may refuse access.
    pub fn with_accessors<T, C, G, S>(name: &'static str, is_set: G, assign: S) -> Self
    where
        T: Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
        G: Fn(&T) -> Result<bool, PropertyError> + Send + Sync + 'static,
        S: Fn(&T, Arc<C>) -> Result<(), PropertyError> + Send + Sync + 'static,
    {
        Self {
            name,
            contract: TypeKey::of::<C>(),
            is_set: Arc::new(move |object| is_set(downcast_object::<T>(object)?)),
            assign: Arc::new(move |object, value| {
                let value = value.downcast::<C>().ok_or(PropertyError::TypeMismatch {
                    expected: TypeKey::of::<C>(),
                })?;
                assign(downcast_object::<T>(object)?, value)
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn contract(&self) -> TypeKey {
        self.contract
    }

    pub(crate) fn is_set(&self, object: &Object) -> Result<bool, PropertyError> {
        (self.is_set)(object)
    }

    pub(crate) fn assign(&self, object: &Object, value: Instance) -> Result<(), PropertyError> {
        (self.assign)(object, value)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

fn downcast_object<T>(object: &Object) -> Result<&T, PropertyError>
where
    T: Any,
{
    object
        .downcast_ref::<T>()
        .ok_or(PropertyError::TypeMismatch {
            expected: TypeKey::of::<T>(),
        })
}

/// Completion notification invoked once property injection has finished.
pub trait NotifyImportsCompleted: Send + Sync {
    /// Called with `true` when every import property was injected without
    /// errors.
    fn on_imports_completed(&self, succeeded: bool);
}

type OnCompleted = Arc<dyn Fn(&Object, bool) + Send + Sync>;

/// Everything the container knows about an implementation type.
#[derive(Clone)]
pub struct TypeDescriptor {
    implementation: TypeKey,
    export: Option<Export>,
    constructors: Vec<ConstructorDescriptor>,
    properties: Vec<PropertyDescriptor>,
    on_completed: Option<OnCompleted>,
}

impl TypeDescriptor {
    pub fn builder<T>() -> TypeDescriptorBuilder<T>
    where
        T: Send + Sync + 'static,
    {
        TypeDescriptorBuilder {
            descriptor: TypeDescriptor {
                implementation: TypeKey::of::<T>(),
                export: None,
                constructors: Vec::new(),
                properties: Vec::new(),
                on_completed: None,
            },
            _marker: PhantomData,
        }
    }

    pub fn implementation(&self) -> TypeKey {
        self.implementation
    }

    pub fn export(&self) -> Option<&Export> {
        self.export.as_ref()
    }

    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn notifies_completion(&self) -> bool {
        self.on_completed.is_some()
    }

    /// Picks the injection constructor.
    ///
    /// A single preferred constructor wins; otherwise the first declared one
    /// is used. More than one preferred constructor is an error.
    pub fn select_constructor(&self) -> Result<Option<&ConstructorDescriptor>, ContainerError> {
        let mut preferred = self.constructors.iter().filter(|c| c.is_preferred());
        match (preferred.next(), preferred.next()) {
            (Some(_), Some(_)) => Err(ContainerError::AmbiguousConstructor {
                implementation: self.implementation,
            }),
            (Some(constructor), None) => Ok(Some(constructor)),
            (None, _) => Ok(self.constructors.first()),
        }
    }

    pub(crate) fn notify_completed(&self, object: &Object, succeeded: bool) {
        if let Some(on_completed) = &self.on_completed {
            on_completed(object, succeeded);
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("implementation", &self.implementation)
            .field("export", &self.export)
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .field("notifies_completion", &self.notifies_completion())
            .finish()
    }
}

pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypeDescriptorBuilder<T>
where
    T: Send + Sync + 'static,
{
    pub fn export(mut self, export: Export) -> Self {
        self.descriptor.export = Some(export);
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.descriptor.constructors.push(constructor);
        self
    }

    pub fn constructors(mut self, constructors: impl IntoIterator<Item = ConstructorDescriptor>) -> Self {
        self.descriptor.constructors.extend(constructors);
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.descriptor.properties.push(property);
        self
    }

    pub fn import<C>(self, name: &'static str, slot: fn(&T) -> &Import<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.property(PropertyDescriptor::import::<T, C>(name, slot))
    }

    pub fn notify_imports_completed(mut self) -> Self
    where
        T: NotifyImportsCompleted,
    {
        self.descriptor.on_completed = Some(Arc::new(|object, succeeded| {
            if let Some(this) = object.downcast_ref::<T>() {
                this.on_imports_completed(succeeded);
            }
        }));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

/// Types that describe how the container builds them.
pub trait Injectable: Send + Sync + Sized + 'static {
    fn descriptor() -> TypeDescriptor;
}

/// Constructor list of a type, generated by `#[constructors]`.
pub trait Constructors: Send + Sync + Sized + 'static {
    fn constructors() -> Vec<ConstructorDescriptor>;
}
