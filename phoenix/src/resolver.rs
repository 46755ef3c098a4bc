use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::descriptor::Upcast;
use crate::registry::{Binding, Registry};
use crate::store::InstanceStore;
use crate::{
    Arguments, ConstructorDescriptor, ContainerError, CreationPolicy, Export, Instance, Module,
    Object, PropertyError, TypeDescriptor, TypeKey,
};

/// Resolution behavior of a container.
#[derive(Clone, Debug)]
pub struct ContainerOptions {
    /// Fail with [`ContainerError::CyclicDependency`] instead of recursing
    /// when a contract is requested while it is still being built.
    ///
    /// The build path is tracked per resolve call, so a cycle closed through
    /// a nested call on [`ContainerRef::upgrade`](crate::ContainerRef::upgrade)
    /// is not detected.
    pub detect_cycles: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            detect_cycles: true,
        }
    }
}

/// Caller-supplied value for a named constructor parameter of the root
/// contract of a resolve call.
///
/// # Examples
///
/// ```rust
/// use phoenix::Override;
/// use std::sync::Arc;
///
/// let name = Override::new::<String>("name", Arc::new("phoenix".to_string()));
/// assert_eq!(name.name(), "name");
/// ```
#[derive(Clone, Debug)]
pub struct Override {
    name: String,
    value: Instance,
}

impl Override {
    pub fn new<C>(name: impl Into<String>, value: Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value: Instance::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Instance {
        &self.value
    }
}

/// Property that could not be injected.
#[derive(Debug)]
pub struct PropertyFailure {
    pub property: &'static str,
    pub error: PropertyError,
}

/// Outcome of property injection for one constructed object.
#[derive(Debug)]
pub struct InjectionReport {
    implementation: TypeKey,
    failures: Vec<PropertyFailure>,
}

impl InjectionReport {
    fn new(implementation: TypeKey) -> Self {
        Self {
            implementation,
            failures: Vec::new(),
        }
    }

    pub fn implementation(&self) -> TypeKey {
        self.implementation
    }

    pub fn failures(&self) -> &[PropertyFailure] {
        &self.failures
    }

    /// Returns `true` when every import property was injected.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, property: &'static str, error: PropertyError) {
        warn!(
            "Property {} of {} could not be injected: {}",
            property, self.implementation, error
        );
        self.failures.push(PropertyFailure { property, error });
    }
}

/// State of a single resolve call.
#[derive(Default)]
pub(crate) struct ResolveContext {
    building: Vec<(TypeKey, TypeKey)>,
    pub(crate) reports: Vec<InjectionReport>,
}

impl ResolveContext {
    fn enter(
        &mut self,
        detect_cycles: bool,
        contract: TypeKey,
        implementation: TypeKey,
    ) -> Result<(), ContainerError> {
        if detect_cycles
            && let Some(start) = self
                .building
                .iter()
                .position(|v| *v == (contract, implementation))
        {
            let mut path: Vec<_> = self.building[start..].iter().map(|v| v.0).collect();
            path.push(contract);
            return Err(ContainerError::CyclicDependency { path });
        }
        self.building.push((contract, implementation));
        Ok(())
    }

    fn leave(&mut self) {
        self.building.pop();
    }
}

/// Registration bookkeeping and the recursive object-graph builder.
pub(crate) struct Resolver {
    registry: Registry,
    store: InstanceStore,
    types: DashMap<TypeKey, Arc<TypeDescriptor>>,
    options: ContainerOptions,
}

impl Resolver {
    pub(crate) fn new(options: ContainerOptions) -> Self {
        Self {
            registry: Registry::default(),
            store: InstanceStore::default(),
            types: DashMap::new(),
            options,
        }
    }

    pub(crate) fn options(&self) -> &ContainerOptions {
        &self.options
    }

    pub(crate) fn is_registered(&self, contract: TypeKey) -> bool {
        self.registry.has_binding(contract)
    }

    pub(crate) fn is_shared(&self, contract: TypeKey) -> bool {
        self.registry
            .lookup(contract)
            .is_ok_and(|v| self.store.is_shareable(contract, v.implementation))
    }

    pub(crate) fn is_instantiated(&self, contract: TypeKey) -> bool {
        self.registry
            .lookup(contract)
            .is_ok_and(|v| self.store.is_instantiated(contract, v.implementation))
    }

    pub(crate) fn register_type(
        &self,
        contract: TypeKey,
        descriptor: Arc<TypeDescriptor>,
        upcast: Upcast,
        export_override: Option<Export>,
    ) {
        let implementation = descriptor.implementation();
        let export = export_override.or_else(|| descriptor.export().copied());
        self.types.entry(implementation).or_insert(descriptor);
        if let Some(export) = export
            && export.policy() == CreationPolicy::Shared
            && self.store.mark_shareable(export.contract(), implementation)
        {
            debug!("Type {} is shared as {}", implementation, export.contract());
        }
        let binding = Binding {
            implementation,
            upcast: Some(upcast),
        };
        if self.registry.bind(contract, binding) {
            debug!("Type {} is registered as {}", implementation, contract);
        } else {
            trace!(
                "Type {} is already registered, ignoring {}",
                contract, implementation
            );
        }
    }

    pub(crate) fn register_instance(&self, contract: TypeKey, instance: Instance) {
        let binding = Binding {
            implementation: contract,
            upcast: None,
        };
        if self.registry.bind(contract, binding) {
            debug!("Instance of {} is registered", contract);
        }
        let implementation = self
            .registry
            .lookup(contract)
            .map_or(contract, |v| v.implementation);
        self.store.mark_shareable(contract, implementation);
        self.store.set(contract, implementation, instance);
    }

    pub(crate) fn register_module(&self, module: &dyn Module) {
        debug!("Registering module {}", module.name());
        for descriptor in module.types() {
            let export = match descriptor.export() {
                Some(v) => *v,
                None => {
                    trace!(
                        "Type {} has no export declaration, skipping",
                        descriptor.implementation()
                    );
                    continue;
                }
            };
            self.register_type(export.contract(), descriptor, export.upcast(), None);
        }
    }

    pub(crate) fn resolve(
        &self,
        contract: TypeKey,
        overrides: &[Override],
        ctx: &mut ResolveContext,
    ) -> Result<Instance, ContainerError> {
        let binding = self.registry.lookup(contract)?;
        let implementation = binding.implementation;
        let descriptor = self.types.get(&implementation).map(|v| v.value().clone());
        let constructor = match &descriptor {
            Some(v) => v.select_constructor()?,
            None => None,
        };
        if let Some(instance) = self.store.get(contract, implementation) {
            trace!("Type {} is resolved from cache", contract);
            return Ok(instance);
        }
        let build_lock = self.store.build_lock(contract, implementation);
        let _guard = build_lock.as_deref().map(|v| v.lock());
        if build_lock.is_some()
            && let Some(instance) = self.store.get(contract, implementation)
        {
            trace!("Type {} was built concurrently", contract);
            return Ok(instance);
        }
        let (Some(descriptor), Some(constructor), Some(upcast)) =
            (&descriptor, constructor, binding.upcast)
        else {
            return Err(ContainerError::NoConstructor { implementation });
        };
        let _span = tracing::debug_span!("build", %contract, %implementation).entered();
        ctx.enter(self.options.detect_cycles, contract, implementation)?;
        let result = self.build(
            contract,
            descriptor,
            constructor,
            upcast,
            overrides,
            build_lock.is_some(),
            ctx,
        );
        ctx.leave();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        contract: TypeKey,
        descriptor: &TypeDescriptor,
        constructor: &ConstructorDescriptor,
        upcast: Upcast,
        overrides: &[Override],
        shared: bool,
        ctx: &mut ResolveContext,
    ) -> Result<Instance, ContainerError> {
        let implementation = descriptor.implementation();
        let mut values = Vec::with_capacity(constructor.parameters().len());
        for parameter in constructor.parameters() {
            let value = match overrides.iter().find(|v| v.name() == parameter.name()) {
                Some(v) if v.value().contract() != parameter.contract() => {
                    return Err(ContainerError::OverrideMismatch {
                        parameter: v.name().to_owned(),
                        expected: parameter.contract(),
                        found: v.value().contract(),
                    });
                }
                Some(v) => v.value().clone(),
                None => self.resolve(parameter.contract(), &[], ctx)?,
            };
            values.push((*parameter, value));
        }
        let object = constructor
            .invoke(&mut Arguments::new(implementation, values))
            .map_err(|source| ContainerError::Construction {
                implementation,
                source,
            })?;
        let instance = upcast(object.clone()).ok_or(ContainerError::ContractMismatch {
            contract,
            implementation,
        })?;
        debug!("Type {} is constructed", implementation);
        if shared {
            self.store.set(contract, implementation, instance.clone());
        }
        let report = match self.inject_properties(descriptor, &object, ctx) {
            Ok(report) => report,
            Err(err) => {
                if shared {
                    self.store.clear(contract, implementation);
                    debug!("Type {} is evicted after a failed build", implementation);
                }
                return Err(err);
            }
        };
        if descriptor.notifies_completion() {
            descriptor.notify_completed(&object, report.is_clean());
        }
        if !report.is_clean() {
            ctx.reports.push(report);
        }
        Ok(instance)
    }

    fn inject_properties(
        &self,
        descriptor: &TypeDescriptor,
        object: &Object,
        ctx: &mut ResolveContext,
    ) -> Result<InjectionReport, ContainerError> {
        let mut report = InjectionReport::new(descriptor.implementation());
        for property in descriptor.properties() {
            match property.is_set(object) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    report.record(property.name(), err);
                    continue;
                }
            }
            let value = self.resolve(property.contract(), &[], ctx)?;
            if let Err(err) = property.assign(object, value) {
                report.record(property.name(), err);
            }
        }
        Ok(report)
    }
}
