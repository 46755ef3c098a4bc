use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::descriptor::Upcast;
use crate::{ContainerError, TypeKey};

/// Registered association contract -> implementation.
#[derive(Clone, Copy)]
pub(crate) struct Binding {
    pub(crate) implementation: TypeKey,
    /// Missing for bindings created from pre-built instances.
    pub(crate) upcast: Option<Upcast>,
}

/// Mapping from contract identity to its single binding.
#[derive(Default)]
pub(crate) struct Registry {
    bindings: DashMap<TypeKey, Binding>,
}

impl Registry {
    /// Adds the binding unless the contract is already bound.
    ///
    /// Returns `false` when an earlier binding was kept.
    pub(crate) fn bind(&self, contract: TypeKey, binding: Binding) -> bool {
        match self.bindings.entry(contract) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(binding);
                true
            }
        }
    }

    pub(crate) fn lookup(&self, contract: TypeKey) -> Result<Binding, ContainerError> {
        self.bindings
            .get(&contract)
            .map(|v| *v.value())
            .ok_or(ContainerError::NotRegistered { contract })
    }

    pub(crate) fn has_binding(&self, contract: TypeKey) -> bool {
        self.bindings.contains_key(&contract)
    }
}
