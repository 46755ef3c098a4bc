use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::ReentrantMutex;

use crate::{Instance, TypeKey};

type Pair = (TypeKey, TypeKey);

struct CachedInstance {
    instantiated: bool,
    object: Option<Instance>,
    build_lock: Arc<ReentrantMutex<()>>,
}

/// Cached instances of shareable (contract, implementation) pairs.
#[derive(Default)]
pub(crate) struct InstanceStore {
    entries: DashMap<Pair, CachedInstance>,
}

impl InstanceStore {
    /// Creates an empty placeholder for the pair.
    ///
    /// Returns `false` when the pair was already shareable.
    pub(crate) fn mark_shareable(&self, contract: TypeKey, implementation: TypeKey) -> bool {
        let mut created = false;
        self.entries
            .entry((contract, implementation))
            .or_insert_with(|| {
                created = true;
                CachedInstance {
                    instantiated: false,
                    object: None,
                    build_lock: Arc::new(ReentrantMutex::new(())),
                }
            });
        created
    }

    pub(crate) fn is_shareable(&self, contract: TypeKey, implementation: TypeKey) -> bool {
        self.entries.contains_key(&(contract, implementation))
    }

    pub(crate) fn get(&self, contract: TypeKey, implementation: TypeKey) -> Option<Instance> {
        self.entries
            .get(&(contract, implementation))
            .and_then(|v| v.object.clone())
    }

    /// Stores the built instance of a shareable pair.
    ///
    /// # Panics
    ///
    /// Panics if the pair was never marked shareable.
    pub(crate) fn set(&self, contract: TypeKey, implementation: TypeKey, instance: Instance) {
        match self.entries.get_mut(&(contract, implementation)) {
            Some(mut entry) => {
                entry.instantiated = true;
                entry.object = Some(instance);
            }
            None => panic!("Instance of {contract} ({implementation}) is not shareable"),
        }
    }

    /// Resets the pair to an empty placeholder.
    pub(crate) fn clear(&self, contract: TypeKey, implementation: TypeKey) {
        if let Some(mut entry) = self.entries.get_mut(&(contract, implementation)) {
            entry.instantiated = false;
            entry.object = None;
        }
    }

    pub(crate) fn is_instantiated(&self, contract: TypeKey, implementation: TypeKey) -> bool {
        self.entries
            .get(&(contract, implementation))
            .is_some_and(|v| v.instantiated)
    }

    /// Lock serializing construction of a shareable pair.
    pub(crate) fn build_lock(
        &self,
        contract: TypeKey,
        implementation: TypeKey,
    ) -> Option<Arc<ReentrantMutex<()>>> {
        self.entries
            .get(&(contract, implementation))
            .map(|v| v.build_lock.clone())
    }
}
