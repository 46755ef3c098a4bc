use std::any::type_name;
use std::sync::Arc;

use crate::{Injectable, TypeDescriptor};

/// Source of candidate implementation types for bulk registration.
///
/// [`Container::register_module`](crate::Container::register_module) registers
/// every yielded descriptor that carries an [`Export`](crate::Export) under its
/// exported contract; descriptors without one are skipped.
pub trait Module {
    fn types(&self) -> Vec<Arc<TypeDescriptor>>;

    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// Module assembled from explicitly listed types.
///
/// # Examples
///
/// ```rust
/// use phoenix::{Catalog, Container, Injectable};
///
/// #[derive(Injectable)]
/// #[export(Self)]
/// struct Settings;
///
/// let catalog = Catalog::new("settings").with::<Settings>();
///
/// let container = Container::new();
/// container.register_module(&catalog);
/// assert!(container.is_registered::<Settings>());
/// ```
#[derive(Clone, Default)]
pub struct Catalog {
    name: String,
    types: Vec<Arc<TypeDescriptor>>,
}

impl Catalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn with<T>(self) -> Self
    where
        T: Injectable,
    {
        self.with_descriptor(T::descriptor())
    }

    pub fn with_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.push(Arc::new(descriptor));
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Module for Catalog {
    fn types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.types.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
