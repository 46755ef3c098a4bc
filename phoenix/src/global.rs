use std::sync::OnceLock;

use tracing::debug;

use crate::{Container, ContainerError, Module};

static DEFAULT_CONTAINER: OnceLock<Container> = OnceLock::new();

/// Returns the process-wide default container, creating it on first access.
///
/// The default container is created at most once. Unless it was seeded with
/// [`init_default`] or [`set_default`], it starts with only its own
/// [`ContainerRef`](crate::ContainerRef) registered.
///
/// # Examples
///
/// ```rust
/// use phoenix::{ContainerRef, default_container};
///
/// let container = default_container();
/// let this = container.resolve::<ContainerRef>().unwrap();
/// assert!(this.upgrade().unwrap().ptr_eq(container));
/// ```
pub fn default_container() -> &'static Container {
    DEFAULT_CONTAINER.get_or_init(|| {
        debug!("Creating default container");
        Container::new()
    })
}

/// Creates the default container from `module` unless it already exists.
pub fn init_default(module: &dyn Module) -> Result<&'static Container, ContainerError> {
    let container = Container::new();
    container.register_module(module);
    set_default(container).map_err(|_| ContainerError::AlreadyInitialized)
}

/// Installs `container` as the default container.
///
/// Gives the container back if the default container already exists.
pub fn set_default(container: Container) -> Result<&'static Container, Container> {
    DEFAULT_CONTAINER.set(container)?;
    Ok(default_container())
}

/// Creates an independent container that shares nothing with the default one.
pub fn create_container() -> Container {
    Container::new()
}
