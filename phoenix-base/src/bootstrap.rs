use std::sync::Arc;

use phoenix::{Container, ContainerOptions, Module, StdError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Config, ConfigSection, TracingConfig, init_tracing};

/// The `container` configuration section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: default_detect_cycles(),
        }
    }
}

impl ConfigSection for ContainerConfig {
    fn key() -> &'static str {
        "container"
    }
}

impl From<ContainerConfig> for ContainerOptions {
    fn from(value: ContainerConfig) -> Self {
        Self {
            detect_cycles: value.detect_cycles,
        }
    }
}

fn default_detect_cycles() -> bool {
    true
}

/// Builds a container from configuration.
///
/// The container options come from the `container` section, tracing is
/// installed when a `tracing` section is present, the [`Config`] itself is
/// registered as a shared instance, and the listed modules are registered in
/// order.
///
/// # Examples
///
/// ```rust
/// use phoenix::Catalog;
/// use phoenix_base::{Bootstrap, Config};
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), phoenix::StdError> {
/// let config = Config::parse(r#"{"container": {"detect_cycles": false}}"#)?;
/// let container = Bootstrap::new(config)
///     .module(Catalog::new("app"))
///     .build()?;
///
/// assert!(!container.options().detect_cycles);
/// let config = container.resolve::<Config>()?;
/// assert!(config.contains("container"));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct Bootstrap {
    config: Config,
    modules: Vec<Box<dyn Module>>,
}

impl Bootstrap {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            modules: Vec::new(),
        }
    }

    pub fn module<M>(mut self, module: M) -> Self
    where
        M: Module + 'static,
    {
        self.modules.push(Box::new(module));
        self
    }

    pub fn build(self) -> Result<Container, StdError> {
        if self.config.contains(TracingConfig::key()) {
            init_tracing(&self.config.section::<TracingConfig>()?)?;
        }
        let options: ContainerOptions = self.config.section::<ContainerConfig>()?.into();
        debug!("Building container with {:?}", options);
        let container = Container::with_options(options);
        container.register_instance::<Config>(Arc::new(self.config));
        for module in &self.modules {
            container.register_module(module.as_ref());
        }
        Ok(container)
    }

    /// Builds the container and installs it as the process-wide default.
    pub fn install_default(self) -> Result<&'static Container, StdError> {
        let container = self.build()?;
        phoenix::set_default(container)
            .map_err(|_| phoenix::ContainerError::AlreadyInitialized.into())
    }
}
