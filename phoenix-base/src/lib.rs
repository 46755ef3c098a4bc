//! # phoenix-base
//!
//! Configuration and observability for phoenix containers.
//!
//! ## Core Components
//!
//! - **Configuration System**: Sectioned JSON configuration loaded from strings or files
//! - **Tracing Integration**: Structured logging set up from the `tracing` section
//! - **Bootstrap**: Builds a container from configuration and a list of modules
//!
//! ## Quick Start
//!
//! ```rust
//! use phoenix::{Catalog, Injectable};
//! use phoenix_base::{Bootstrap, Config, ConfigSection};
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Default, Deserialize)]
//! struct DatabaseConfig {
//!     url: String,
//! }
//!
//! impl ConfigSection for DatabaseConfig {
//!     fn key() -> &'static str {
//!         "database"
//!     }
//! }
//!
//! #[derive(Injectable)]
//! #[export(Self)]
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! # fn example() -> Result<(), phoenix::StdError> {
//! let config = Config::parse(r#"{"database": {"url": "sqlite::memory:"}}"#)?;
//! let container = Bootstrap::new(config)
//!     .module(Catalog::new("app").with::<Database>())
//!     .build()?;
//!
//! let database = container.resolve::<Database>()?;
//! let section = database.config.section::<DatabaseConfig>()?;
//! assert_eq!(section.url, "sqlite::memory:");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod bootstrap;
mod config;
mod tracing;

pub use bootstrap::*;
pub use config::*;
pub use tracing::*;
