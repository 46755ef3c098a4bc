//! # phoenix
//!
//! An inversion-of-control container: it maps contracts to implementations,
//! builds object graphs on demand with constructor and property injection, and
//! caches instances according to a per-binding creation policy.
//!
//! ## Core Concepts
//!
//! - **Container**: Holds bindings and cached instances, and resolves contracts
//! - **Contract**: The type client code depends on, usually a trait object such as `dyn Greeter`
//! - **Implementation**: A concrete type described by a [`TypeDescriptor`]
//! - **Export**: The contract and [`CreationPolicy`] an implementation declares
//! - **Import**: A property slot filled by the container after construction
//!
//! ## Basic Usage
//!
//! ```rust
//! use phoenix::{Container, Injectable};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! #[derive(Injectable)]
//! #[export(dyn Greeter)]
//! struct EnglishGreeter;
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self, name: &str) -> String {
//!         format!("Hello, {name}!")
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_type::<dyn Greeter, EnglishGreeter>();
//!
//! let greeter = container.resolve::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet("world"), "Hello, world!");
//!
//! // Shared by default: the same instance is returned every time.
//! assert!(Arc::ptr_eq(&greeter, &container.resolve::<dyn Greeter>().unwrap()));
//! ```
//!
//! ## Constructors, Imports and Overrides
//!
//! ```rust
//! use phoenix::{Container, Import, Injectable, NotifyImportsCompleted, Override};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(Injectable)]
//! #[export(dyn Clock)]
//! struct SystemClock;
//!
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 {
//!         1
//!     }
//! }
//!
//! #[derive(Injectable)]
//! #[export(Self, NonShared)]
//! #[injectable(notify)]
//! struct Job {
//!     name: Arc<String>,
//!     #[import]
//!     clock: Import<dyn Clock>,
//!     #[inject(default)]
//!     ready: AtomicBool,
//! }
//!
//! impl NotifyImportsCompleted for Job {
//!     fn on_imports_completed(&self, succeeded: bool) {
//!         self.ready.store(succeeded, Ordering::SeqCst);
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_type::<dyn Clock, SystemClock>()
//!     .register_type::<Job, Job>();
//!
//! let job = container
//!     .resolve_with::<Job>(&[Override::new("name", Arc::new("backup".to_string()))])
//!     .unwrap();
//! assert_eq!(job.name.as_str(), "backup");
//! assert_eq!(job.clock.get().unwrap().now(), 1);
//! assert!(job.ready.load(Ordering::SeqCst));
//! ```
//!
//! ## Features
//!
//! - `macros` (default): Enables `#[derive(Injectable)]` and `#[constructors]`

mod container;
mod descriptor;
mod error;
mod global;
mod instance;
mod key;
mod module;
mod registry;
mod resolver;
mod store;

pub use container::*;
pub use descriptor::*;
pub use error::*;
pub use global::*;
pub use instance::*;
pub use key::*;
pub use module::*;
pub use resolver::{ContainerOptions, InjectionReport, Override, PropertyFailure};

#[cfg(feature = "macros")]
pub use phoenix_macros::*;
