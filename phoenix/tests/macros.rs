use phoenix::{
    Container, ContainerError, CreationPolicy, Import, Injectable, NotifyImportsCompleted,
    Override, StdError, TypeKey, constructors,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

trait Storage: Send + Sync {
    fn name(&self) -> &str;
}

#[derive(Injectable)]
#[export(dyn Storage)]
struct MemoryStorage;

impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }
}

trait Metrics: Send + Sync {
    fn record(&self);
    fn count(&self) -> usize;
}

#[derive(Injectable)]
#[export(dyn Metrics, NonShared)]
struct CounterMetrics {
    #[inject(default)]
    count: AtomicUsize,
}

impl Metrics for CounterMetrics {
    fn record(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[derive(Injectable)]
#[export(Self)]
#[injectable(notify)]
struct Repository {
    storage: Arc<dyn Storage>,
    #[import]
    metrics: Import<dyn Metrics>,
    #[inject(default)]
    ready: AtomicBool,
}

impl NotifyImportsCompleted for Repository {
    fn on_imports_completed(&self, succeeded: bool) {
        self.ready.store(succeeded, Ordering::SeqCst);
    }
}

#[test]
fn test_derive_descriptor() {
    let descriptor = Repository::descriptor();
    assert_eq!(descriptor.implementation(), TypeKey::of::<Repository>());
    let export = descriptor.export().unwrap();
    assert_eq!(export.contract(), TypeKey::of::<Repository>());
    assert_eq!(export.policy(), CreationPolicy::Shared);
    assert_eq!(descriptor.constructors().len(), 1);
    let parameters = descriptor.constructors()[0].parameters();
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].name(), "storage");
    assert_eq!(parameters[0].contract(), TypeKey::of::<dyn Storage>());
    assert_eq!(descriptor.properties().len(), 1);
    assert_eq!(descriptor.properties()[0].name(), "metrics");
    assert!(descriptor.notifies_completion());

    let metrics = CounterMetrics::descriptor();
    assert_eq!(
        metrics.export().unwrap().contract(),
        TypeKey::of::<dyn Metrics>()
    );
    assert_eq!(metrics.export().unwrap().policy(), CreationPolicy::NonShared);
    assert!(!metrics.notifies_completion());
}

#[test]
fn test_derive_resolution() {
    let container = Container::new();
    container
        .register_type::<dyn Storage, MemoryStorage>()
        .register_type::<dyn Metrics, CounterMetrics>()
        .register_type::<Repository, Repository>();

    let repository = container.resolve::<Repository>().unwrap();
    assert_eq!(repository.storage.name(), "memory");
    assert!(repository.ready.load(Ordering::SeqCst));
    let metrics = repository.metrics.get().unwrap();
    metrics.record();
    assert_eq!(metrics.count(), 1);

    // Metrics are not shared, so every resolution starts from zero.
    assert_eq!(container.resolve::<dyn Metrics>().unwrap().count(), 0);
    assert!(Arc::ptr_eq(
        &repository,
        &container.resolve::<Repository>().unwrap()
    ));
}

struct Endpoint {
    host: String,
    storage: Option<Arc<dyn Storage>>,
}

#[derive(Debug)]
struct InvalidHost;

impl std::fmt::Display for InvalidHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Host must not be empty")
    }
}

impl std::error::Error for InvalidHost {}

#[derive(Injectable)]
#[export(Self, NonShared)]
#[injectable(constructors)]
struct Client {
    endpoint: Endpoint,
}

#[constructors]
impl Client {
    #[constructor]
    fn new() -> Self {
        Self {
            endpoint: Endpoint {
                host: "localhost".into(),
                storage: None,
            },
        }
    }

    #[constructor(preferred)]
    fn with_host(host: Arc<String>, storage: Arc<dyn Storage>) -> Result<Self, InvalidHost> {
        if host.is_empty() {
            return Err(InvalidHost);
        }
        Ok(Self {
            endpoint: Endpoint {
                host: host.as_ref().clone(),
                storage: Some(storage),
            },
        })
    }
}

#[test]
fn test_constructors_attribute() {
    let constructors = <Client as phoenix::Constructors>::constructors();
    assert_eq!(constructors.len(), 2);
    assert!(!constructors[0].is_preferred());
    assert!(constructors[1].is_preferred());
    let names: Vec<_> = constructors[1]
        .parameters()
        .iter()
        .map(|v| v.name())
        .collect();
    assert_eq!(names, vec!["host", "storage"]);

    // Methods stay callable after the attribute is stripped.
    assert_eq!(Client::new().endpoint.host, "localhost");
}

#[test]
fn test_preferred_constructor_used() {
    let container = Container::new();
    container
        .register_type::<dyn Storage, MemoryStorage>()
        .register_type::<Client, Client>();

    let client = container
        .resolve_with::<Client>(&[Override::new("host", Arc::new("example.org".to_string()))])
        .unwrap();
    assert_eq!(client.endpoint.host, "example.org");
    assert_eq!(client.endpoint.storage.as_ref().unwrap().name(), "memory");

    let err = container
        .resolve_with::<Client>(&[Override::new("host", Arc::new(String::new()))])
        .err()
        .unwrap();
    assert!(matches!(err, ContainerError::Construction { .. }));
    assert_eq!(
        err.to_string(),
        format!(
            "Cannot construct {}: Host must not be empty",
            TypeKey::of::<Client>()
        )
    );
}

static BUILDS: AtomicUsize = AtomicUsize::new(0);

struct Pool;

#[constructors]
impl Pool {
    #[constructor]
    fn open() -> Result<Self, StdError> {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }
}

impl Injectable for Pool {
    fn descriptor() -> phoenix::TypeDescriptor {
        phoenix::TypeDescriptor::builder::<Self>()
            .export(phoenix::Export::shared::<Self, Self>())
            .constructors(<Self as phoenix::Constructors>::constructors())
            .build()
    }
}

#[test]
fn test_constructors_with_manual_descriptor() {
    let container = Container::new();
    container.register_type::<Pool, Pool>();
    let first = container.resolve::<Pool>().unwrap();
    let second = container.resolve::<Pool>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
}
