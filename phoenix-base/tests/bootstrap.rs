use phoenix::{Catalog, ContainerRef, Injectable, default_container};
use phoenix_base::{Bootstrap, Config, ConfigSection};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
    port: u16,
}

impl ConfigSection for ServerConfig {
    fn key() -> &'static str {
        "server"
    }
}

#[derive(Injectable)]
#[export(Self)]
struct Server {
    config: Arc<Config>,
}

impl Server {
    fn port(&self) -> u16 {
        self.config
            .section::<ServerConfig>()
            .map(|v| v.port)
            .unwrap_or_default()
    }
}

#[test]
fn test_bootstrap_build() {
    let config = Config::parse(
        r#"{
            "server": {"port": 8080},
            "tracing": {"level": "debug", "directives": ["phoenix=trace"]}
        }"#,
    )
    .unwrap();
    let container = Bootstrap::new(config)
        .module(Catalog::new("server").with::<Server>())
        .build()
        .unwrap();

    assert!(container.options().detect_cycles);
    assert!(container.is_registered::<Config>());
    assert!(container.is_instantiated::<Config>());
    let server = container.resolve::<Server>().unwrap();
    assert_eq!(server.port(), 8080);
    assert!(Arc::ptr_eq(
        &server.config,
        &container.resolve::<Config>().unwrap()
    ));
}

#[test]
fn test_bootstrap_options() {
    let config = Config::parse(r#"{"container": {"detect_cycles": false}}"#).unwrap();
    let container = Bootstrap::new(config).build().unwrap();
    assert!(!container.options().detect_cycles);
    assert!(!container.is_registered::<Server>());
}

#[test]
fn test_bootstrap_invalid_config() {
    let config = Config::parse(r#"{"container": {"detect_cycles": "sometimes"}}"#).unwrap();
    assert!(Bootstrap::new(config).build().is_err());

    let config = Config::parse(r#"{"tracing": {"level": "loud"}}"#).unwrap();
    assert!(Bootstrap::new(config).build().is_err());
}

#[test]
fn test_install_default() {
    let config = Config::new()
        .with("server", serde_json::json!({"port": 9000}))
        .unwrap();
    let container = Bootstrap::new(config)
        .module(Catalog::new("server").with::<Server>())
        .install_default()
        .unwrap();
    assert!(container.ptr_eq(default_container()));
    assert_eq!(default_container().resolve::<Server>().unwrap().port(), 9000);

    let this = container.resolve::<ContainerRef>().unwrap();
    assert!(this.upgrade().unwrap().ptr_eq(container));

    assert!(Bootstrap::new(Config::new()).install_default().is_err());
}
