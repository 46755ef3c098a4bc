use phoenix_base::{Config, ConfigSection, ContainerConfig, TracingConfig};
use serde::{Deserialize, Serialize};
use std::io::Write as _;
use tempfile::NamedTempFile;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct DatabaseConfig {
    host: String,
    port: u16,
    #[serde(default)]
    ssl: bool,
}

impl ConfigSection for DatabaseConfig {
    fn key() -> &'static str {
        "database"
    }
}

#[test]
fn test_config_new() {
    let config = Config::new();
    assert!(config.is_empty());
    assert_eq!(config.len(), 0);
}

#[test]
fn test_config_parse() {
    let config = Config::parse(
        r#"{
            "database": {"host": "localhost", "port": 5432},
            "workers": 4
        }"#,
    )
    .unwrap();
    assert_eq!(config.len(), 2);
    assert!(config.contains("database"));
    assert!(!config.contains("server"));

    let database = config.section::<DatabaseConfig>().unwrap();
    assert_eq!(
        database,
        DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            ssl: false,
        }
    );
    assert_eq!(config.get::<u32>("workers").unwrap(), 4);
    assert_eq!(config.get::<Option<u32>>("missing").unwrap(), None);
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not json").is_err());
    assert!(Config::parse("[1, 2, 3]").is_err());

    let config = Config::parse(r#"{"database": {"host": 1}}"#).unwrap();
    assert!(config.section::<DatabaseConfig>().is_err());
}

#[test]
fn test_missing_section_defaults() {
    let config = Config::new();
    assert_eq!(
        config.section::<DatabaseConfig>().unwrap(),
        DatabaseConfig::default()
    );
    assert!(config.section::<ContainerConfig>().unwrap().detect_cycles);
    assert_eq!(
        config.section::<TracingConfig>().unwrap().level,
        tracing::Level::INFO
    );
}

#[test]
fn test_config_set() {
    let database = DatabaseConfig {
        host: "db".into(),
        port: 3306,
        ssl: true,
    };
    let mut config = Config::new().with("workers", 8).unwrap();
    config.set(DatabaseConfig::key(), &database).unwrap();
    assert_eq!(config.section::<DatabaseConfig>().unwrap(), database);
    assert_eq!(config.get::<u32>("workers").unwrap(), 8);
}

#[test]
fn test_config_merge() {
    let mut config = Config::parse(
        r#"{
            "database": {"host": "localhost", "port": 5432},
            "tracing": {"directives": ["phoenix=debug"]}
        }"#,
    )
    .unwrap();
    let overlay = Config::parse(
        r#"{
            "database": {"port": 6432, "ssl": true},
            "tracing": {"level": "WARN", "directives": ["hyper=off"]},
            "workers": 2
        }"#,
    )
    .unwrap();
    config.merge_from(overlay);

    assert_eq!(
        config.section::<DatabaseConfig>().unwrap(),
        DatabaseConfig {
            host: "localhost".into(),
            port: 6432,
            ssl: true,
        }
    );
    let tracing = config.section::<TracingConfig>().unwrap();
    assert_eq!(tracing.level, tracing::Level::WARN);
    assert_eq!(tracing.directives, vec!["phoenix=debug", "hyper=off"]);
    assert_eq!(config.get::<u32>("workers").unwrap(), 2);
}

#[test]
fn test_config_parse_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"container": {{"detect_cycles": false}}, "tracing": {{"level": "debug"}}}}"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = Config::parse_file(file.path()).unwrap();
    assert!(!config.section::<ContainerConfig>().unwrap().detect_cycles);
    assert_eq!(
        config.section::<TracingConfig>().unwrap().level,
        tracing::Level::DEBUG
    );
}

#[test]
fn test_config_parse_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::parse_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_tracing_env_filter() {
    let config = TracingConfig {
        level: tracing::Level::INFO,
        directives: vec!["phoenix=trace".into()],
    };
    assert!(config.env_filter().is_ok());

    let config = TracingConfig {
        level: tracing::Level::INFO,
        directives: vec!["phoenix=verbose".into()],
    };
    assert!(config.env_filter().is_err());
}
