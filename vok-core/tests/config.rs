use std::fs;

use serial_test::serial;
use vok_core::config::{ConfigError, ConfigProperties, ConfigValue, VokConfig, PROFILE_ENV};

#[test]
fn test_empty_config() {
    let config = VokConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = VokConfig::empty();
    config.set("app.name", ConfigValue::String("test".into()));
    assert_eq!(config.get::<String>("app.name").unwrap(), "test");
}

#[test]
fn test_get_or_default() {
    let config = VokConfig::empty();
    assert_eq!(config.get_or("missing", 42i64).unwrap(), 42);
}

#[test]
fn test_get_or_wrong_type_is_error() {
    let mut config = VokConfig::empty();
    config.set("size", ConfigValue::String("big".into()));
    assert!(matches!(
        config.get_or("size", 1u64),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_type_conversions() {
    let mut config = VokConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(3.5));
    config.set("bool_val", ConfigValue::Bool(true));
    config.set("null_val", ConfigValue::Null);
    config.set("env_bool", ConfigValue::String("yes".into()));
    config.set("env_int", ConfigValue::String(" 17 ".into()));

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 3.5);
    assert_eq!(config.get::<f64>("int_val").unwrap(), 42.0);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert!(config.get::<bool>("env_bool").unwrap());
    assert_eq!(config.get::<u32>("env_int").unwrap(), 17);
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
}

#[test]
fn test_unsigned_out_of_range() {
    let mut config = VokConfig::empty();
    config.set("level", ConfigValue::Integer(256));
    config.set("negative", ConfigValue::Integer(-1));
    assert!(config.get::<u8>("level").is_err());
    assert!(config.get::<u64>("negative").is_err());
    assert_eq!(config.get::<usize>("level").unwrap(), 256);
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
vok:
  datasource:
    url: "sqlite::memory:"
    max_connections: 10
  name: "test"
"#;
    let config = VokConfig::from_yaml_str(yaml, "test").unwrap();

    assert_eq!(
        config.get::<String>("vok.datasource.url").unwrap(),
        "sqlite::memory:"
    );
    assert_eq!(config.get::<i64>("vok.datasource.max_connections").unwrap(), 10);
    assert_eq!(config.get::<String>("vok.name").unwrap(), "test");
    assert_eq!(config.profile(), "test");
}

#[test]
fn test_list_config() {
    let yaml = r#"
app:
  columns:
    - "name"
    - "age"
"#;
    let config = VokConfig::from_yaml_str(yaml, "test").unwrap();
    let columns: Vec<String> = config.get("app.columns").unwrap();
    assert_eq!(columns, vec!["name", "age"]);
    assert_eq!(config.get::<String>("app.columns.1").unwrap(), "age");
}

#[test]
fn test_single_value_as_vec() {
    let mut config = VokConfig::empty();
    config.set("single", ConfigValue::String("only-one".into()));
    let result: Vec<String> = config.get("single").unwrap();
    assert_eq!(result, vec!["only-one"]);
}

#[test]
fn test_invalid_yaml() {
    let result = VokConfig::from_yaml_str("vok: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

// --- ConfigProperties ---

#[derive(Debug)]
struct CacheConfig {
    size: u64,
    name: String,
    ttl: Option<u32>,
}

impl ConfigProperties for CacheConfig {
    fn prefix() -> &'static str {
        "vok.cache"
    }

    fn from_config(config: &VokConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            size: Self::optional(config, "size", 100)?,
            name: Self::required(config, "name")?,
            ttl: Self::optional(config, "ttl", None)?,
        })
    }
}

#[test]
fn test_config_properties_defaults() {
    let yaml = r#"
vok:
  cache:
    name: "people"
"#;
    let config = VokConfig::from_yaml_str(yaml, "test").unwrap();
    let cache: CacheConfig = config.section().unwrap();
    assert_eq!(cache.size, 100);
    assert_eq!(cache.name, "people");
    assert!(cache.ttl.is_none());
}

#[test]
fn test_config_properties_override() {
    let yaml = r#"
vok:
  cache:
    name: "people"
    size: 5
    ttl: 60
"#;
    let config = VokConfig::from_yaml_str(yaml, "test").unwrap();
    let cache: CacheConfig = config.section().unwrap();
    assert_eq!(cache.size, 5);
    assert_eq!(cache.ttl, Some(60));
}

#[test]
fn test_config_properties_missing_required() {
    let config = VokConfig::empty();
    let err = config.section::<CacheConfig>().unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(ref key) if key == "vok.cache.name"));
}

// --- loading from a directory ---

fn write(dir: &std::path::Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
#[serial]
fn test_load_from_dir_profile_overrides_base() {
    std::env::remove_var(PROFILE_ENV);
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "application.yaml",
        "vok:\n  datasource:\n    url: \"sqlite::memory:\"\n    max_connections: 4\n",
    );
    write(
        dir.path(),
        "application-prod.yaml",
        "vok:\n  datasource:\n    url: \"postgres://db/prod\"\n",
    );

    let dev = VokConfig::load_from_dir(dir.path(), "dev").unwrap();
    assert_eq!(dev.profile(), "dev");
    assert_eq!(dev.get::<String>("vok.datasource.url").unwrap(), "sqlite::memory:");

    let prod = VokConfig::load_from_dir(dir.path(), "prod").unwrap();
    assert_eq!(prod.get::<String>("vok.datasource.url").unwrap(), "postgres://db/prod");
    assert_eq!(prod.get::<u32>("vok.datasource.max_connections").unwrap(), 4);
}

#[test]
#[serial]
fn test_profile_env_var_wins() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application-staging.yaml", "vok:\n  stage: true\n");

    std::env::set_var(PROFILE_ENV, "staging");
    let config = VokConfig::load_from_dir(dir.path(), "dev");
    std::env::remove_var(PROFILE_ENV);

    let config = config.unwrap();
    assert_eq!(config.profile(), "staging");
    assert!(config.get::<bool>("vok.stage").unwrap());
}

#[test]
#[serial]
fn test_env_overlay_overrides_yaml() {
    std::env::remove_var(PROFILE_ENV);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application.yaml", "voktest:\n  overlay:\n    size: 1\n");

    std::env::set_var("VOKTEST_OVERLAY_SIZE", "9");
    let config = VokConfig::load_from_dir(dir.path(), "dev");
    std::env::remove_var("VOKTEST_OVERLAY_SIZE");

    assert_eq!(config.unwrap().get::<u64>("voktest.overlay.size").unwrap(), 9);
}

#[test]
#[serial]
fn test_dotenv_file_feeds_overlay() {
    std::env::remove_var(PROFILE_ENV);
    std::env::remove_var("VOKTEST_DOTENV_NAME");
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".env", "VOKTEST_DOTENV_NAME=from-dotenv\n");

    let config = VokConfig::load_from_dir(dir.path(), "dev");
    std::env::remove_var("VOKTEST_DOTENV_NAME");

    assert_eq!(
        config.unwrap().get::<String>("voktest.dotenv.name").unwrap(),
        "from-dotenv"
    );
}

#[test]
#[serial]
fn test_missing_files_are_not_errors() {
    std::env::remove_var(PROFILE_ENV);
    let dir = tempfile::tempdir().unwrap();
    let config = VokConfig::load_from_dir(dir.path(), "dev").unwrap();
    assert!(!config.contains_key("vok.datasource.url"));
}

#[test]
#[serial]
fn test_malformed_yaml_file_is_load_error() {
    std::env::remove_var(PROFILE_ENV);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application.yaml", "vok: [unclosed\n");
    let result = VokConfig::load_from_dir(dir.path(), "dev");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}
