use std::time::Duration;

use sqlx::pool::PoolOptions;
use sqlx::{Database, Pool};
use vok_core::config::{ConfigError, ConfigProperties, VokConfig};

use crate::error::{SqlxErrorExt, SqlxResult};

/// Connection settings under `vok.datasource`.
///
/// ```yaml
/// vok:
///   datasource:
///     url: "sqlite::memory:"
///     max_connections: 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl ConfigProperties for DataSourceConfig {
    fn prefix() -> &'static str {
        "vok.datasource"
    }

    fn from_config(config: &VokConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            url: Self::required(config, "url")?,
            max_connections: Self::optional(config, "max_connections", 10)?,
            min_connections: Self::optional(config, "min_connections", 0)?,
            acquire_timeout_secs: Self::optional(config, "acquire_timeout_secs", 30)?,
        })
    }
}

impl DataSourceConfig {
    /// Pool options carrying the configured sizes and timeout.
    pub fn pool_options<DB: Database>(&self) -> PoolOptions<DB> {
        PoolOptions::<DB>::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }

    /// Opens a pool to `url`.
    pub async fn connect<DB: Database>(&self) -> SqlxResult<Pool<DB>> {
        tracing::info!(
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            "Connecting datasource"
        );
        self.pool_options::<DB>()
            .connect(&self.url)
            .await
            .map_err(SqlxErrorExt::into_data_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = VokConfig::from_yaml_str("vok:\n  datasource:\n    url: \"sqlite::memory:\"\n", "test").unwrap();
        let ds: DataSourceConfig = config.section().unwrap();
        assert_eq!(
            ds,
            DataSourceConfig {
                url: "sqlite::memory:".into(),
                max_connections: 10,
                min_connections: 0,
                acquire_timeout_secs: 30,
            }
        );
    }

    #[test]
    fn url_is_required() {
        let err = VokConfig::empty().section::<DataSourceConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref key) if key == "vok.datasource.url"));
    }

    #[test]
    fn overrides_read_from_strings() {
        let yaml = r#"
vok:
  datasource:
    url: "postgres://localhost/vok"
    max_connections: "4"
    acquire_timeout_secs: 5
"#;
        let ds: DataSourceConfig = VokConfig::from_yaml_str(yaml, "test").unwrap().section().unwrap();
        assert_eq!(ds.max_connections, 4);
        assert_eq!(ds.acquire_timeout_secs, 5);
    }
}
