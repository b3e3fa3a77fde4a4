use super::{ConfigError, FromConfigValue, VokConfig};

/// Trait for strongly-typed configuration sections living under one key
/// prefix.
///
/// ```ignore
/// pub struct CacheConfig {
///     pub size: u64,
/// }
///
/// impl ConfigProperties for CacheConfig {
///     fn prefix() -> &'static str {
///         "vok.cache"
///     }
///
///     fn from_config(config: &VokConfig) -> Result<Self, ConfigError> {
///         Ok(Self { size: Self::optional(config, "size", 100)? })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"vok.datasource"`).
    fn prefix() -> &'static str;

    /// Construct from a `VokConfig` instance.
    fn from_config(config: &VokConfig) -> Result<Self, ConfigError>;

    /// Absolute key for a property of this section.
    fn key(property: &str) -> String {
        format!("{}.{property}", Self::prefix())
    }

    /// A property that must be present.
    fn required<V: FromConfigValue>(config: &VokConfig, property: &str) -> Result<V, ConfigError> {
        config.get(&Self::key(property))
    }

    /// A property falling back to `default` when absent.
    fn optional<V: FromConfigValue>(config: &VokConfig, property: &str, default: V) -> Result<V, ConfigError> {
        config.get_or(&Self::key(property), default)
    }
}
