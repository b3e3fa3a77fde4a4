//! # vok-core: configuration and tracing for VoK
//!
//! - [`config`]: layered configuration (`application.yaml`, profile overrides,
//!   `.env` files, environment variables) with typed sections via
//!   [`ConfigProperties`](config::ConfigProperties).
//! - [`init_tracing`] / [`try_init_test_tracing`]: `tracing-subscriber` setup.

pub mod config;
pub mod telemetry;

pub use config::{ConfigError, ConfigProperties, ConfigValue, FromConfigValue, VokConfig};
pub use telemetry::{init_tracing, try_init_test_tracing};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::config::{ConfigError, ConfigProperties, VokConfig};
    pub use crate::init_tracing;
}
