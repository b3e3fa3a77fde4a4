//! # vok-data-sqlx: SQLx backend for the VoK data layer
//!
//! Runs the filters and loaders of [`vok_data`] against a real database
//! through [SQLx](https://github.com/launchbadge/sqlx).
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlBackend`] | Per-driver binding of [`Value`](vok_data::Value) parameters and query execution |
//! | [`EntityDataLoader`] | `DataLoader` over one entity table |
//! | [`SqlDataLoader`] | `DataLoader` over a hand-written [`SqlTemplate`](vok_data::SqlTemplate) |
//! | [`Dao`] | Finders, counts and deletes for one entity table |
//! | [`DataSourceConfig`] | `vok.datasource` configuration section and pool creation |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` (default) |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```ignore
//! use vok_data_sqlx::prelude::*;
//! use sqlx::Sqlite;
//!
//! let config = VokConfig::load_default()?;
//! let pool = config.section::<DataSourceConfig>()?.connect::<Sqlite>().await?;
//!
//! let loader = EntityDataLoader::<Person, Sqlite>::new(pool)
//!     .overcome_fetch_limit(1000)?;
//! let page = loader
//!     .fetch(Some(&Person::AGE.between(25..=50)), &[SortClause::asc("name")], RowRange::from(0..20))
//!     .await?;
//! ```
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use vok_data_sqlx::SqlxErrorExt;
//!
//! let rows = sqlx::query("SELECT ...")
//!     .fetch_all(&pool)
//!     .await
//!     .map_err(|e| e.into_data_error())?;
//! ```

pub mod backend;
pub mod config;
pub mod dao;
pub mod error;
pub mod loader;

pub use backend::SqlBackend;
pub use config::DataSourceConfig;
pub use dao::Dao;
pub use error::{SqlxErrorExt, SqlxResult};
pub use loader::{EntityDataLoader, SqlDataLoader};

/// Re-exports of the most commonly used types from `vok-data`, `vok-core`
/// and this crate.
pub mod prelude {
    pub use crate::{Dao, DataSourceConfig, EntityDataLoader, SqlBackend, SqlDataLoader, SqlxErrorExt};
    pub use vok_core::prelude::*;
    pub use vok_data::prelude::*;
}
