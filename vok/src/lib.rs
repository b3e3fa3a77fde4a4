//! VoK: composable filters and paging data loaders.
//!
//! This facade crate re-exports all VoK sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use vok::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate                     |
//! |------------|---------|---------------------------|
//! | `sqlx`     | **yes** | `vok-data-sqlx`           |
//! | `sqlite`   | **yes** | `vok-data-sqlx/sqlite`    |
//! | `postgres` | no      | `vok-data-sqlx/postgres`  |
//! | `mysql`    | no      | `vok-data-sqlx/mysql`     |
//! | `full`     | no      | All of the above          |

// The derive macros use `proc-macro-crate` to detect whether the user depends
// on `vok` (facade) or `vok-data`, and generate `::vok::data` or `::vok_data`.
extern crate self as vok;

pub use vok_core;
pub use vok_data as data;
pub use vok_macros::{Entity, PropertyAccess};

#[cfg(feature = "sqlx")]
pub use vok_data_sqlx;

pub use vok_core::{init_tracing, VokConfig};
pub use vok_data::{DataError, Filter, FilterError};

/// Unified prelude: import everything with `use vok::prelude::*`.
///
/// Includes the data and core preludes, the derives, and the SQLx types when
/// the `sqlx` feature is enabled.
pub mod prelude {
    pub use vok_core::prelude::*;
    pub use vok_data::prelude::*;
    pub use vok_macros::{Entity, PropertyAccess};

    #[cfg(feature = "sqlx")]
    pub use vok_data_sqlx::prelude::*;
}
