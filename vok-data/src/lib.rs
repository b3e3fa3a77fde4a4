//! # vok-data: filters, SQL rendering and paging data loaders
//!
//! Backend-agnostic core of the VoK data layer. A [`Filter`] is a small
//! predicate expression tree that can be rendered into a parameterized SQL
//! `WHERE` fragment or evaluated against a record in memory. A [`DataLoader`]
//! turns filter + sort + row range requests into backend fetches.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Filter`] | Predicate tree: `eq`, comparisons, `like`/`ilike`, null checks, `and`/`or`/`not`, native SQL |
//! | [`Field`] | Typed property reference, generated by `#[derive(PropertyAccess)]` |
//! | [`FilterFactory`] | Untyped filter construction with a derived `between` |
//! | [`NamedSql`] | SQL text with `:name` placeholders, convertible to positional binds |
//! | [`PropertyAccess`] | Named property lookup used by in-memory evaluation |
//! | [`DataLoader`] | Async `fetch(filter, sort_by, range)` / `count(filter)` contract |
//! | [`ListDataLoader`] | In-memory loader over a `Vec<T>` |
//! | [`FetchLimitOvercomer`] | Splits large fetches for delegates with a per-call row cap |
//! | [`SqlTemplate`] | Hand-written SQL with `{{WHERE}}`, `{{ORDER}}`, `{{PAGING}}` |
//! | [`QueryBuilder`] | Single-table SELECT / COUNT / DELETE generation |
//!
//! SQLx-backed loaders live in `vok-data-sqlx`.

// lets derive output refer to `::vok_data` from this crate's own tests
extern crate self as vok_data;

pub mod builder;
pub mod entity;
pub mod error;
pub mod eval;
pub mod filter;
pub mod loader;
pub mod query;
pub mod range;
pub mod sort;
pub mod sql;
pub mod template;
pub mod value;

pub use builder::{native, Field, FilterFactory, SqlFilterFactory};
pub use entity::Entity;
pub use error::{DataError, FilterError};
pub use eval::PropertyAccess;
pub use filter::{CombineFilters, CompareOperator, Filter, FilterSet, NativeSql, Pattern, Predicate};
pub use loader::{
    DataLoader, DataLoaderExt, FetchLimitOvercomer, FilteredDataLoader, ListDataLoader,
    SortedDataLoader,
};
pub use query::QueryBuilder;
pub use range::RowRange;
pub use sort::SortClause;
pub use sql::{Dialect, NamedSql};
pub use template::SqlTemplate;
pub use value::{ToValue, Value};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        native, CombineFilters, DataLoader, DataLoaderExt, Entity, Field, Filter, PropertyAccess,
        QueryBuilder, RowRange, SortClause, SqlTemplate, Value,
    };
}
