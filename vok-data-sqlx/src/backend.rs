use std::future::Future;

use sqlx::{Database, FromRow, Pool};
use vok_data::{Dialect, Value};

/// A SQLx driver the data layer can run generated SQL against.
///
/// Binding a dynamically typed [`Value`] needs the concrete driver's
/// `Encode` impls, so the trait is implemented once per enabled driver
/// feature (`sqlite`, `postgres`, `mysql`).
pub trait SqlBackend: Database {
    /// Placeholder style, ILIKE support and paging syntax of this driver.
    const DIALECT: Dialect;

    /// Runs a query and maps every row into `T`.
    fn fetch_all<'a, T>(
        pool: &'a Pool<Self>,
        sql: &'a str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<T>, sqlx::Error>> + Send + 'a
    where
        T: for<'r> FromRow<'r, <Self as Database>::Row> + Send + Unpin + 'a;

    /// Runs a query returning a single integer, e.g. `SELECT COUNT(*) ...`.
    fn fetch_count<'a>(
        pool: &'a Pool<Self>,
        sql: &'a str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send + 'a;

    /// Runs a statement, returning the number of affected rows.
    fn execute<'a>(
        pool: &'a Pool<Self>,
        sql: &'a str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send + 'a;
}

// Nulls are bound as a text NULL; all three drivers accept it for any column.
macro_rules! bind_values {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for value in $params {
            query = match value {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(b),
                Value::Int(i) => query.bind(i),
                Value::Float(f) => query.bind(f),
                Value::Text(s) => query.bind(s),
                Value::Date(d) => query.bind(d),
                Value::DateTime(dt) => query.bind(dt),
            };
        }
        query
    }};
}

macro_rules! impl_sql_backend {
    ($db:ty, $dialect:expr) => {
        impl SqlBackend for $db {
            const DIALECT: Dialect = $dialect;

            fn fetch_all<'a, T>(
                pool: &'a Pool<Self>,
                sql: &'a str,
                params: Vec<Value>,
            ) -> impl Future<Output = Result<Vec<T>, sqlx::Error>> + Send + 'a
            where
                T: for<'r> FromRow<'r, <Self as Database>::Row> + Send + Unpin + 'a,
            {
                async move {
                    bind_values!(sqlx::query_as::<Self, T>(sql), params)
                        .fetch_all(pool)
                        .await
                }
            }

            fn fetch_count<'a>(
                pool: &'a Pool<Self>,
                sql: &'a str,
                params: Vec<Value>,
            ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send + 'a {
                async move {
                    bind_values!(sqlx::query_scalar::<Self, i64>(sql), params)
                        .fetch_one(pool)
                        .await
                }
            }

            fn execute<'a>(
                pool: &'a Pool<Self>,
                sql: &'a str,
                params: Vec<Value>,
            ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send + 'a {
                async move {
                    let result = bind_values!(sqlx::query::<Self>(sql), params)
                        .execute(pool)
                        .await?;
                    Ok(result.rows_affected())
                }
            }
        }
    };
}

#[cfg(feature = "sqlite")]
impl_sql_backend!(sqlx::Sqlite, Dialect::Sqlite);

#[cfg(feature = "postgres")]
impl_sql_backend!(sqlx::Postgres, Dialect::Postgres);

#[cfg(feature = "mysql")]
impl_sql_backend!(sqlx::MySql, Dialect::MySql);
