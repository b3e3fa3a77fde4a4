//! SQL-backed [`DataLoader`]s.

use std::future::Future;
use std::marker::PhantomData;

use sqlx::{Database, FromRow, Pool};
use vok_data::{DataError, DataLoader, Entity, Filter, QueryBuilder, RowRange, SortClause, SqlTemplate};

use crate::backend::SqlBackend;
use crate::error::{count_to_u64, SqlxErrorExt};

/// Loads rows of a single entity table.
///
/// Fetches render as `SELECT * FROM <table> [WHERE ...] [ORDER BY ...]
/// [LIMIT n OFFSET m]`, counts as `SELECT COUNT(*) FROM <table> [WHERE ...]`.
pub struct EntityDataLoader<T, DB: Database> {
    pool: Pool<DB>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, DB: Database> EntityDataLoader<T, DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<T, DB: Database> Clone for EntityDataLoader<T, DB> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T, DB> DataLoader<T> for EntityDataLoader<T, DB>
where
    T: Entity + for<'r> FromRow<'r, <DB as Database>::Row>,
    DB: SqlBackend,
{
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        let query = QueryBuilder::new_with_dialect(T::table_name(), DB::DIALECT)
            .filter_opt(filter)
            .sort_by(sort_by)
            .range(range)
            .build_select(T::columns());
        async move {
            let (sql, params) = query?;
            tracing::debug!(table = T::table_name(), sql = %sql, params = params.len(), "Entity fetch");
            DB::fetch_all(&self.pool, &sql, params)
                .await
                .map_err(SqlxErrorExt::into_data_error)
        }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        let query = QueryBuilder::new_with_dialect(T::table_name(), DB::DIALECT)
            .filter_opt(filter)
            .build_count();
        async move {
            let (sql, params) = query?;
            tracing::debug!(table = T::table_name(), sql = %sql, params = params.len(), "Entity count");
            let count = DB::fetch_count(&self.pool, &sql, params)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            count_to_u64(count)
        }
    }
}

/// Loads rows of an arbitrary hand-written query, see [`SqlTemplate`].
///
/// ```ignore
/// let loader = SqlDataLoader::<PersonRow, Sqlite>::new(
///     pool,
///     SqlTemplate::new(
///         "select * from person where age >= :min {{WHERE}} order by id{{ORDER}} {{PAGING}}",
///     )
///     .param("min", 18),
/// );
/// ```
///
/// Caller sort clauses are appended after the template's own `order by`
/// keys. Use `order by null{{ORDER}}` when the query has no natural order.
pub struct SqlDataLoader<T, DB: Database> {
    pool: Pool<DB>,
    template: SqlTemplate,
    _marker: PhantomData<fn() -> T>,
}

impl<T, DB: Database> SqlDataLoader<T, DB> {
    pub fn new(pool: Pool<DB>, template: SqlTemplate) -> Self {
        Self {
            pool,
            template,
            _marker: PhantomData,
        }
    }

    pub fn template(&self) -> &SqlTemplate {
        &self.template
    }
}

impl<T, DB: Database> Clone for SqlDataLoader<T, DB> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone(), self.template.clone())
    }
}

impl<T, DB> DataLoader<T> for SqlDataLoader<T, DB>
where
    T: for<'r> FromRow<'r, <DB as Database>::Row> + Send + Unpin + 'static,
    DB: SqlBackend,
{
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        let query = self
            .template
            .render(filter, sort_by, range, DB::DIALECT)
            .and_then(|named| named.to_positional(DB::DIALECT));
        async move {
            let (sql, params) = query?;
            tracing::debug!(sql = %sql, params = params.len(), "Template fetch");
            DB::fetch_all(&self.pool, &sql, params)
                .await
                .map_err(SqlxErrorExt::into_data_error)
        }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        let query = self
            .template
            .render_count(filter, DB::DIALECT)
            .and_then(|named| named.to_positional(DB::DIALECT));
        async move {
            let (sql, params) = query?;
            tracing::debug!(sql = %sql, params = params.len(), "Template count");
            let count = DB::fetch_count(&self.pool, &sql, params)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            count_to_u64(count)
        }
    }
}
