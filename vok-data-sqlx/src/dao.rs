use std::marker::PhantomData;

use sqlx::{Database, FromRow, Pool};
use vok_data::{DataError, DataLoader, Entity, Filter, QueryBuilder, RowRange, ToValue};

use crate::backend::SqlBackend;
use crate::error::{SqlxErrorExt, SqlxResult};
use crate::loader::EntityDataLoader;

/// Table-level finders and deletes for one entity type.
///
/// # Example
///
/// ```ignore
/// let people = Dao::<Person, Sqlite>::new(pool.clone());
/// let adults = people.find_by(&Person::AGE.ge(18)).await?;
/// let removed = people.delete_by_id(&7).await?;
/// people.delete(&adults[0]).await?;
/// ```
pub struct Dao<T, DB: Database> {
    pool: Pool<DB>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, DB: Database> Dao<T, DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<T, DB: Database> Clone for Dao<T, DB> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T, DB> Dao<T, DB>
where
    T: Entity + for<'r> FromRow<'r, <DB as Database>::Row>,
    DB: SqlBackend,
{
    /// A loader over the whole table sharing this DAO's pool.
    pub fn data_loader(&self) -> EntityDataLoader<T, DB> {
        EntityDataLoader::new(self.pool.clone())
    }

    pub async fn find_all(&self) -> SqlxResult<Vec<T>> {
        self.data_loader().fetch(None, &[], RowRange::all()).await
    }

    pub async fn find_by(&self, filter: &Filter) -> SqlxResult<Vec<T>> {
        self.data_loader().fetch(Some(filter), &[], RowRange::all()).await
    }

    pub async fn find_by_id(&self, id: &T::Id) -> SqlxResult<Option<T>> {
        let mut rows = self.find_by(&id_filter::<T>(id)).await?;
        Ok(rows.pop())
    }

    /// Like [`Dao::find_by_id`], failing with `DataError::NotFound` when no
    /// row has this id.
    pub async fn get_by_id(&self, id: &T::Id) -> SqlxResult<T> {
        self.find_by_id(id).await?.ok_or_else(|| {
            DataError::NotFound(format!(
                "{} with {} = {}",
                T::table_name(),
                T::id_column(),
                id.to_value()
            ))
        })
    }

    pub async fn count(&self) -> SqlxResult<u64> {
        self.data_loader().count(None).await
    }

    pub async fn count_by(&self, filter: &Filter) -> SqlxResult<u64> {
        self.data_loader().count(Some(filter)).await
    }

    /// Deletes every row of the table, returning how many were removed.
    pub async fn delete_all(&self) -> SqlxResult<u64> {
        self.delete_where(None).await
    }

    /// Returns whether a row was removed.
    pub async fn delete_by_id(&self, id: &T::Id) -> SqlxResult<bool> {
        Ok(self.delete_where(Some(&id_filter::<T>(id))).await? > 0)
    }

    /// Deletes the row backing `entity`, matched by its id.
    pub async fn delete(&self, entity: &T) -> SqlxResult<bool> {
        self.delete_by_id(entity.id()).await
    }

    pub async fn delete_by(&self, filter: &Filter) -> SqlxResult<u64> {
        self.delete_where(Some(filter)).await
    }

    async fn delete_where(&self, filter: Option<&Filter>) -> SqlxResult<u64> {
        let (sql, params) = QueryBuilder::new_with_dialect(T::table_name(), DB::DIALECT)
            .filter_opt(filter)
            .build_delete()?;
        tracing::debug!(table = T::table_name(), sql = %sql, params = params.len(), "Delete");
        let affected = DB::execute(&self.pool, &sql, params)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        tracing::debug!(table = T::table_name(), affected, "Deleted rows");
        Ok(affected)
    }
}

fn id_filter<T: Entity>(id: &T::Id) -> Filter {
    Filter::eq(T::id_column(), id.to_value())
}
