use vok_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Instead, use `.into_data_error()`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".into()),
            _ => DataError::database(self),
        }
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type SqlxResult<T> = Result<T, DataError>;

/// `COUNT(*)` comes back as a signed integer on every driver.
pub(crate) fn count_to_u64(count: i64) -> SqlxResult<u64> {
    u64::try_from(count).map_err(|_| DataError::Other(format!("negative row count {count}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = sqlx::Error::RowNotFound.into_data_error();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn other_errors_are_wrapped_unchanged() {
        let err = sqlx::Error::PoolTimedOut.into_data_error();
        match err {
            DataError::Database(inner) => assert_eq!(inner.to_string(), sqlx::Error::PoolTimedOut.to_string()),
            other => panic!("expected Database, got {other:?}"),
        }
    }

    #[test]
    fn negative_count_is_rejected() {
        assert_eq!(count_to_u64(3).unwrap(), 3);
        assert!(count_to_u64(-1).is_err());
    }
}
