/// Errors raised while interpreting a [`Filter`](crate::Filter), either as SQL
/// or as an in-memory predicate.
///
/// These are programmer errors: a filter that can't be interpreted is never
/// silently dropped or treated as "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The filter can't be interpreted the requested way.
    Unsupported { filter: String, reason: &'static str },
    /// The record has no property with this name.
    UnknownProperty { property: String, record: &'static str },
    /// A property, column or table name is not a plain SQL identifier.
    InvalidIdentifier { kind: &'static str, ident: String },
    /// The SQL text references a named parameter with no bound value.
    MissingParameter(String),
    /// Two parts of one statement bind different values to the same name.
    ConflictingParameter(String),
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Unsupported { filter, reason } => {
                write!(f, "Unsupported filter `{filter}`: {reason}")
            }
            FilterError::UnknownProperty { property, record } => {
                write!(f, "{record} has no property `{property}`")
            }
            FilterError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            FilterError::MissingParameter(name) => {
                write!(f, "No value bound for SQL parameter :{name}")
            }
            FilterError::ConflictingParameter(name) => {
                write!(f, "SQL parameter :{name} is bound to two different values")
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
    Filter(FilterError),
    InvalidArgument(String),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `vok-data-sqlx`) to wrap driver-specific
    /// errors without translating them.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Filter(err) => write!(f, "Filter error: {err}"),
            DataError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            DataError::Filter(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FilterError> for DataError {
    fn from(err: FilterError) -> Self {
        DataError::Filter(err)
    }
}
