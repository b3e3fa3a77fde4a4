use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort criterion for one property. Loaders take an ordered slice; the first
/// clause is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortClause {
    pub property: String,
    pub ascending: bool,
}

impl SortClause {
    pub fn new(property: impl Into<String>, ascending: bool) -> Self {
        Self {
            property: property.into(),
            ascending,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, true)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, false)
    }
}

impl fmt::Display for SortClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.property, if self.ascending { "ASC" } else { "DESC" })
    }
}
