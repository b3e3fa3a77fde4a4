use crate::error::FilterError;
use crate::filter::Filter;
use crate::range::RowRange;
use crate::sort::SortClause;
use crate::sql::{is_valid_identifier, order_by_list, Dialect, NamedSql};
use crate::value::Value;

/// A fluent builder for single-table queries driven by a [`Filter`].
///
/// # Example
///
/// ```
/// use vok_data::{Dialect, Filter, QueryBuilder, RowRange, SortClause};
///
/// let (sql, params) = QueryBuilder::new_with_dialect("person", Dialect::Postgres)
///     .filter(Filter::ge("age", 18))
///     .order_by(SortClause::asc("name"))
///     .range(RowRange::from(20..=29))
///     .build_select(&["*"])
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM person WHERE age >= $1 ORDER BY name ASC LIMIT 10 OFFSET 20");
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    filter: Option<Filter>,
    order: Vec<SortClause>,
    range: RowRange,
    dialect: Dialect,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: None,
            order: Vec::new(),
            range: RowRange::all(),
            dialect: Dialect::Generic,
        }
    }

    /// Create a new builder with an explicit SQL dialect.
    pub fn new_with_dialect(table: &str, dialect: Dialect) -> Self {
        Self::new(table).dialect(dialect)
    }

    /// Set the SQL dialect (affects placeholder style, ILIKE and paging).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// ANDs `filter` into the WHERE clause.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// Like [`QueryBuilder::filter`], doing nothing for `None`.
    pub fn filter_opt(self, filter: Option<&Filter>) -> Self {
        match filter {
            Some(filter) => self.filter(filter.clone()),
            None => self,
        }
    }

    pub fn order_by(mut self, clause: SortClause) -> Self {
        self.order.push(clause);
        self
    }

    pub fn sort_by(mut self, clauses: &[SortClause]) -> Self {
        self.order.extend_from_slice(clauses);
        self
    }

    pub fn range(mut self, range: RowRange) -> Self {
        self.range = range;
        self
    }

    /// Build a SELECT query returning `(sql, bind_values)`.
    ///
    /// `columns` are validated identifiers; `*` and `table.*` are accepted.
    pub fn build_select(&self, columns: &[&str]) -> Result<(String, Vec<Value>), FilterError> {
        let table = self.checked_table()?;
        let columns = checked_columns(columns)?;
        let mut sql = format!("SELECT {columns} FROM {table}");
        let params = self.append_where(&mut sql)?;
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_by_list(&self.order)?);
        }
        sql.push_str(&self.dialect.limit_offset(self.range));
        self.bind(sql, params)
    }

    /// Build a COUNT query returning `(sql, bind_values)`. Ordering and range
    /// are ignored.
    pub fn build_count(&self) -> Result<(String, Vec<Value>), FilterError> {
        let table = self.checked_table()?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let params = self.append_where(&mut sql)?;
        self.bind(sql, params)
    }

    /// Build a DELETE query returning `(sql, bind_values)`.
    pub fn build_delete(&self) -> Result<(String, Vec<Value>), FilterError> {
        let table = self.checked_table()?;
        let mut sql = format!("DELETE FROM {table}");
        let params = self.append_where(&mut sql)?;
        self.bind(sql, params)
    }

    fn append_where(&self, sql: &mut String) -> Result<NamedSql, FilterError> {
        match &self.filter {
            Some(filter) => {
                let named = filter.to_named_sql(self.dialect)?;
                sql.push_str(" WHERE ");
                sql.push_str(&named.sql);
                Ok(named)
            }
            None => Ok(NamedSql::default()),
        }
    }

    fn bind(&self, sql: String, where_clause: NamedSql) -> Result<(String, Vec<Value>), FilterError> {
        NamedSql::new(sql, where_clause.params).to_positional(self.dialect)
    }

    fn checked_table(&self) -> Result<&str, FilterError> {
        if is_valid_identifier(&self.table, false) {
            Ok(&self.table)
        } else {
            Err(FilterError::InvalidIdentifier {
                kind: "table",
                ident: self.table.clone(),
            })
        }
    }
}

fn checked_columns(columns: &[&str]) -> Result<String, FilterError> {
    let mut out = Vec::with_capacity(columns.len());
    for col in columns {
        if !is_valid_identifier(col, true) {
            return Err(FilterError::InvalidIdentifier {
                kind: "column",
                ident: col.to_string(),
            });
        }
        out.push(*col);
    }
    Ok(out.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let (sql, params) = QueryBuilder::new("users").build_select(&["*"]).unwrap();
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filtered_select() {
        let (sql, params) = QueryBuilder::new("users")
            .filter(Filter::eq("email", "a@b.com"))
            .build_select(&["*"])
            .unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE email = ?");
        assert_eq!(params, vec![Value::Text("a@b.com".into())]);
    }

    #[test]
    fn test_complex_query() {
        let (sql, params) = QueryBuilder::new("users")
            .filter(Filter::eq("status", "active"))
            .filter(Filter::like("name", "alice"))
            .order_by(SortClause::asc("id"))
            .range(RowRange::from(20..30))
            .build_select(&["id", "name"])
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, name FROM users WHERE (status = ? and name LIKE ?) ORDER BY id ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            params,
            vec![Value::Text("active".into()), Value::Text("%alice%".into())]
        );
    }

    #[test]
    fn test_count_query() {
        let (sql, params) = QueryBuilder::new("users")
            .filter(Filter::eq("active", true))
            .range(RowRange::from(0..=9))
            .build_count()
            .unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM users WHERE active = ?");
        assert_eq!(params, vec![Value::Bool(true)]);
    }

    #[test]
    fn test_postgres_placeholders() {
        let (sql, params) = QueryBuilder::new_with_dialect("users", Dialect::Postgres)
            .filter(Filter::eq("status", "active").and(Filter::eq("role", "admin").or(Filter::eq("role", "user"))))
            .build_delete()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM users WHERE (status = $1 and (role = $2 or role = $3))"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_invalid_identifiers() {
        let err = QueryBuilder::new("users;drop").build_select(&["*"]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidIdentifier { kind: "table", .. }));
        let err = QueryBuilder::new("users").build_select(&["id, 1"]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidIdentifier { kind: "column", .. }));
    }
}
