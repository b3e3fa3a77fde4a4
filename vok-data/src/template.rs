use crate::error::FilterError;
use crate::filter::Filter;
use crate::range::RowRange;
use crate::sort::SortClause;
use crate::sql::{bind_parameter, order_by_list, Dialect, NamedSql};
use crate::value::{ToValue, Value};
use std::collections::BTreeMap;

/// Substituted with `and <predicate>`, or nothing.
pub const WHERE: &str = "{{WHERE}}";
/// Substituted with `, <column> ASC|DESC, ...`, or nothing.
pub const ORDER: &str = "{{ORDER}}";
/// Substituted with the dialect's offset/limit clause, or nothing.
pub const PAGING: &str = "{{PAGING}}";

/// Hand-written SQL with `{{WHERE}}`, `{{ORDER}}` and `{{PAGING}}`
/// substitution points, plus its own named parameters.
///
/// The template is expected to provide the surrounding syntax, e.g.
///
/// ```text
/// select p.id, p.name from person p where age > :age {{WHERE}} order by null{{ORDER}} {{PAGING}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTemplate {
    sql: String,
    params: BTreeMap<String, Value>,
}

impl SqlTemplate {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    /// Binds a template-level parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        self.params.insert(name.into(), value.to_value());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Renders the select for one page.
    ///
    /// # Errors
    ///
    /// Invalid sort columns or filter properties, and
    /// [`FilterError::ConflictingParameter`] when a filter binds a different
    /// value to one of the template's parameter names.
    pub fn render(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
        dialect: Dialect,
    ) -> Result<NamedSql, FilterError> {
        let order = if sort_by.is_empty() {
            String::new()
        } else {
            format!(", {}", order_by_list(sort_by)?)
        };
        let paging = dialect.template_paging(range);
        self.substitute(filter, &order, &paging, dialect)
    }

    /// Renders `SELECT COUNT(*) FROM (<template>) AS vok_count`, with no
    /// ordering and no paging inside.
    pub fn render_count(&self, filter: Option<&Filter>, dialect: Dialect) -> Result<NamedSql, FilterError> {
        let inner = self.substitute(filter, "", "", dialect)?;
        Ok(NamedSql::new(
            format!("SELECT COUNT(*) FROM ({}) AS vok_count", inner.sql.trim()),
            inner.params,
        ))
    }

    fn substitute(
        &self,
        filter: Option<&Filter>,
        order: &str,
        paging: &str,
        dialect: Dialect,
    ) -> Result<NamedSql, FilterError> {
        let mut params = self.params.clone();
        let clause = match filter {
            Some(filter) => {
                for (name, value) in filter.sql92_parameters_with(dialect)? {
                    bind_parameter(&mut params, name, value)?;
                }
                format!("and {}", filter.to_sql92_with(dialect)?)
            }
            None => String::new(),
        };
        let sql = self
            .sql
            .replace(WHERE, &clause)
            .replace(ORDER, order)
            .replace(PAGING, paging);
        Ok(NamedSql::new(sql, params))
    }
}
