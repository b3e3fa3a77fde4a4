//! SQL-92 rendering of filters and named-parameter binding.
//!
//! Filters render into `WHERE` fragments with named placeholders
//! (`age >= :vokp_1f`). Since SQLx only understands positional placeholders,
//! [`NamedSql::to_positional`] rewrites the text for a [`Dialect`] and returns
//! the values in bind order.

use crate::error::FilterError;
use crate::filter::{Filter, FilterSet};
use crate::range::RowRange;
use crate::sort::SortClause;
use crate::value::Value;
use std::collections::BTreeMap;

/// SQL flavour. Decides placeholder style, quoting, `LIKE`/`ILIKE` rendering
/// and the shape of paging clauses.
///
/// `LIKE` stays case-sensitive everywhere: SQLite renders it as
/// `instr(column, :substring) > 0` and MySQL as `LIKE BINARY`, since both
/// compare case-insensitively under their defaults. Without native `ILIKE`,
/// SQLite and MySQL fall back to `lower(column) LIKE lower(:pattern)`.
/// SQLite's `lower()` folds ASCII letters only, so a case-insensitive match on
/// non-ASCII text may differ from the in-memory evaluator, which folds the
/// full Unicode range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    pub fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }

    fn supports_ilike(self) -> bool {
        matches!(self, Dialect::Generic | Dialect::Postgres)
    }

    /// Paging for hand-written SQL templates.
    ///
    /// Empty for the unrestricted range. Generic and Postgres use
    /// `offset <start> limit <count>`; SQLite and MySQL require LIMIT first.
    pub fn template_paging(self, range: RowRange) -> String {
        if range.is_all() {
            return String::new();
        }
        match (self, range.limit()) {
            (Dialect::Generic | Dialect::Postgres, Some(limit)) => {
                format!("offset {} limit {limit}", range.offset())
            }
            (Dialect::Generic | Dialect::Postgres, None) => format!("offset {}", range.offset()),
            (Dialect::Sqlite | Dialect::MySql, Some(limit)) => {
                format!("limit {limit} offset {}", range.offset())
            }
            (Dialect::Sqlite | Dialect::MySql, None) => {
                format!("limit {} offset {}", self.unbounded_limit(), range.offset())
            }
        }
    }

    /// Trailing ` LIMIT n OFFSET m` for generated single-table queries.
    pub fn limit_offset(self, range: RowRange) -> String {
        if range.is_all() {
            return String::new();
        }
        match range.limit() {
            Some(limit) if range.offset() == 0 => format!(" LIMIT {limit}"),
            Some(limit) => format!(" LIMIT {limit} OFFSET {}", range.offset()),
            None => match self {
                Dialect::Generic | Dialect::Postgres => format!(" OFFSET {}", range.offset()),
                Dialect::Sqlite | Dialect::MySql => {
                    format!(" LIMIT {} OFFSET {}", self.unbounded_limit(), range.offset())
                }
            },
        }
    }

    fn unbounded_limit(self) -> &'static str {
        match self {
            Dialect::MySql => "18446744073709551615",
            _ => "-1",
        }
    }
}

impl Filter {
    /// Renders this filter as a generic SQL-92 `WHERE` fragment with named
    /// placeholders. Pair with [`Filter::sql92_parameters`].
    pub fn to_sql92(&self) -> Result<String, FilterError> {
        self.to_sql92_with(Dialect::Generic)
    }

    /// Renders this filter for a specific dialect. Pair with
    /// [`Filter::sql92_parameters_with`] for the same dialect.
    ///
    /// # Errors
    ///
    /// Fails with a [`FilterError`] naming the offending filter when a property
    /// is not a plain identifier or a composite has no children.
    pub fn to_sql92_with(&self, dialect: Dialect) -> Result<String, FilterError> {
        match self {
            Filter::Eq(p) if p.value.is_null() => {
                Ok(format!("{} is null", checked_property(&p.property, self)?))
            }
            Filter::Eq(p) => Ok(format!("{} = :{}", checked_property(&p.property, self)?, p.param)),
            Filter::Compare(p, op) => Ok(format!(
                "{} {} :{}",
                checked_property(&p.property, self)?,
                op.sql92_operator(),
                p.param
            )),
            Filter::IsNull(property) => Ok(format!("{} is null", checked_property(property, self)?)),
            Filter::IsNotNull(property) => {
                Ok(format!("{} is not null", checked_property(property, self)?))
            }
            Filter::Like(p) => {
                let property = checked_property(&p.property, self)?;
                match dialect {
                    Dialect::Sqlite => Ok(format!("instr({property}, :{}) > 0", p.param)),
                    Dialect::MySql => Ok(format!("{property} LIKE BINARY :{}", p.param)),
                    Dialect::Generic | Dialect::Postgres => Ok(format!("{property} LIKE :{}", p.param)),
                }
            }
            Filter::ILike(p) => {
                let property = checked_property(&p.property, self)?;
                if dialect.supports_ilike() {
                    Ok(format!("{property} ILIKE :{}", p.param))
                } else {
                    Ok(format!("lower({property}) LIKE lower(:{})", p.param))
                }
            }
            Filter::And(set) => render_junction(self, set, " and ", dialect),
            Filter::Or(set) => render_junction(self, set, " or ", dialect),
            Filter::Not(child) => Ok(format!("not ({})", child.to_sql92_with(dialect)?)),
            Filter::NativeSql(native) => Ok(native.fragment.clone()),
        }
    }

    /// The values bound to the placeholders produced by [`Filter::to_sql92`],
    /// keyed by parameter name.
    ///
    /// # Errors
    ///
    /// [`FilterError::ConflictingParameter`] when two parts of the tree bind
    /// different values to one name, e.g. two native fragments both using
    /// `:min`.
    pub fn sql92_parameters(&self) -> Result<BTreeMap<String, Value>, FilterError> {
        self.sql92_parameters_with(Dialect::Generic)
    }

    /// The values bound to the placeholders produced by
    /// [`Filter::to_sql92_with`] for `dialect`.
    pub fn sql92_parameters_with(&self, dialect: Dialect) -> Result<BTreeMap<String, Value>, FilterError> {
        let mut params = BTreeMap::new();
        self.collect_parameters(dialect, &mut params)?;
        Ok(params)
    }

    fn collect_parameters(&self, dialect: Dialect, out: &mut BTreeMap<String, Value>) -> Result<(), FilterError> {
        match self {
            Filter::Eq(p) if p.value.is_null() => Ok(()),
            Filter::Eq(p) | Filter::Compare(p, _) => bind_parameter(out, p.param.to_string(), p.value.clone()),
            Filter::Like(p) if dialect == Dialect::Sqlite => {
                bind_parameter(out, p.param.to_string(), Value::Text(p.substring.clone()))
            }
            Filter::Like(p) | Filter::ILike(p) => bind_parameter(out, p.param.to_string(), p.value()),
            Filter::IsNull(_) | Filter::IsNotNull(_) => Ok(()),
            Filter::And(set) | Filter::Or(set) => {
                for child in set {
                    child.collect_parameters(dialect, out)?;
                }
                Ok(())
            }
            Filter::Not(child) => child.collect_parameters(dialect, out),
            Filter::NativeSql(native) => {
                for (name, value) in &native.params {
                    bind_parameter(out, name.clone(), value.clone())?;
                }
                Ok(())
            }
        }
    }

    /// Renders the fragment together with its parameters.
    pub fn to_named_sql(&self, dialect: Dialect) -> Result<NamedSql, FilterError> {
        Ok(NamedSql::new(
            self.to_sql92_with(dialect)?,
            self.sql92_parameters_with(dialect)?,
        ))
    }
}

/// Inserts `name = value`, failing if `name` is already bound to something
/// else. Rebinding the same value is fine; cloned leaves share their name.
pub(crate) fn bind_parameter(
    params: &mut BTreeMap<String, Value>,
    name: String,
    value: Value,
) -> Result<(), FilterError> {
    match params.get(&name) {
        Some(existing) if *existing != value => Err(FilterError::ConflictingParameter(name)),
        Some(_) => Ok(()),
        None => {
            params.insert(name, value);
            Ok(())
        }
    }
}

fn render_junction(
    filter: &Filter,
    set: &FilterSet,
    separator: &str,
    dialect: Dialect,
) -> Result<String, FilterError> {
    if set.is_empty() {
        return Err(FilterError::Unsupported {
            filter: filter.to_string(),
            reason: "a composite filter needs at least one child to be rendered as SQL",
        });
    }
    let parts = set
        .iter()
        .map(|child| child.to_sql92_with(dialect))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(separator)))
}

fn checked_property<'a>(property: &'a str, filter: &Filter) -> Result<&'a str, FilterError> {
    if is_valid_identifier(property, false) {
        Ok(property)
    } else {
        Err(FilterError::InvalidIdentifier {
            kind: "property",
            ident: format!("{property} (in `{filter}`)"),
        })
    }
}

/// Renders `ORDER BY` items (`name ASC, age DESC`) after validating columns.
pub fn order_by_list(sort_by: &[SortClause]) -> Result<String, FilterError> {
    let mut items = Vec::with_capacity(sort_by.len());
    for clause in sort_by {
        if !is_valid_identifier(&clause.property, false) {
            return Err(FilterError::InvalidIdentifier {
                kind: "sort column",
                ident: clause.property.clone(),
            });
        }
        items.push(format!("{} {}", clause.property, if clause.ascending { "ASC" } else { "DESC" }));
    }
    Ok(items.join(", "))
}

/// SQL text with `:name` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedSql {
    pub sql: String,
    pub params: BTreeMap<String, Value>,
}

impl NamedSql {
    pub fn new(sql: impl Into<String>, params: BTreeMap<String, Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        scan(&self.sql, |token| {
            if let Token::Param(name) = token {
                names.push(name.to_string());
            }
        });
        names
    }

    /// Rewrites `:name` placeholders to the dialect's positional form and
    /// returns the values in bind order. Quoted strings, quoted identifiers
    /// and `::` casts are left untouched.
    ///
    /// # Errors
    ///
    /// [`FilterError::MissingParameter`] when a placeholder has no value.
    /// Values without a placeholder are ignored.
    pub fn to_positional(&self, dialect: Dialect) -> Result<(String, Vec<Value>), FilterError> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = Vec::new();
        let mut missing = None;
        scan(&self.sql, |token| match token {
            Token::Text(text) => sql.push_str(text),
            Token::Param(name) => match self.params.get(name) {
                Some(value) => {
                    values.push(value.clone());
                    sql.push_str(&dialect.placeholder(values.len()));
                }
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                }
            },
        });
        match missing {
            Some(name) => Err(FilterError::MissingParameter(name)),
            None => Ok((sql, values)),
        }
    }
}

enum Token<'a> {
    Text(&'a str),
    Param(&'a str),
}

fn scan<'a>(sql: &'a str, mut emit: impl FnMut(Token<'a>)) {
    let bytes = sql.as_bytes();
    let mut text_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        // a doubled quote is an escaped quote
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                emit(Token::Text(&sql[text_start..i]));
                emit(Token::Param(&sql[start..end]));
                text_start = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    if text_start < sql.len() {
        emit(Token::Text(&sql[text_start.min(sql.len())..]));
    }
}

/// Whether `ident` is a plain (optionally dotted) SQL identifier.
pub(crate) fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replaces generated parameter names with their values so assertions
    /// don't depend on the counter.
    fn unmangled(filter: &Filter) -> String {
        let mut sql = filter.to_sql92().unwrap();
        let mut params: Vec<_> = filter.sql92_parameters().unwrap().into_iter().collect();
        // longest first, so `:vokp_1` never clobbers `:vokp_1a`
        params.sort_by_key(|(name, _)| std::cmp::Reverse(name.len()));
        for (name, value) in params {
            sql = sql.replace(&format!(":{name}"), &format!(":{value}"));
        }
        sql
    }

    fn only_param(filter: &Filter) -> String {
        filter.sql92_parameters().unwrap().into_keys().next().unwrap()
    }

    #[test]
    fn leaf_rendering() {
        assert_eq!(unmangled(&Filter::eq("age", 25)), "age = :25");
        assert_eq!(unmangled(&Filter::lt("age", 25)), "age < :25");
        assert_eq!(unmangled(&Filter::like("name", "ari")), "name LIKE :%ari%");
        assert_eq!(unmangled(&Filter::ilike("name", "ari")), "name ILIKE :%ari%");
        assert_eq!(Filter::is_null("age").to_sql92().unwrap(), "age is null");
        assert_eq!(Filter::is_not_null("age").to_sql92().unwrap(), "age is not null");
        assert!(Filter::is_null("age").sql92_parameters().unwrap().is_empty());
    }

    #[test]
    fn composite_rendering() {
        let f = Filter::ge("age", 25).and(Filter::le("age", 50));
        assert_eq!(unmangled(&f), "(age >= :25 and age <= :50)");
        let f = Filter::eq("a", 1).or(Filter::eq("b", 2)).not();
        assert_eq!(unmangled(&f), "not ((a = :1 or b = :2))");
    }

    #[test]
    fn ilike_falls_back_to_lower_on_sqlite() {
        let f = Filter::ilike("name", "Ari");
        let param = only_param(&f);
        assert_eq!(
            f.to_sql92_with(Dialect::Sqlite).unwrap(),
            format!("lower(name) LIKE lower(:{param})")
        );
        assert_eq!(f.to_sql92_with(Dialect::Postgres).unwrap(), format!("name ILIKE :{param}"));
    }

    #[test]
    fn like_stays_case_sensitive_per_dialect() {
        let f = Filter::like("name", " al ");
        let param = only_param(&f);

        assert_eq!(f.to_sql92_with(Dialect::Sqlite).unwrap(), format!("instr(name, :{param}) > 0"));
        assert_eq!(
            f.sql92_parameters_with(Dialect::Sqlite).unwrap().get(&param),
            Some(&Value::Text("al".into()))
        );

        assert_eq!(f.to_sql92_with(Dialect::MySql).unwrap(), format!("name LIKE BINARY :{param}"));
        assert_eq!(f.to_sql92_with(Dialect::Postgres).unwrap(), format!("name LIKE :{param}"));
        assert_eq!(
            f.sql92_parameters_with(Dialect::MySql).unwrap().get(&param),
            Some(&Value::Text("%al%".into()))
        );
    }

    #[test]
    fn eq_null_renders_is_null() {
        let f = Filter::eq("age", Value::Null);
        assert_eq!(f.to_sql92().unwrap(), "age is null");
        assert!(f.sql92_parameters().unwrap().is_empty());
        assert_eq!(unmangled(&Filter::eq("age", None::<i64>).not()), "not (age is null)");
    }

    #[test]
    fn generated_names_do_not_clash_with_native_names() {
        let f = Filter::eq("id", 1).and(Filter::native("name = :p3", [("p3", "alfred")]));
        let params = f.sql92_parameters().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("p3"), Some(&Value::Text("alfred".into())));
        let (generated, value) = params.iter().find(|(name, _)| *name != "p3").unwrap();
        assert!(generated.starts_with("vokp_"));
        assert_eq!(value, &Value::Int(1));
    }

    #[test]
    fn conflicting_parameter_values_are_rejected() {
        let id = Filter::eq("id", 1);
        let generated = only_param(&id);
        let f = id.and(Filter::native(format!("name = :{generated}"), [(generated.as_str(), "alfred")]));
        assert_eq!(
            f.sql92_parameters(),
            Err(FilterError::ConflictingParameter(generated.clone()))
        );
        assert!(matches!(
            f.to_named_sql(Dialect::Sqlite),
            Err(FilterError::ConflictingParameter(name)) if name == generated
        ));

        let twice = Filter::native("a > :min", [("min", 1)]).and(Filter::native("b > :min", [("min", 1)]));
        assert_eq!(twice.sql92_parameters().unwrap().len(), 1);
        let clash = Filter::native("a > :min", [("min", 1)]).and(Filter::native("b > :min", [("min", 2)]));
        assert!(clash.sql92_parameters().is_err());
    }

    #[test]
    fn native_sql_is_verbatim() {
        let f = Filter::native("age < :age_p", [("age_p", 60)]);
        assert_eq!(f.to_sql92().unwrap(), "age < :age_p");
        assert_eq!(f.sql92_parameters().unwrap().get("age_p"), Some(&Value::Int(60)));
    }

    #[test]
    fn placeholders_match_parameters() {
        let f = Filter::eq("name", "kari")
            .and(Filter::ilike("city", "br").or(Filter::gt("age", 3)))
            .and(Filter::is_null("deleted").not())
            .and(Filter::native("score > :min_score", [("min_score", 10)]));
        let named = f.to_named_sql(Dialect::Generic).unwrap();
        let mut placeholders = named.placeholders();
        placeholders.sort();
        let keys: Vec<String> = named.params.keys().cloned().collect();
        assert_eq!(placeholders, keys);
    }

    #[test]
    fn invalid_property_fails_loudly() {
        let err = Filter::eq("age; drop table person", 1).to_sql92().unwrap_err();
        assert!(matches!(err, FilterError::InvalidIdentifier { kind: "property", .. }));
        assert!(err.to_string().contains("drop table"));
    }

    #[test]
    fn empty_composite_is_unsupported() {
        let f: Filter = serde_json::from_str(r#"{"type":"or","children":[]}"#).unwrap();
        assert!(matches!(f.to_sql92(), Err(FilterError::Unsupported { .. })));
    }

    #[test]
    fn positional_binding() {
        let mut params = BTreeMap::new();
        params.insert("a".to_string(), Value::Int(1));
        params.insert("b".to_string(), Value::Text("x".into()));
        let named = NamedSql::new("select ':a', x::text from t where a = :a and b = :b or a > :a", params);

        let (sql, values) = named.to_positional(Dialect::Postgres).unwrap();
        assert_eq!(sql, "select ':a', x::text from t where a = $1 and b = $2 or a > $3");
        assert_eq!(values, vec![Value::Int(1), Value::Text("x".into()), Value::Int(1)]);

        let (sql, _) = named.to_positional(Dialect::Sqlite).unwrap();
        assert_eq!(sql, "select ':a', x::text from t where a = ? and b = ? or a > ?");
    }

    #[test]
    fn positional_binding_reports_missing_values() {
        let named = NamedSql::new("a = :a", BTreeMap::new());
        assert_eq!(
            named.to_positional(Dialect::Generic),
            Err(FilterError::MissingParameter("a".into()))
        );
    }

    #[test]
    fn paging_clauses() {
        let range = RowRange::from(10..=19);
        assert_eq!(Dialect::Generic.template_paging(range), "offset 10 limit 10");
        assert_eq!(Dialect::Sqlite.template_paging(range), "limit 10 offset 10");
        assert_eq!(Dialect::Postgres.template_paging(RowRange::all()), "");
        assert_eq!(Dialect::Postgres.template_paging(RowRange::from(5..)), "offset 5");
        assert_eq!(Dialect::Sqlite.limit_offset(RowRange::from(5..)), " LIMIT -1 OFFSET 5");
        assert_eq!(Dialect::Sqlite.limit_offset(RowRange::from(0..=9)), " LIMIT 10");
    }

    #[test]
    fn order_by_validates_columns() {
        let clauses = [SortClause::asc("name"), SortClause::desc("age")];
        assert_eq!(order_by_list(&clauses).unwrap(), "name ASC, age DESC");
        assert!(order_by_list(&[SortClause::asc("1=1--")]).is_err());
    }
}
