//! The filter expression tree.
//!
//! A [`Filter`] is an immutable predicate over named record properties. The
//! same tree is interpreted two ways: rendered into a parameterized SQL-92
//! `WHERE` fragment (see [`crate::sql`]) or evaluated against a record in
//! memory (see [`crate::eval`]).
//!
//! ```
//! use vok_data::Filter;
//!
//! let adults = Filter::ge("age", 18) & Filter::ilike("name", "an");
//! assert_eq!(adults.to_string(), r#"(age >= 18 and name ILIKE "%an%")"#);
//! ```

use crate::value::{ToValue, Value};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PARAM: AtomicU64 = AtomicU64::new(1);

/// The SQL bind-parameter name owned by one leaf filter instance.
///
/// Drawn from a process-wide counter when the leaf is built, so two leaves
/// never share a name unless one is a clone of the other (and then they also
/// share the value). Rendered as `vokp_<base36>`; the `vokp_` prefix is
/// reserved, native fragments and templates should not use it.
#[derive(Debug, Clone, Copy)]
pub struct ParamName(u64);

impl ParamName {
    pub(crate) fn next() -> Self {
        ParamName(NEXT_PARAM.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut n = self.0;
        let mut digits = Vec::new();
        loop {
            digits.push(DIGITS[(n % 36) as usize] as char);
            n /= 36;
            if n == 0 {
                break;
            }
        }
        let name: String = digits.iter().rev().collect();
        write!(f, "vokp_{name}")
    }
}

/// Compares a property against a value. Equality ignores the parameter name.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub(crate) property: String,
    pub(crate) value: Value,
    pub(crate) param: ParamName,
}

impl Predicate {
    fn new(property: impl Into<String>, value: Value) -> Self {
        Self {
            property: property.into(),
            value,
            param: ParamName::next(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn param_name(&self) -> String {
        self.param.to_string()
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property && self.value == other.value
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.property.hash(state);
        self.value.hash(state);
    }
}

/// A substring match. The substring is trimmed on construction and bound to
/// SQL as `%substring%`, or as the bare substring where the dialect matches
/// with `instr`.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) property: String,
    pub(crate) substring: String,
    pub(crate) param: ParamName,
}

impl Pattern {
    fn new(property: impl Into<String>, substring: &str) -> Self {
        Self {
            property: property.into(),
            substring: substring.trim().to_string(),
            param: ParamName::next(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn substring(&self) -> &str {
        &self.substring
    }

    /// The `LIKE` pattern, `%substring%`.
    pub fn value(&self) -> Value {
        Value::Text(format!("%{}%", self.substring))
    }

    pub fn param_name(&self) -> String {
        self.param.to_string()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property && self.substring == other.substring
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.property.hash(state);
        self.substring.hash(state);
    }
}

/// Ordering operators of [`Filter::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOperator {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOperator {
    pub fn sql92_operator(self) -> &'static str {
        match self {
            CompareOperator::Lt => "<",
            CompareOperator::Le => "<=",
            CompareOperator::Gt => ">",
            CompareOperator::Ge => ">=",
        }
    }

    pub(crate) fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOperator::Lt => ordering == Less,
            CompareOperator::Le => ordering != Greater,
            CompareOperator::Gt => ordering == Greater,
            CompareOperator::Ge => ordering != Less,
        }
    }
}

/// Raw SQL with its own named parameters, e.g. `age > :min_age`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeSql {
    pub(crate) fragment: String,
    pub(crate) params: BTreeMap<String, Value>,
}

impl NativeSql {
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Junction {
    And,
    Or,
}

/// The children of an `And`/`Or` node: a set without duplicates and without
/// nested composites of the same kind. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    children: Vec<Filter>,
}

impl FilterSet {
    fn flatten(junction: Junction, filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut set = FilterSet::default();
        for filter in filters {
            match (junction, filter) {
                (Junction::And, Filter::And(nested)) | (Junction::Or, Filter::Or(nested)) => {
                    for child in nested.children {
                        set.insert(child);
                    }
                }
                (_, other) => set.insert(other),
            }
        }
        set
    }

    fn insert(&mut self, filter: Filter) {
        if !self.children.contains(&filter) {
            self.children.push(filter);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, filter: &Filter) -> bool {
        self.children.contains(filter)
    }
}

impl PartialEq for FilterSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|child| other.contains(child))
    }
}

impl Eq for FilterSet {}

impl Hash for FilterSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // order-independent
        let combined = self.iter().fold(0u64, |acc, child| {
            let mut hasher = DefaultHasher::new();
            child.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A predicate expression over named record properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FilterRepr", into = "FilterRepr")]
pub enum Filter {
    /// `property = value`; the value may be null.
    Eq(Predicate),
    /// `property <op> value`; never matches a null property in memory.
    Compare(Predicate, CompareOperator),
    IsNull(String),
    IsNotNull(String),
    /// Case-sensitive substring match.
    Like(Pattern),
    /// Case-insensitive substring match.
    ILike(Pattern),
    And(FilterSet),
    Or(FilterSet),
    Not(Box<Filter>),
    /// Opaque SQL; can't be evaluated in memory.
    NativeSql(NativeSql),
}

impl Filter {
    /// `property = value`. An `eq` against [`Value::Null`] renders as
    /// `property is null` in SQL, matching the in-memory `null = null`.
    pub fn eq(property: impl Into<String>, value: impl ToValue) -> Self {
        Filter::Eq(Predicate::new(property, value.to_value()))
    }

    pub fn compare(property: impl Into<String>, operator: CompareOperator, value: impl ToValue) -> Self {
        Filter::Compare(Predicate::new(property, value.to_value()), operator)
    }

    pub fn lt(property: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(property, CompareOperator::Lt, value)
    }

    pub fn le(property: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(property, CompareOperator::Le, value)
    }

    pub fn gt(property: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(property, CompareOperator::Gt, value)
    }

    pub fn ge(property: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(property, CompareOperator::Ge, value)
    }

    pub fn is_null(property: impl Into<String>) -> Self {
        Filter::IsNull(property.into())
    }

    pub fn is_not_null(property: impl Into<String>) -> Self {
        Filter::IsNotNull(property.into())
    }

    pub fn like(property: impl Into<String>, substring: &str) -> Self {
        Filter::Like(Pattern::new(property, substring))
    }

    pub fn ilike(property: impl Into<String>, substring: &str) -> Self {
        Filter::ILike(Pattern::new(property, substring))
    }

    /// A raw SQL fragment, e.g. `Filter::native("age < :age_p", [("age_p", 60)])`.
    pub fn native<K, V>(fragment: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToValue,
    {
        Filter::NativeSql(NativeSql {
            fragment: fragment.into(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_value()))
                .collect(),
        })
    }

    /// ANDs `self` with `other`, flattening nested `And` nodes on both sides.
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(FilterSet::flatten(Junction::And, [self, other]))
    }

    /// ORs `self` with `other`, flattening nested `Or` nodes on both sides.
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(FilterSet::flatten(Junction::Or, [self, other]))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }

    /// ANDs all given filters. No filters yield `None` (no restriction), a
    /// single filter is returned unchanged.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        Self::combine(Junction::And, filters)
    }

    /// ORs all given filters, collapsing like [`Filter::all`].
    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        Self::combine(Junction::Or, filters)
    }

    fn combine(junction: Junction, filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        let mut filters: Vec<Filter> = filters.into_iter().collect();
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => {
                let set = FilterSet::flatten(junction, filters);
                Some(match junction {
                    Junction::And => Filter::And(set),
                    Junction::Or => Filter::Or(set),
                })
            }
        }
    }

    /// The compared property for leaf filters.
    pub fn property(&self) -> Option<&str> {
        match self {
            Filter::Eq(p) | Filter::Compare(p, _) => Some(&p.property),
            Filter::Like(p) | Filter::ILike(p) => Some(&p.property),
            Filter::IsNull(property) | Filter::IsNotNull(property) => Some(property),
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) | Filter::NativeSql(_) => None,
        }
    }

    /// The children of an `And`/`Or` node.
    pub fn children(&self) -> Option<&FilterSet> {
        match self {
            Filter::And(set) | Filter::Or(set) => Some(set),
            _ => None,
        }
    }
}

impl std::ops::BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        self.or(rhs)
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Eq(p) => write!(f, "{} = {}", p.property, p.value),
            Filter::Compare(p, op) => write!(f, "{} {} {}", p.property, op.sql92_operator(), p.value),
            Filter::IsNull(property) => write!(f, "{property} is null"),
            Filter::IsNotNull(property) => write!(f, "{property} is not null"),
            Filter::Like(p) => write!(f, "{} LIKE \"{}\"", p.property, p.value()),
            Filter::ILike(p) => write!(f, "{} ILIKE \"{}\"", p.property, p.value()),
            Filter::And(set) => write_junction(f, set, " and "),
            Filter::Or(set) => write_junction(f, set, " or "),
            Filter::Not(child) => write!(f, "not ({child})"),
            Filter::NativeSql(native) => write!(f, "{}", native.fragment),
        }
    }
}

fn write_junction(f: &mut fmt::Formatter<'_>, set: &FilterSet, separator: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in set.iter().enumerate() {
        if i > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}

/// Collapses a collection of filters into one, see [`Filter::all`].
pub trait CombineFilters {
    fn and(self) -> Option<Filter>;
    fn or(self) -> Option<Filter>;
}

impl CombineFilters for Vec<Filter> {
    fn and(self) -> Option<Filter> {
        Filter::all(self)
    }

    fn or(self) -> Option<Filter> {
        Filter::any(self)
    }
}

impl CombineFilters for HashSet<Filter> {
    fn and(self) -> Option<Filter> {
        Filter::all(self)
    }

    fn or(self) -> Option<Filter> {
        Filter::any(self)
    }
}

impl<const N: usize> CombineFilters for [Filter; N] {
    fn and(self) -> Option<Filter> {
        Filter::all(self)
    }

    fn or(self) -> Option<Filter> {
        Filter::any(self)
    }
}

/// Serialized form of [`Filter`]. Deserialization goes back through the
/// public constructors so composites are re-flattened and leaves get fresh
/// parameter names.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FilterRepr {
    Eq { property: String, value: Value },
    Compare { property: String, operator: CompareOperator, value: Value },
    IsNull { property: String },
    IsNotNull { property: String },
    Like { property: String, substring: String },
    #[serde(rename = "ilike")]
    ILike { property: String, substring: String },
    And { children: Vec<Filter> },
    Or { children: Vec<Filter> },
    Not { child: Box<Filter> },
    NativeSql { fragment: String, params: BTreeMap<String, Value> },
}

impl From<FilterRepr> for Filter {
    fn from(repr: FilterRepr) -> Self {
        match repr {
            FilterRepr::Eq { property, value } => Filter::eq(property, value),
            FilterRepr::Compare { property, operator, value } => Filter::compare(property, operator, value),
            FilterRepr::IsNull { property } => Filter::IsNull(property),
            FilterRepr::IsNotNull { property } => Filter::IsNotNull(property),
            FilterRepr::Like { property, substring } => Filter::like(property, &substring),
            FilterRepr::ILike { property, substring } => Filter::ilike(property, &substring),
            FilterRepr::And { children } => Filter::And(FilterSet::flatten(Junction::And, children)),
            FilterRepr::Or { children } => Filter::Or(FilterSet::flatten(Junction::Or, children)),
            FilterRepr::Not { child } => Filter::Not(child),
            FilterRepr::NativeSql { fragment, params } => Filter::NativeSql(NativeSql { fragment, params }),
        }
    }
}

impl From<Filter> for FilterRepr {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Eq(p) => FilterRepr::Eq { property: p.property, value: p.value },
            Filter::Compare(p, operator) => FilterRepr::Compare {
                property: p.property,
                operator,
                value: p.value,
            },
            Filter::IsNull(property) => FilterRepr::IsNull { property },
            Filter::IsNotNull(property) => FilterRepr::IsNotNull { property },
            Filter::Like(p) => FilterRepr::Like { property: p.property, substring: p.substring },
            Filter::ILike(p) => FilterRepr::ILike { property: p.property, substring: p.substring },
            Filter::And(set) => FilterRepr::And { children: set.children },
            Filter::Or(set) => FilterRepr::Or { children: set.children },
            Filter::Not(child) => FilterRepr::Not { child },
            Filter::NativeSql(native) => FilterRepr::NativeSql {
                fragment: native.fragment,
                params: native.params,
            },
        }
    }
}
