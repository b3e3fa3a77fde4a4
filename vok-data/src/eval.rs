//! In-memory evaluation of filters.

use crate::error::FilterError;
use crate::filter::{Filter, Pattern};
use crate::value::Value;

/// Named property lookup on a record.
///
/// Usually derived with `#[derive(PropertyAccess)]`, which generates a `match`
/// over the field names. Returns `None` for unknown properties; a known but
/// absent value is `Some(Value::Null)`.
pub trait PropertyAccess {
    fn property(&self, name: &str) -> Option<Value>;

    /// Name used in error messages.
    fn record_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

impl<R: PropertyAccess> PropertyAccess for &R {
    fn property(&self, name: &str) -> Option<Value> {
        (**self).property(name)
    }

    fn record_name() -> &'static str {
        R::record_name()
    }
}

impl PropertyAccess for serde_json::Map<String, serde_json::Value> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).map(json_to_value)
    }

    fn record_name() -> &'static str {
        "JSON object"
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

impl Filter {
    /// Tests `record` against this filter.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownProperty`] when the record lacks a referenced
    /// property, [`FilterError::Unsupported`] for native SQL.
    pub fn test<R: PropertyAccess>(&self, record: &R) -> Result<bool, FilterError> {
        match self {
            Filter::Eq(p) => Ok(lookup(record, &p.property)?.loosely_equals(&p.value)),
            Filter::Compare(p, op) => {
                let actual = lookup(record, &p.property)?;
                Ok(actual
                    .compare(&p.value)
                    .is_some_and(|ordering| op.accepts(ordering)))
            }
            Filter::IsNull(property) => Ok(lookup(record, property)?.is_null()),
            Filter::IsNotNull(property) => Ok(!lookup(record, property)?.is_null()),
            Filter::Like(pattern) => matches_pattern(record, pattern, false),
            Filter::ILike(pattern) => matches_pattern(record, pattern, true),
            Filter::And(set) => {
                for child in set {
                    if !child.test(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(set) => {
                for child in set {
                    if child.test(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(child) => Ok(!child.test(record)?),
            Filter::NativeSql(_) => Err(FilterError::Unsupported {
                filter: self.to_string(),
                reason: "native SQL is not supported for in-memory filtering",
            }),
        }
    }
}

fn lookup<R: PropertyAccess>(record: &R, property: &str) -> Result<Value, FilterError> {
    record
        .property(property)
        .ok_or_else(|| FilterError::UnknownProperty {
            property: property.to_string(),
            record: R::record_name(),
        })
}

fn matches_pattern<R: PropertyAccess>(
    record: &R,
    pattern: &Pattern,
    ignore_case: bool,
) -> Result<bool, FilterError> {
    let value = lookup(record, &pattern.property)?;
    let Some(text) = value.as_str() else {
        return Ok(false);
    };
    if ignore_case {
        Ok(text.to_lowercase().contains(&pattern.substring.to_lowercase()))
    } else {
        Ok(text.contains(pattern.substring.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn comparisons_never_match_null() {
        let r = record(json!({"age": null}));
        for f in [Filter::lt("age", 1), Filter::le("age", 1), Filter::gt("age", 1), Filter::ge("age", 1)] {
            assert!(!f.test(&r).unwrap(), "{f}");
        }
        assert!(Filter::eq("age", None::<i32>).test(&r).unwrap());
        assert!(Filter::is_null("age").test(&r).unwrap());
    }

    #[test]
    fn negation_is_literal() {
        let r = record(json!({"age": null}));
        assert!(Filter::lt("age", 25).not().test(&r).unwrap());
    }

    #[test]
    fn numbers_match_across_representations() {
        let r = record(json!({"score": 2.0}));
        assert!(Filter::eq("score", 2).test(&r).unwrap());
        assert!(Filter::gt("score", 1).test(&r).unwrap());
    }

    #[test]
    fn like_and_ilike() {
        let r = record(json!({"name": "kari", "age": 3}));
        assert!(!Filter::like("name", "A").test(&r).unwrap());
        assert!(Filter::like("name", " a ").test(&r).unwrap());
        assert!(Filter::ilike("name", "A").test(&r).unwrap());
        assert!(!Filter::like("age", "3").test(&r).unwrap());
    }

    #[test]
    fn junctions_short_circuit() {
        let r = record(json!({"a": 1}));
        // the unknown property is never looked at
        assert!(!Filter::eq("a", 2).and(Filter::eq("missing", 1)).test(&r).unwrap());
        assert!(Filter::eq("a", 1).or(Filter::eq("missing", 1)).test(&r).unwrap());
    }

    #[test]
    fn unknown_property_is_an_error() {
        let r = record(json!({"a": 1}));
        let err = Filter::eq("b", 1).test(&r).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownProperty {
                property: "b".into(),
                record: "JSON object"
            }
        );
    }

    #[test]
    fn native_sql_is_rejected() {
        let r = record(json!({"a": 1}));
        let err = Filter::native("a = 1", Vec::<(String, i32)>::new()).test(&r).unwrap_err();
        assert!(matches!(err, FilterError::Unsupported { .. }));
    }
}
