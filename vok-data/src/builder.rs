//! Typed filter construction.
//!
//! `#[derive(PropertyAccess)]` generates one [`Field`] constant per struct
//! field, so filters are built against names the compiler has checked:
//!
//! ```ignore
//! let f = Person::AGE.between(25..=50) & Person::NAME.ilike("ari");
//! ```

use crate::filter::Filter;
use crate::value::ToValue;
use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeInclusive;

/// A typed reference to property `name` of entity `E`, holding values of `V`.
pub struct Field<E, V> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> Field<E, V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_null(&self) -> Filter {
        Filter::is_null(self.name)
    }

    pub fn is_not_null(&self) -> Filter {
        Filter::is_not_null(self.name)
    }
}

impl<E, V: ToValue> Field<E, V> {
    pub fn eq(&self, value: impl Into<V>) -> Filter {
        Filter::eq(self.name, value.into())
    }

    pub fn lt(&self, value: impl Into<V>) -> Filter {
        Filter::lt(self.name, value.into())
    }

    pub fn le(&self, value: impl Into<V>) -> Filter {
        Filter::le(self.name, value.into())
    }

    pub fn gt(&self, value: impl Into<V>) -> Filter {
        Filter::gt(self.name, value.into())
    }

    pub fn ge(&self, value: impl Into<V>) -> Filter {
        Filter::ge(self.name, value.into())
    }

    /// `ge(min) and le(max)`.
    pub fn between(&self, range: RangeInclusive<V>) -> Filter {
        let (min, max) = range.into_inner();
        Filter::ge(self.name, min).and(Filter::le(self.name, max))
    }
}

impl<E> Field<E, String> {
    pub fn like(&self, substring: &str) -> Filter {
        Filter::like(self.name, substring)
    }

    pub fn ilike(&self, substring: &str) -> Filter {
        Filter::ilike(self.name, substring)
    }
}

impl<E> Field<E, bool> {
    pub fn is_true(&self) -> Filter {
        Filter::eq(self.name, true)
    }

    pub fn is_false(&self) -> Filter {
        Filter::eq(self.name, false)
    }
}

impl<E, V> Clone for Field<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Field<E, V> {}

impl<E, V> fmt::Debug for Field<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A native SQL filter, e.g. `native("age < :age_p", [("age_p", 60)])`.
pub fn native<K, V>(fragment: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Filter
where
    K: Into<String>,
    V: ToValue,
{
    Filter::native(fragment, params)
}

/// Builds filters from untyped property names. Implementations pick the
/// filter representation; [`FilterFactory::between`] is derived from the
/// other operations.
pub trait FilterFactory {
    fn and(&self, filters: Vec<Filter>) -> Option<Filter>;
    fn or(&self, filters: Vec<Filter>) -> Option<Filter>;
    fn eq(&self, property: &str, value: &dyn ToValue) -> Filter;
    fn le(&self, property: &str, value: &dyn ToValue) -> Filter;
    fn ge(&self, property: &str, value: &dyn ToValue) -> Filter;
    fn ilike(&self, property: &str, substring: &str) -> Filter;

    /// `ge(min) and le(max)`, or just `eq(min)` when both bounds are equal.
    fn between(&self, property: &str, min: &dyn ToValue, max: &dyn ToValue) -> Filter {
        let (min_value, max_value) = (min.to_value(), max.to_value());
        if min_value == max_value {
            return self.eq(property, &min_value);
        }
        let ge = self.ge(property, &min_value);
        let le = self.le(property, &max_value);
        self.and(vec![ge.clone(), le]).unwrap_or(ge)
    }
}

/// The [`FilterFactory`] producing SQL-92 capable [`Filter`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFilterFactory;

impl FilterFactory for SqlFilterFactory {
    fn and(&self, filters: Vec<Filter>) -> Option<Filter> {
        Filter::all(filters)
    }

    fn or(&self, filters: Vec<Filter>) -> Option<Filter> {
        Filter::any(filters)
    }

    fn eq(&self, property: &str, value: &dyn ToValue) -> Filter {
        Filter::eq(property, value.to_value())
    }

    fn le(&self, property: &str, value: &dyn ToValue) -> Filter {
        Filter::le(property, value.to_value())
    }

    fn ge(&self, property: &str, value: &dyn ToValue) -> Filter {
        Filter::ge(property, value.to_value())
    }

    fn ilike(&self, property: &str, substring: &str) -> Filter {
        Filter::ilike(property, substring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person;

    const AGE: Field<Person, i32> = Field::new("age");
    const NAME: Field<Person, String> = Field::new("name");
    const ACTIVE: Field<Person, bool> = Field::new("active");

    #[test]
    fn between_is_ge_and_le() {
        assert_eq!(AGE.between(25..=50), Filter::ge("age", 25).and(Filter::le("age", 50)));
    }

    #[test]
    fn text_and_bool_fields() {
        assert_eq!(NAME.ilike("ari"), Filter::ilike("name", "ari"));
        assert_eq!(NAME.eq("kari"), Filter::eq("name", "kari"));
        assert_eq!(ACTIVE.is_true(), Filter::eq("active", true));
        assert_eq!(ACTIVE.is_false(), Filter::eq("active", false));
        assert_eq!(AGE.is_null(), Filter::is_null("age"));
    }

    #[test]
    fn factory_between_collapses_equal_bounds() {
        let factory = SqlFilterFactory;
        assert_eq!(factory.between("age", &5, &5), Filter::eq("age", 5));
        assert_eq!(
            factory.between("age", &5, &9),
            Filter::ge("age", 5).and(Filter::le("age", 9))
        );
    }
}
