extern crate proc_macro;
use proc_macro::TokenStream;

pub(crate) mod crate_path;
pub(crate) mod entity_derive;
pub(crate) mod fields;
pub(crate) mod property_derive;

/// Derive macro for named property lookup, used by in-memory filtering.
///
/// Generates a [`PropertyAccess`](vok_data::PropertyAccess) impl matching
/// each field name, plus one typed [`Field`](vok_data::Field) constant per
/// field (upper-cased field name) for building filters. `Option<T>` fields
/// produce `Field<Self, T>`.
///
/// # Field attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[property(rename = "...")]` | Property (and column) name, defaults to the field name |
/// | `#[property(skip)]` | Not a property; no lookup arm and no constant |
///
/// Field types must implement `ToValue`.
///
/// # Example
///
/// ```ignore
/// use vok_data::prelude::*;
///
/// #[derive(PropertyAccess, Clone)]
/// pub struct Person {
///     pub id: i64,
///     pub name: String,
///     pub age: Option<i32>,
/// }
///
/// let adults = Person::AGE.ge(18) & Person::NAME.ilike("an");
/// ```
#[proc_macro_derive(PropertyAccess, attributes(property))]
pub fn derive_property_access(input: TokenStream) -> TokenStream {
    property_derive::expand(input)
}

/// Derive macro for [`Entity`](vok_data::Entity) metadata.
///
/// # Struct-level attribute
///
/// `#[entity(table = "...", id = "...")]`: the table defaults to the
/// snake_cased struct name, the id column to `id`.
///
/// Columns are the struct fields, honouring `#[property(rename/skip)]`.
///
/// # Example
///
/// ```ignore
/// #[derive(Entity, PropertyAccess, sqlx::FromRow)]
/// #[entity(table = "person")]
/// pub struct Person {
///     pub id: i64,
///     pub name: String,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity, property))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity_derive::expand(input)
}
