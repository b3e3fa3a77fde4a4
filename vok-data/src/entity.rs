use crate::value::ToValue;

/// Trait representing a database entity with a table name, id column, and column list.
///
/// Intended to be implemented manually or via a derive macro (`#[derive(Entity)]`).
///
/// # Example
///
/// ```ignore
/// impl Entity for Person {
///     type Id = i64;
///     fn table_name() -> &'static str { "person" }
///     fn id_column() -> &'static str { "id" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "age"] }
///     fn id(&self) -> &i64 { &self.id }
/// }
/// ```
pub trait Entity: Send + Sync + Unpin + 'static {
    type Id: ToValue + Send + Sync + 'static;

    fn table_name() -> &'static str;
    fn id_column() -> &'static str;
    /// The columns an entity is loaded from; entity loaders select exactly
    /// these.
    fn columns() -> &'static [&'static str];
    fn id(&self) -> &Self::Id;
}
