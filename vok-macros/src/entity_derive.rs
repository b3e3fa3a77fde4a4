use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::crate_path::vok_data_path;
use crate::fields::{property_fields, snake_case};

pub fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate(&input) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed `#[entity(table = "...", id = "...")]`.
#[derive(Default)]
struct EntityAttrs {
    table: Option<String>,
    id: Option<String>,
}

fn entity_attrs(input: &DeriveInput) -> syn::Result<EntityAttrs> {
    let mut result = EntityAttrs::default();
    for attr in &input.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    result.table = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("id") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    result.id = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `table` or `id` in #[entity(...)]"))
                }
            })?;
        }
    }
    Ok(result)
}

fn generate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let krate = vok_data_path();
    let attrs = entity_attrs(input)?;
    let fields = property_fields(input, "Entity")?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let table = attrs.table.unwrap_or_else(|| snake_case(&name.to_string()));
    let id_name = attrs.id.unwrap_or_else(|| "id".to_string());
    let Some(id_field) = fields
        .iter()
        .find(|f| f.name == id_name || f.ident == id_name.as_str())
    else {
        return Err(syn::Error::new_spanned(
            name,
            format!(
                "#[derive(Entity)] could not find the id field `{id_name}`\n\
                 \n  example:\n  #[derive(Entity)]\n  #[entity(table = \"person\", id = \"id\")]\n  pub struct Person {{ id: i64, ... }}"
            ),
        ));
    };
    let id_ident = &id_field.ident;
    let id_ty = &id_field.ty;
    let id_column = &id_field.name;
    let columns = fields.iter().map(|f| &f.name);

    Ok(quote! {
        impl #impl_generics #krate::Entity for #name #ty_generics #where_clause {
            type Id = #id_ty;

            fn table_name() -> &'static str {
                #table
            }

            fn id_column() -> &'static str {
                #id_column
            }

            fn columns() -> &'static [&'static str] {
                &[#(#columns),*]
            }

            fn id(&self) -> &Self::Id {
                &self.#id_ident
            }
        }
    })
}
