use syn::{Data, DeriveInput, Fields};

/// A named struct field with its `#[property(...)]` settings applied.
pub struct PropertyField {
    pub ident: syn::Ident,
    pub ty: syn::Type,
    /// Property (and column) name.
    pub name: String,
}

/// Collects the non-skipped named fields of a struct.
pub fn property_fields(input: &DeriveInput, derive: &str) -> syn::Result<Vec<PropertyField>> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    format!("#[derive({derive})] only works on structs with named fields"),
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                format!("#[derive({derive})] only works on structs"),
            ))
        }
    };

    let mut out = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let attrs = property_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let name = attrs
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        out.push(PropertyField {
            ident,
            ty: field.ty.clone(),
            name,
        });
    }
    Ok(out)
}

#[derive(Default)]
struct PropertyAttrs {
    rename: Option<String>,
    skip: bool,
}

/// Extract `#[property(rename = "...", skip)]` from a field's attributes.
fn property_attrs(attrs: &[syn::Attribute]) -> syn::Result<PropertyAttrs> {
    let mut result = PropertyAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("property") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let lit: syn::LitStr = value.parse()?;
                    result.rename = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename` or `skip` in #[property(...)]"))
                }
            })?;
        }
    }
    Ok(result)
}

/// Extract the inner type from `Option<T>`.
pub fn option_inner_type(ty: &syn::Type) -> Option<&syn::Type> {
    if let syn::Type::Path(syn::TypePath { path, .. }) = ty {
        if let Some(seg) = path.segments.last() {
            if seg.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &seg.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner);
                    }
                }
            }
        }
    }
    None
}

/// `created_at` -> `CREATED_AT`.
pub fn const_name(field: &syn::Ident) -> syn::Ident {
    let upper = field.to_string().trim_start_matches("r#").to_uppercase();
    syn::Ident::new(&upper, field.span())
}

/// `PersonAddress` -> `person_address`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
