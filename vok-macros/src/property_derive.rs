use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::crate_path::vok_data_path;
use crate::fields::{const_name, option_inner_type, property_fields};

pub fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate(&input) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let krate = vok_data_path();
    let fields = property_fields(input, "PropertyAccess")?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let record_name = name.to_string();

    let arms = fields.iter().map(|f| {
        let ident = &f.ident;
        let key = &f.name;
        quote! {
            #key => ::core::option::Option::Some(#krate::ToValue::to_value(&self.#ident))
        }
    });

    // Option<T> fields filter on T
    let consts = fields.iter().map(|f| {
        let const_ident = const_name(&f.ident);
        let key = &f.name;
        let value_ty = option_inner_type(&f.ty).unwrap_or(&f.ty);
        let doc = format!("Typed reference to the `{key}` property.");
        quote! {
            #[doc = #doc]
            pub const #const_ident: #krate::Field<Self, #value_ty> = #krate::Field::new(#key);
        }
    });

    Ok(quote! {
        impl #impl_generics #krate::PropertyAccess for #name #ty_generics #where_clause {
            fn property(&self, name: &str) -> ::core::option::Option<#krate::Value> {
                match name {
                    #(#arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn record_name() -> &'static str {
                #record_name
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #(#consts)*
        }
    })
}
