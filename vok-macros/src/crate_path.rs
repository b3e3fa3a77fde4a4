//! Crate path resolution for generated code.
//!
//! Detects whether the user depends on `vok` (facade) or `vok-data` directly,
//! and returns the appropriate path prefix for generated code.

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

/// Returns the token stream for accessing `vok_data` types.
///
/// If the user depends on `vok`, returns `::vok::data`.
/// Otherwise returns `::vok_data`.
pub fn vok_data_path() -> TokenStream {
    // First check if the facade crate is available
    if let Ok(found) = crate_name("vok") {
        match found {
            // the facade declares `extern crate self as vok`
            FoundCrate::Itself => quote!(::vok::data),
            FoundCrate::Name(name) => {
                let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
                quote!(::#ident::data)
            }
        }
    } else if let Ok(found) = crate_name("vok-data") {
        match found {
            // vok-data declares `extern crate self as vok_data`, which also
            // covers its integration tests
            FoundCrate::Itself => quote!(::vok_data),
            FoundCrate::Name(name) => {
                let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
                quote!(::#ident)
            }
        }
    } else {
        // Fallback - assume vok_data is available (for error messages)
        quote!(::vok_data)
    }
}
