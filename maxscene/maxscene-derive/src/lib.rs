extern crate proc_macro2;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::{Data, DeriveInput, Fields, Ident, parse_macro_input, spanned::Spanned};

/// Derives `FixedLayout` for a struct whose fields are themselves
/// `FixedLayout` (or a primitive with a `FixedLayout` impl), read in
/// declaration order. Only for records with no internal length prefix or
/// branching - the chunk tree itself is hand-written because it needs both.
#[proc_macro_derive(FixedLayout)]
pub fn derive_fixed_layout(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    derive_fixed_layout_internal(input).into()
}

pub(crate) fn derive_fixed_layout_internal(input: DeriveInput) -> TokenStream {
    let found_crate = crate_name("maxscene").expect("maxscene is present in `Cargo.toml`");

    let crate_name = match found_crate {
        FoundCrate::Itself => quote!(crate),
        FoundCrate::Name(name) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(#ident)
        }
    };

    let ident = input.ident;
    let parse_impl = match input.data {
        Data::Union(_) => panic!("`#[derive(FixedLayout)]` is only available on structs: {}", ident),
        Data::Struct(s) => match s.fields {
            Fields::Named(ref fields) => {
                let recurse = fields.named.iter().map(|f| {
                    let name = &f.ident;
                    let ftype = &f.ty;
                    quote_spanned! {f.span()=>
                        #name: <#ftype as #crate_name::common::reader::FixedLayout>::read_le(rdr)?,
                    }
                });
                quote! { #(#recurse)* }
            }
            _ => panic!(
                "`#[derive(FixedLayout)]` only supports named struct fields at the moment: {}",
                ident
            ),
        },
        Data::Enum(_) => panic!("`#[derive(FixedLayout)]` is only available on structs: {}", ident),
    };

    quote!(
        impl #crate_name::common::reader::FixedLayout for #ident {
            fn read_le<R: ::std::io::Read>(rdr: &mut R) -> ::std::result::Result<#ident, #crate_name::ParserError> {
                Ok(#ident {
                    #parse_impl
                })
            }
        }
    )
}
