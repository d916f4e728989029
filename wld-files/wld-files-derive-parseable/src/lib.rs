use proc_macro2::{Span, TokenStream};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{quote, quote_spanned};
use syn::{Data, DeriveInput, Fields, Ident, parse_macro_input, spanned::Spanned};

/// Derives `Parseable` for a named-field struct: every field is read in
/// declaration order through its own `Parseable` impl, the container has no
/// field names, only offsets. WLD arrays are explicit-count, so no `Vec`
/// companion impl is generated; repetition stays with the caller that read
/// the count.
#[proc_macro_derive(Parse)]
pub fn derive_parseable(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand(input).into()
}

fn expand(input: DeriveInput) -> TokenStream {
    let root = match crate_name("wld-files").expect("wld-files is present in `Cargo.toml`") {
        FoundCrate::Itself => quote!(crate),
        FoundCrate::Name(name) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(#ident)
        }
    };

    let ident = input.ident;
    let fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            Fields::Unnamed(_) | Fields::Unit => {
                panic!("`#[derive(Parse)]` needs named struct fields: {}", ident)
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            panic!("`#[derive(Parse)]` is only available on structs: {}", ident)
        }
    };

    // Fully qualified calls, so use sites need neither the trait nor Read
    // in scope.
    let reads = fields.iter().map(|field| {
        let name = &field.ident;
        let ty = &field.ty;
        quote_spanned! {field.span()=>
            #name: <#ty as #root::common::reader::Parseable<#ty>>::parse(rdr)?,
        }
    });

    quote!(
        impl #root::common::reader::Parseable<#ident> for #ident {
            fn parse<R: std::io::Read>(rdr: &mut R) -> Result<#ident, #root::ParserError> {
                Ok(#ident { #(#reads)* })
            }
        }
    )
}
