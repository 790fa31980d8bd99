//! `#[derive(Bind)]` expansion.
//!
//! For every source the type has tags for, the expansion emits one `merge_*`
//! method. Each method declares a hidden struct holding an `Option` of every
//! field tagged for that source, decodes the source into it and writes back
//! only the values that were present.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, parse_quote, DeriveInput, Path};

use crate::parse::{BindField, BindInput, Source};

/// Expands `#[derive(Bind)]`.
pub fn expand_bind(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let bind = BindInput::from_derive(input)?;
    Ok(generate(&bind))
}

fn generate(bind: &BindInput) -> TokenStream {
    let ident = &bind.ident;
    let krate: Path = bind
        .attrs
        .krate
        .clone()
        .unwrap_or_else(|| parse_quote!(::batt_extract));

    let field_table = bind.fields.iter().map(|field| {
        let name = field.ident.unraw().to_string();
        let tags = field.tags.iter().map(|tag| {
            let variant = format_ident!("{}", tag.source.variant());
            let key = &tag.key;
            quote!((#krate::BindSource::#variant, #key))
        });
        quote!(#krate::FieldBinding::new(#name, &[#(#tags),*]))
    });

    let merges = Source::ALL
        .into_iter()
        .filter_map(|source| generate_merge(bind, &krate, source));

    let validate = if bind.attrs.user_validate {
        TokenStream::new()
    } else {
        quote!(impl #krate::Validate for #ident {})
    };

    quote! {
        impl #krate::RequestShape for #ident {
            const FIELDS: &'static [#krate::FieldBinding] = &[#(#field_table),*];
        }

        impl #krate::Bind for #ident {
            #(#merges)*
        }

        #validate
    }
}

fn generate_merge(bind: &BindInput, krate: &Path, source: Source) -> Option<TokenStream> {
    let targets: Vec<(&BindField, &str)> = bind
        .fields
        .iter()
        .filter_map(|field| field.key(source).map(|key| (field, key)))
        .collect();

    if targets.is_empty() {
        return None;
    }

    let (method, arg, arg_ty, decode) = match source {
        Source::Query => (
            quote!(merge_query),
            quote!(query),
            quote!(&str),
            quote!(decode_query),
        ),
        Source::Params => (
            quote!(merge_params),
            quote!(params),
            quote!(&#krate::Params),
            quote!(decode_params),
        ),
        Source::Json => (
            quote!(merge_json),
            quote!(body),
            quote!(&[u8]),
            quote!(decode_json),
        ),
        Source::Form => (
            quote!(merge_form),
            quote!(body),
            quote!(&[u8]),
            quote!(decode_form),
        ),
    };

    let serde_path = quote!(#krate::__private::serde).to_string();

    let part_fields = targets.iter().map(|(field, key)| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #[serde(rename = #key, default)]
            #ident: ::core::option::Option<#ty>
        }
    });

    let assigns = targets.iter().map(|(field, _)| {
        let ident = &field.ident;
        quote! {
            if let ::core::option::Option::Some(value) = part.#ident {
                self.#ident = value;
            }
        }
    });

    Some(quote! {
        fn #method(
            &mut self,
            #arg: #arg_ty,
        ) -> ::core::result::Result<(), #krate::ExtractionError> {
            #[derive(#krate::__private::serde::Deserialize)]
            #[serde(crate = #serde_path)]
            struct __BindPart {
                #(#part_fields,)*
            }

            let part: __BindPart = #krate::__private::#decode(#arg)?;
            #(#assigns)*
            ::core::result::Result::Ok(())
        }
    })
}
