//! Procedural macros for batt request binding.
//!
//! `#[derive(Bind)]` turns per-field source declarations into the static
//! field table and the per-stage merge code that `batt_extract::Binder` runs.
//! This crate is re-exported by `batt-extract`; depend on that instead.

mod bind;
mod parse;

use proc_macro::TokenStream;

/// Derives `RequestShape`, `Bind` and (by default) an empty `Validate`.
///
/// # Field attributes
///
/// - `#[bind(query = "key")]`: bound from the query string
/// - `#[bind(params = "key")]`: bound from route parameters
/// - `#[bind(json = "key")]`: bound from a JSON body
/// - `#[bind(form = "key")]`: bound from a URL-encoded form body
///
/// A field may list several sources. A source absent from the request, or a
/// key absent from a source, leaves the field as the earlier stages set it.
/// Untagged fields keep their `Default` value.
///
/// # Container attributes
///
/// - `#[bind(validate)]`: do not emit `Validate`; the type implements it
/// - `#[bind(crate = "path")]`: path to `batt_extract` when re-exported
///
/// # Example
///
/// ```rust,ignore
/// use batt_extract::Bind;
///
/// #[derive(Default, Bind)]
/// struct Search {
///     #[bind(query = "q", json = "query")]
///     query: String,
///     #[bind(params = "org")]
///     org: String,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    bind::expand_bind(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
