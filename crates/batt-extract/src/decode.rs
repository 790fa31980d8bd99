//! Source decoders used by `#[derive(Bind)]` expansions.
//!
//! Each decoder turns one raw source into the per-stage partial view the
//! derive generates, tagging failures with the stage they came from.

use crate::{BindStage, ExtractionError, Params};
use serde::de::DeserializeOwned;
use std::collections::HashSet;

#[doc(hidden)]
pub use serde;

/// Decodes a query string. A repeated key binds its first value.
pub fn decode_query<T: DeserializeOwned>(query: &str) -> Result<T, ExtractionError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| ExtractionError::deserialization_failed(BindStage::Query, e.to_string()))?;

    let first = first_values(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    decode_pairs(BindStage::Query, &first)
}

/// Decodes route parameters. A repeated name binds its first value, as
/// [`Params::get`] does.
pub fn decode_params<T: DeserializeOwned>(params: &Params) -> Result<T, ExtractionError> {
    let first = first_values(params.iter());
    decode_pairs(BindStage::Params, &first)
}

/// Decodes a JSON body. The body must be a JSON object.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ExtractionError> {
    let first = body.iter().find(|b| !b.is_ascii_whitespace());
    if first != Some(&b'{') {
        return Err(ExtractionError::deserialization_failed(
            BindStage::Body,
            "expected a JSON object",
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| ExtractionError::deserialization_failed(BindStage::Body, e.to_string()))
}

/// Decodes a URL-encoded form body.
pub fn decode_form<T: DeserializeOwned>(body: &[u8]) -> Result<T, ExtractionError> {
    serde_urlencoded::from_bytes(body)
        .map_err(|e| ExtractionError::deserialization_failed(BindStage::Body, e.to_string()))
}

fn first_values<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(&'a str, &'a str)> {
    let mut seen = HashSet::new();
    pairs.filter(|(key, _)| seen.insert(*key)).collect()
}

// Re-encoding keeps the typed parsing of scalars (numbers, bools) that
// serde_urlencoded applies to string values.
fn decode_pairs<T: DeserializeOwned>(
    stage: BindStage,
    pairs: &[(&str, &str)],
) -> Result<T, ExtractionError> {
    let encoded = serde_urlencoded::to_string(pairs)
        .map_err(|e| ExtractionError::deserialization_failed(stage, e.to_string()))?;
    serde_urlencoded::from_str(&encoded)
        .map_err(|e| ExtractionError::deserialization_failed(stage, e.to_string()))
}
