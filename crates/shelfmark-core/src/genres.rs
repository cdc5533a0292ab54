//! Genre list encoding for the serialized storage column.
//!
//! SQLite has no array columns, so genres persist as a JSON-array text
//! column. The decode-failure fallback to an empty list is an explicit
//! contract of this boundary: a row whose genres text is missing,
//! malformed, or not an array of strings reads back as `[]` and never
//! produces an error.

/// Decode the stored genres text into an ordered list of labels.
///
/// `None`, malformed JSON, and JSON that is not an array of strings all
/// yield an empty list.
pub fn decode(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(text) if !text.is_empty() => {
            serde_json::from_str::<Vec<String>>(text).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Encode a genre list into its stored text form.
pub fn encode(genres: &[String]) -> String {
    // Serializing a string slice cannot fail in practice; fall back to the
    // empty-list encoding rather than propagate.
    serde_json::to_string(genres).unwrap_or_else(|_| "[]".to_string())
}
