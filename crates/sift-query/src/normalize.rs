//! Query normalization.

/// Trims the query and collapses every whitespace run to a single space.
///
/// All positions reported by the parser are offsets into the returned string.
pub fn normalize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
