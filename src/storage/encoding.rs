//! Canonical encoding for a page's outbound links
//!
//! Links are stored as a JSON array. Encoding sorts and de-duplicates first, so
//! the same set of links always produces the same column value.

use crate::storage::StorageResult;
use std::collections::BTreeSet;

/// Encodes a link collection as a sorted, de-duplicated JSON array
pub fn encode_links<I, S>(links: I) -> StorageResult<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let canonical: BTreeSet<String> = links.into_iter().map(Into::into).collect();
    Ok(serde_json::to_string(&canonical)?)
}

/// Decodes a stored links column back into a list
///
/// An empty column is treated as an empty list.
pub fn decode_links(encoded: &str) -> StorageResult<Vec<String>> {
    if encoded.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(encoded)?)
}
