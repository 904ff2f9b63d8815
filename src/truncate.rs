//! Size caps and in-band truncation markers.
//!
//! Caps count `char`s, not bytes, so multi-byte text is never split inside a
//! code point.

/// Maximum characters of an uploaded file kept in its source content.
pub const FILE_CONTENT_CAP: usize = 20_000;
/// Maximum characters of extracted page text.
pub const PAGE_CONTENT_CAP: usize = 10_000;
/// Maximum characters per file in a repository's combined content.
pub const REPO_FILE_CAP: usize = 2_000;

pub const FILE_TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";
pub const PAGE_TRUNCATION_MARKER: &str = "...";
pub const REPO_FILE_TRUNCATION_MARKER: &str = "\n[... truncated]";

/// Cut `text` to `cap` characters and append `marker` if anything was dropped.
///
/// Text at or under the cap is returned unchanged.
pub fn truncate_with_marker(text: &str, cap: usize, marker: &str) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + marker.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(marker);
            out
        }
        None => text.to_string(),
    }
}

/// `true` if `text` exceeds `cap` characters.
pub fn exceeds(text: &str, cap: usize) -> bool {
    text.chars().nth(cap).is_some()
}
