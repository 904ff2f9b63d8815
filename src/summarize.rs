//! Short textual digests of uploaded files.
//!
//! Counts are pattern-based approximations, not parse results. Nothing here
//! can fail: malformed JSON in a config file falls back to a line count.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::classify::{classify, Category};

static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s+\w+|def\s+\w+|func\s+\w+|class\s+\w+").expect("valid regex")
});

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"import\s+|from\s+.*import|#include|using\s+").expect("valid regex")
});

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s+").expect("valid regex"));

/// Maximum number of top-level keys listed for a JSON config file.
const MAX_LISTED_KEYS: usize = 10;

/// Summarize `content` using the strategy picked by [`classify`].
///
/// `size` is the original byte size and only appears in the generic summary.
pub fn summarize(content: &str, filename: &str, language: &str, size: u64) -> String {
    match classify(filename).category() {
        Category::Code => summarize_code(content, filename, language),
        Category::Config => summarize_config(content, filename),
        Category::Documentation => summarize_documentation(content, filename),
        Category::Generic => format!("File: {} ({} bytes)", filename, size),
    }
}

pub fn summarize_code(content: &str, filename: &str, language: &str) -> String {
    format!(
        "Code file: {} ({})\nLines of code: {}\nFunctions/Classes: {}\nImports: {}",
        filename,
        language,
        line_count(content),
        DECLARATION_RE.find_iter(content).count(),
        IMPORT_RE.find_iter(content).count(),
    )
}

pub fn summarize_config(content: &str, filename: &str) -> String {
    if filename.ends_with(".json") {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
            let keys: Vec<&str> = map.keys().take(MAX_LISTED_KEYS).map(String::as_str).collect();
            return format!(
                "Configuration file: {}\nKey sections: {}\nTotal keys: {}",
                filename,
                keys.join(", "),
                map.len()
            );
        }
    }

    format!(
        "Configuration file: {}\nLines: {}",
        filename,
        line_count(content)
    )
}

pub fn summarize_documentation(content: &str, filename: &str) -> String {
    format!(
        "Documentation file: {}\nLines: {}\nHeadings: {}\nWord count: ~{}",
        filename,
        line_count(content),
        HEADING_RE.find_iter(content).count(),
        content.split_whitespace().count(),
    )
}

/// Newline-delimited segments; empty text is one line.
pub fn line_count(content: &str) -> usize {
    content.split('\n').count()
}
