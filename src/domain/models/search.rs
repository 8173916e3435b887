//! Web search hits and their flattened text form.

use serde::{Deserialize, Serialize};

/// Width of the rule separating search hits.
const SEPARATOR_WIDTH: usize = 80;

/// One web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Flatten hits into the text block handed back to the model as tool output.
///
/// Snippets are cut to `max_snippet_chars` characters.
pub fn format_hits(hits: &[SearchHit], max_snippet_chars: usize) -> String {
    let rule = "-".repeat(SEPARATOR_WIDTH);
    let mut lines = Vec::with_capacity(hits.len() * 4);
    for hit in hits {
        lines.push(format!("Title: {}", hit.title));
        lines.push(format!("URL: {}", hit.url));
        let snippet: String = hit.snippet.chars().take(max_snippet_chars).collect();
        lines.push(format!("Snippet: {snippet}"));
        lines.push(rule.clone());
    }
    lines.join("\n")
}
