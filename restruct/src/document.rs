//! Document model for the in-memory batch of marked-up text documents

use std::fmt;

/// Characters that may not appear in an export filename stem
const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum length of an export filename stem
const MAX_NAME_LEN: usize = 80;

/// A single document in the batch: an export name plus a marked-up body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Export filename stem (sanitized before any export)
    pub name: String,
    /// Marked-up text content (HTML-like, h1-h6 headings and inline markup)
    pub body: String,
    /// Original filename at ingestion time, if the document was loaded from disk
    pub original_name: Option<String>,
}

impl Document {
    /// Create a document with no ingestion provenance
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            original_name: None,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} chars)", self.name, self.body.len())
    }
}

/// The ordered collection of documents currently loaded.
///
/// Insertion order is the canonical document order. Identity is positional;
/// transforms rebuild the store as a new ordered sequence.
pub type DocumentStore = Vec<Document>;

/// One entry of an export listing: final filename plus content
#[derive(Debug, Clone)]
pub struct ExportEntry {
    /// Final filename including the `.txt` extension
    pub filename: String,
    /// Document body
    pub content: String,
}

/// Sanitize a proposed document name into a valid export filename stem.
///
/// Strips the characters `\/:*?"<>|`, truncates to 80 characters, and falls
/// back to `file_<index>` when nothing remains.
pub fn sanitize_name(proposed: &str, index: usize) -> String {
    let cleaned: String = proposed
        .chars()
        .filter(|c| !FORBIDDEN_NAME_CHARS.contains(c))
        .take(MAX_NAME_LEN)
        .collect();

    if cleaned.is_empty() {
        format!("file_{}", index)
    } else {
        cleaned
    }
}

/// Build the export listing for the current store: `<name>.txt` per document
pub fn export_entries(store: &[Document]) -> Vec<ExportEntry> {
    store
        .iter()
        .enumerate()
        .map(|(i, doc)| ExportEntry {
            filename: format!("{}.txt", sanitize_name(&doc.name, i)),
            content: doc.body.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_forbidden_characters() {
        assert_eq!(sanitize_name("con:tent/\"bad\"", 0), "contentbad");
        assert_eq!(sanitize_name("a\\b/c:d*e?f\"g<h>i|j", 0), "abcdefghij");
    }

    #[test]
    fn test_sanitize_truncates_to_eighty() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_name(&long, 0).len(), 80);
    }

    #[test]
    fn test_sanitize_falls_back_when_empty() {
        assert_eq!(sanitize_name("", 3), "file_3");
        assert_eq!(sanitize_name("\\/:*?\"<>|", 7), "file_7");
    }

    #[test]
    fn test_export_entries_keep_order_and_extension() {
        let store = vec![
            Document::new("alpha", "<p>a</p>"),
            Document::new("be:ta", "<p>b</p>"),
        ];
        let entries = export_entries(&store);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "alpha.txt");
        assert_eq!(entries[1].filename, "beta.txt");
        assert_eq!(entries[1].content, "<p>b</p>");
    }
}
