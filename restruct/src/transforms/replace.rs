//! Replace engines: global leaf-text replace and heading-scoped replace
//!
//! The two engines deliberately differ in how they treat the find string:
//! the global engine escapes it so every character matches literally, while
//! the heading-scoped engine passes it through as an authored regular
//! expression. The replacement string is never escaped, so it may introduce
//! new markup.

use regex::{NoExpand, Regex};

use crate::document::Document;
use crate::dom::{self, DomError};
use crate::scanner::{self, HeadingLevel};

/// Summary of a global replace run
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalReplaceOutcome {
    /// Total replacement occurrences across all documents
    pub replacements: usize,
    /// Number of documents that received at least one replacement
    pub files_affected: usize,
}

/// Summary of a heading-scoped replace run
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingReplaceOutcome {
    /// Number of headings whose inner markup changed
    pub headings_updated: usize,
}

/// Replace every literal occurrence of `find` inside leaf elements.
///
/// Only childless elements with non-blank text are touched, so text inside
/// element attributes is never rewritten. An empty find string is a no-op.
pub fn global(
    docs: &[Document],
    find: &str,
    replacement: &str,
) -> Result<(Vec<Document>, GlobalReplaceOutcome), DomError> {
    let mut outcome = GlobalReplaceOutcome::default();
    if find.is_empty() {
        return Ok((docs.to_vec(), outcome));
    }
    let Ok(pattern) = Regex::new(&regex::escape(find)) else {
        return Ok((docs.to_vec(), outcome));
    };

    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let body = dom::parse_body(&doc.body);
        let mut changed = false;

        for leaf in scanner::leaf_elements(&body) {
            let inner = dom::inner_markup(&leaf)?;
            let count = pattern.find_iter(&inner).count();
            if count > 0 {
                outcome.replacements += count;
                let updated = pattern.replace_all(&inner, NoExpand(replacement));
                dom::set_inner_markup(&leaf, &updated);
                changed = true;
            }
        }
        if changed {
            outcome.files_affected += 1;
        }

        out.push(Document {
            name: doc.name.clone(),
            body: dom::inner_markup(&body)?,
            original_name: doc.original_name.clone(),
        });
    }

    Ok((out, outcome))
}

/// Replace matches of an authored regular expression inside headings.
///
/// `scope` limits the walk to one heading level; `None` covers h1-h6.
/// Capture-group references in the replacement are expanded.
pub fn headings(
    docs: &[Document],
    scope: Option<HeadingLevel>,
    pattern: &Regex,
    replacement: &str,
) -> Result<(Vec<Document>, HeadingReplaceOutcome), DomError> {
    let mut outcome = HeadingReplaceOutcome::default();
    let mut out = Vec::with_capacity(docs.len());

    for doc in docs {
        let body = dom::parse_body(&doc.body);

        for heading in scanner::headings(&body, scope) {
            let inner = dom::inner_markup(&heading)?;
            if pattern.is_match(&inner) {
                let updated = pattern.replace_all(&inner, replacement);
                dom::set_inner_markup(&heading, &updated);
                outcome.headings_updated += 1;
            }
        }

        out.push(Document {
            name: doc.name.clone(),
            body: dom::inner_markup(&body)?,
            original_name: doc.original_name.clone(),
        });
    }

    Ok((out, outcome))
}
