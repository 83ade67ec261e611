//! Hierarchy normalizer: renumber heading levels into a dense sequence

use itertools::Itertools;
use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::document::Document;
use crate::dom::{self, DomError};
use crate::scanner::{self, HeadingLevel};

/// Heading levels excluded from renumbering (h4-h6 are always eligible)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchySkip {
    pub h1: bool,
    pub h2: bool,
    pub h3: bool,
}

impl HierarchySkip {
    /// True when the level must be left untouched
    pub fn skips(&self, level: HeadingLevel) -> bool {
        match level {
            HeadingLevel::H1 => self.h1,
            HeadingLevel::H2 => self.h2,
            HeadingLevel::H3 => self.h3,
            _ => false,
        }
    }

    /// The skipped levels, for log output
    pub fn skipped_levels(&self) -> Vec<HeadingLevel> {
        HeadingLevel::ALL
            .into_iter()
            .filter(|level| self.skips(*level))
            .collect()
    }
}

/// Summary of a normalization run
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOutcome {
    /// Documents in which at least one heading changed level
    pub files_normalized: usize,
}

/// Renumber each document's heading levels into a dense 1-based hierarchy.
///
/// Per document: the distinct non-skipped levels actually present are
/// sorted ascending and mapped to h1, h2, ... in order; every heading whose
/// mapped tag differs is replaced by a new element of the mapped tag with
/// its inner content preserved. Re-running on already-dense output is a
/// no-op.
pub fn apply(
    docs: &[Document],
    skip: &HierarchySkip,
) -> Result<(Vec<Document>, NormalizeOutcome), DomError> {
    let mut outcome = NormalizeOutcome::default();
    let mut out = Vec::with_capacity(docs.len());

    for doc in docs {
        let body = dom::parse_body(&doc.body);

        let present: Vec<HeadingLevel> = scanner::headings(&body, None)
            .iter()
            .filter_map(|el| dom::element_name(el).and_then(|n| HeadingLevel::from_tag(&n)))
            .filter(|level| !skip.skips(*level))
            .unique()
            .sorted()
            .collect();

        let mapping: HashMap<HeadingLevel, HeadingLevel> = present
            .iter()
            .enumerate()
            .map(|(i, level)| (*level, HeadingLevel::ALL[i]))
            .collect();

        let mut changed = false;
        renumber(&body, &mapping, &mut changed);
        if changed {
            outcome.files_normalized += 1;
        }

        out.push(Document {
            name: doc.name.clone(),
            body: dom::inner_markup(&body)?,
            original_name: doc.original_name.clone(),
        });
    }

    Ok((out, outcome))
}

/// Replace mapped heading elements in place, preserving their children
fn renumber(node: &Handle, mapping: &HashMap<HeadingLevel, HeadingLevel>, changed: &mut bool) {
    let children = node.children.borrow().clone();
    let mut rewritten = Vec::with_capacity(children.len());

    for child in children {
        let mapped = dom::element_name(&child)
            .and_then(|n| HeadingLevel::from_tag(&n))
            .and_then(|level| mapping.get(&level).copied().map(|to| (level, to)))
            .filter(|(from, to)| from != to);

        let child = match mapped {
            Some((_, to)) => {
                let replacement = dom::create_element(to.tag());
                // Move the children: the replaced element drops once the
                // tree is reassigned and its teardown would strip any
                // subtree it still holds
                *replacement.children.borrow_mut() =
                    std::mem::take(&mut *child.children.borrow_mut());
                *changed = true;
                replacement
            }
            None => child,
        };

        renumber(&child, mapping, changed);
        rewritten.push(child);
    }

    *node.children.borrow_mut() = rewritten;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_one(body: &str, skip: HierarchySkip) -> (String, usize) {
        let docs = vec![Document::new("doc", body)];
        let (out, outcome) = apply(&docs, &skip).unwrap();
        (out[0].body.clone(), outcome.files_normalized)
    }

    #[test]
    fn test_dense_order_preserving_mapping() {
        let (body, normalized) = normalize_one(
            "<h2>a</h2><h4>b</h4><h5>c</h5><h4>d</h4>",
            HierarchySkip::default(),
        );
        assert_eq!(body, "<h1>a</h1><h2>b</h2><h3>c</h3><h2>d</h2>");
        assert_eq!(normalized, 1);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let (first, _) = normalize_one("<h2>a</h2><h4>b</h4><h5>c</h5>", HierarchySkip::default());
        let (second, normalized) = normalize_one(&first, HierarchySkip::default());
        assert_eq!(second, first);
        assert_eq!(normalized, 0);
    }

    #[test]
    fn test_skipped_levels_are_untouched_and_unmapped() {
        let skip = HierarchySkip {
            h1: true,
            ..Default::default()
        };
        let (body, _) = normalize_one("<h1>keep</h1><h3>move</h3><h4>move</h4>", skip);
        assert_eq!(body, "<h1>keep</h1><h1>move</h1><h2>move</h2>");
    }

    #[test]
    fn test_inner_markup_preserved_exactly() {
        let (body, _) = normalize_one("<h3>one <em>two</em></h3>", HierarchySkip::default());
        assert_eq!(body, "<h1>one <em>two</em></h1>");
    }

    #[test]
    fn test_already_dense_hierarchy_unchanged() {
        let original = "<h1>a</h1><h2>b</h2>";
        let (body, normalized) = normalize_one(original, HierarchySkip::default());
        assert_eq!(body, original);
        assert_eq!(normalized, 0);
    }
}
