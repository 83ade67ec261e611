//! Merge engine: fold source-heading text into subsequent target headings

use markup5ever_rcdom::Handle;
use std::rc::Rc;

use crate::document::Document;
use crate::dom::{self, DomError};
use crate::scanner::{self, HeadingLevel};

/// Configuration for a heading merge
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Headings of this level are absorbed and removed
    pub source: HeadingLevel,
    /// Headings of this level receive the pending source text
    pub target: HeadingLevel,
    /// Comma-separated phrases; matching targets are skipped
    pub exclude: String,
}

/// Summary of a merge run
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOutcome {
    /// Number of target headings that received source text
    pub merged: usize,
}

/// Apply the merge to every document.
///
/// A source heading's trimmed text becomes the pending source text and the
/// element is marked for deletion. Every later target heading that does not
/// match the exclusion list gets the pending text plus one space prepended.
/// The pending text is deliberately not cleared after a merge; it keeps
/// feeding targets until the next source heading replaces it.
pub fn apply(
    docs: &[Document],
    opts: &MergeOptions,
) -> Result<(Vec<Document>, MergeOutcome), DomError> {
    let mut merged = 0;
    let mut out = Vec::with_capacity(docs.len());

    for doc in docs {
        let body = dom::parse_body(&doc.body);
        let elements = dom::elements_in_order(&body);

        let mut pending = String::new();
        let mut doomed: Vec<Handle> = Vec::new();

        for el in &elements {
            let Some(name) = dom::element_name(el) else {
                continue;
            };
            if name == opts.source.tag() {
                pending = dom::text_content(el).trim().to_string();
                doomed.push(el.clone());
            } else if name == opts.target.tag()
                && !pending.is_empty()
                && !scanner::is_excluded(&dom::text_content(el), &opts.exclude)
            {
                dom::prepend_child(el, dom::create_text(&format!("{} ", pending)));
                merged += 1;
            }
        }

        prune(&body, &doomed);

        out.push(Document {
            name: doc.name.clone(),
            body: dom::inner_markup(&body)?,
            original_name: doc.original_name.clone(),
        });
    }

    Ok((out, MergeOutcome { merged }))
}

/// Remove the marked source headings, plus a whitespace-only text node
/// immediately following each one
fn prune(node: &Handle, doomed: &[Handle]) {
    let children = node.children.borrow().clone();
    let mut kept = Vec::with_capacity(children.len());
    let mut drop_blank_follower = false;

    for child in children {
        if doomed.iter().any(|d| Rc::ptr_eq(d, &child)) {
            drop_blank_follower = true;
            continue;
        }
        if drop_blank_follower {
            drop_blank_follower = false;
            if dom::is_blank_text(&child) {
                continue;
            }
        }
        prune(&child, doomed);
        kept.push(child);
    }

    *node.children.borrow_mut() = kept;
}
