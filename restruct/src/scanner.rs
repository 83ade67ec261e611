//! Read-only structural traversal: headings, leaf elements, exclusion
//! predicates, and literal pattern matching with display context

use clap::ValueEnum;
use markup5ever_rcdom::Handle;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dom;

/// Number of characters of context shown on each side of a pattern match
const CONTEXT_WINDOW: usize = 20;

/// A heading level tag, h1 (most significant) through h6
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// All levels in ascending order
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Tag name, e.g. `"h2"`
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }

    /// Numeric level, 1..=6
    pub fn level(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }

    /// Parse a tag name like `"h3"` (case-insensitive)
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.tag().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Heading elements of a body in document order.
///
/// `level = None` enumerates all of h1-h6; otherwise only the given tag.
pub fn headings(body: &Handle, level: Option<HeadingLevel>) -> Vec<Handle> {
    dom::elements_in_order(body)
        .into_iter()
        .filter(|el| match dom::element_name(el).and_then(|n| HeadingLevel::from_tag(&n)) {
            Some(found) => level.is_none() || level == Some(found),
            None => false,
        })
        .collect()
}

/// Leaf elements of a body: no child elements, non-blank text content
pub fn leaf_elements(body: &Handle) -> Vec<Handle> {
    dom::elements_in_order(body)
        .into_iter()
        .filter(|el| dom::is_leaf_element(el) && !dom::text_content(el).trim().is_empty())
        .collect()
}

/// Exclusion predicate: true when any comma-separated phrase of
/// `exclusions` is a case-insensitive substring of `text`
pub fn is_excluded(text: &str, exclusions: &str) -> bool {
    if exclusions.trim().is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    exclusions
        .split(',')
        .map(|phrase| phrase.trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .any(|phrase| haystack.contains(&phrase))
}

/// One non-overlapping match of a literal pattern in a raw document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Byte offset of the match start in the body
    pub start: usize,
    /// Byte offset of the match end in the body
    pub end: usize,
    /// Trimmed context window around the match start, for operator display
    pub context: String,
}

/// All non-overlapping occurrences of a literal string in `text`.
///
/// The literal is escaped for use as a regular expression, so every
/// character matches itself. An empty literal yields no matches.
pub fn pattern_matches(text: &str, literal: &str) -> Vec<PatternMatch> {
    if literal.is_empty() {
        return Vec::new();
    }
    let Ok(pattern) = Regex::new(&regex::escape(literal)) else {
        return Vec::new();
    };

    pattern
        .find_iter(text)
        .map(|m| {
            let from = floor_char_boundary(text, m.start().saturating_sub(CONTEXT_WINDOW));
            let to = floor_char_boundary(text, (m.start() + CONTEXT_WINDOW).min(text.len()));
            PatternMatch {
                start: m.start(),
                end: m.end(),
                context: text[from..to].trim().to_string(),
            }
        })
        .collect()
}

/// Largest char boundary not exceeding `index`
pub(crate) fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
