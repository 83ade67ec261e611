//! Boundary for external title enhancement.
//!
//! The engine never talks to a model service itself; callers provide an
//! implementation of [`TitleEnhancer`] and the session feeds it a bounded
//! excerpt of the document under enhancement.

/// Maximum number of characters of a document body sent to an enhancer
pub const EXCERPT_CHARS: usize = 5000;

/// An external service that rewrites a document's headings.
///
/// Receives an excerpt of the current body and returns the full replacement
/// body. Failures are reported to the operator log and leave the document
/// unchanged.
pub trait TitleEnhancer {
    fn enhance_titles(&self, excerpt: &str) -> anyhow::Result<String>;
}

/// The leading excerpt of a body, capped at [`EXCERPT_CHARS`] characters
pub fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
