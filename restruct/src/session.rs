//! Session facade: owns the document store, undo history, operator log,
//! and the pending split review.
//!
//! Every mutating operation follows the same discipline: compute the full
//! result first, then snapshot the current store, then swap the result in.
//! A failed transform therefore leaves both the store and the history
//! untouched.

use anyhow::anyhow;
use regex::Regex;
use thiserror::Error;

use crate::document::{self, Document, DocumentStore, ExportEntry};
use crate::dom::DomError;
use crate::enhance::{self, TitleEnhancer};
use crate::history::HistoryStack;
use crate::oplog::{LogLevel, OperatorLog};
use crate::scanner::HeadingLevel;
use crate::transforms::merge::{self, MergeOptions, MergeOutcome};
use crate::transforms::normalize::{self, HierarchySkip, NormalizeOutcome};
use crate::transforms::replace::{self, GlobalReplaceOutcome, HeadingReplaceOutcome};
use crate::transforms::split::{self, SplitCandidate, SplitOptions, SplitOutcome};

/// Errors surfaced by the transforming session operations
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("markup error: {0}")]
    Dom(#[from] DomError),
}

/// The per-candidate flags an operator can toggle in bulk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateFlag {
    Split,
    AddAuthor,
    AddBook,
}

/// A pending split scan awaiting operator curation
#[derive(Debug, Clone)]
pub struct SplitReview {
    pub options: SplitOptions,
    pub candidates: Vec<SplitCandidate>,
}

impl SplitReview {
    /// Set one flag on every candidate at once
    pub fn bulk_set(&mut self, flag: CandidateFlag, value: bool) {
        for candidate in &mut self.candidates {
            match flag {
                CandidateFlag::Split => candidate.should_split = value,
                CandidateFlag::AddAuthor => candidate.add_author = value,
                CandidateFlag::AddBook => candidate.add_book = value,
            }
        }
    }
}

/// One operator session over a batch of documents
#[derive(Debug, Default)]
pub struct Session {
    store: DocumentStore,
    history: HistoryStack,
    log: OperatorLog,
    review: Option<SplitReview>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The documents currently loaded, in canonical order
    pub fn store(&self) -> &[Document] {
        &self.store
    }

    pub fn log(&self) -> &OperatorLog {
        &self.log
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append freshly loaded documents to the store
    pub fn ingest(&mut self, docs: Vec<Document>) {
        if docs.is_empty() {
            self.log.record(LogLevel::Info, "no documents to load");
            return;
        }
        self.history.push(&self.store);
        let names = docs
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!("Loaded {} document(s): {}", docs.len(), names);
        self.store.extend(docs);
        self.log.record(LogLevel::Success, message);
    }

    /// Drop every loaded document
    pub fn clear(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.history.push(&self.store);
        self.store.clear();
        self.review = None;
        self.log.record(LogLevel::Info, "Cleared all documents");
    }

    /// Restore the most recent snapshot; false when the history is empty
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.store = snapshot;
                self.log
                    .record(LogLevel::Success, "Undo: restored previous state");
                true
            }
            None => {
                self.log.record(LogLevel::Info, "Nothing to undo");
                false
            }
        }
    }

    /// Rename one document; false when the index is out of range
    pub fn rename_document(&mut self, index: usize, name: &str) -> bool {
        if index >= self.store.len() {
            self.log
                .record(LogLevel::Error, format!("No document at index {}", index));
            return false;
        }
        self.history.push(&self.store);
        self.store[index].name = name.to_string();
        self.log
            .record(LogLevel::Success, format!("Renamed document to \"{}\"", name));
        true
    }

    /// Replace one document's body; false when the index is out of range
    pub fn edit_body(&mut self, index: usize, body: &str) -> bool {
        if index >= self.store.len() {
            self.log
                .record(LogLevel::Error, format!("No document at index {}", index));
            return false;
        }
        self.history.push(&self.store);
        self.store[index].body = body.to_string();
        self.log.record(
            LogLevel::Success,
            format!("Edited content of \"{}\"", self.store[index].name),
        );
        true
    }

    /// Fold source-heading text into subsequent target headings
    pub fn merge(&mut self, opts: &MergeOptions) -> Result<MergeOutcome, TransformError> {
        let (result, outcome) = merge::apply(&self.store, opts)?;
        self.history.push(&self.store);
        self.store = result;
        self.log.record(
            LogLevel::Success,
            format!(
                "Merged {} {} heading(s) into {}",
                outcome.merged,
                opts.source,
                opts.target
            ),
        );
        Ok(outcome)
    }

    /// Replace a literal string everywhere in leaf-element text
    pub fn replace_text(
        &mut self,
        find: &str,
        replacement: &str,
    ) -> Result<GlobalReplaceOutcome, TransformError> {
        if find.is_empty() {
            self.log
                .record(LogLevel::Info, "Replace skipped: empty search text");
            return Ok(GlobalReplaceOutcome::default());
        }
        let (result, outcome) = replace::global(&self.store, find, replacement)?;
        self.history.push(&self.store);
        self.store = result;
        self.log.record(
            LogLevel::Success,
            format!(
                "Replaced {} occurrence(s) in {} document(s)",
                outcome.replacements, outcome.files_affected
            ),
        );
        Ok(outcome)
    }

    /// Replace an authored regular expression inside headings
    pub fn replace_headings(
        &mut self,
        scope: Option<HeadingLevel>,
        find: &str,
        replacement: &str,
    ) -> Result<HeadingReplaceOutcome, TransformError> {
        if find.is_empty() {
            self.log
                .record(LogLevel::Info, "Heading replace skipped: empty pattern");
            return Ok(HeadingReplaceOutcome::default());
        }
        let pattern = Regex::new(find)?;
        let (result, outcome) = replace::headings(&self.store, scope, &pattern, replacement)?;
        self.history.push(&self.store);
        self.store = result;
        self.log.record(
            LogLevel::Success,
            format!("Updated {} heading(s)", outcome.headings_updated),
        );
        Ok(outcome)
    }

    /// Renumber heading levels into a dense hierarchy
    pub fn normalize(&mut self, skip: &HierarchySkip) -> Result<NormalizeOutcome, TransformError> {
        let (result, outcome) = normalize::apply(&self.store, skip)?;
        self.history.push(&self.store);
        self.store = result;
        let skipped = skip.skipped_levels();
        let message = if skipped.is_empty() {
            format!("Normalized hierarchy in {} document(s)", outcome.files_normalized)
        } else {
            format!(
                "Normalized hierarchy in {} document(s), keeping {}",
                outcome.files_normalized,
                skipped
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };
        self.log.record(LogLevel::Success, message);
        Ok(outcome)
    }

    /// Scan for split candidates and open a review; returns the count
    pub fn scan_split(&mut self, options: SplitOptions) -> usize {
        if self.store.is_empty() {
            self.log
                .record(LogLevel::Error, "No documents loaded to scan");
            return 0;
        }
        let candidates = split::scan(&self.store, &options);
        let found = candidates.len();
        self.log.record(
            LogLevel::Info,
            format!("Scan found {} split candidate(s)", found),
        );
        self.review = Some(SplitReview {
            options,
            candidates,
        });
        found
    }

    pub fn review(&self) -> Option<&SplitReview> {
        self.review.as_ref()
    }

    pub fn review_mut(&mut self) -> Option<&mut SplitReview> {
        self.review.as_mut()
    }

    /// Discard the pending review without touching the store
    pub fn cancel_split(&mut self) {
        if self.review.take().is_some() {
            self.log.record(LogLevel::Info, "Split cancelled");
        }
    }

    /// Apply the pending review; `None` when no review is open
    pub fn commit_split(&mut self) -> Option<SplitOutcome> {
        match self.review.take() {
            Some(review) => Some(self.commit_split_with(&review.options, &review.candidates)),
            None => {
                self.log
                    .record(LogLevel::Error, "No pending split review to commit");
                None
            }
        }
    }

    /// Apply a split with an externally curated candidate list
    pub fn commit_split_with(
        &mut self,
        options: &SplitOptions,
        candidates: &[SplitCandidate],
    ) -> SplitOutcome {
        let (result, outcome) = split::commit(&self.store, options, candidates);
        self.history.push(&self.store);
        self.store = result;
        self.review = None;
        self.log.record(
            LogLevel::Success,
            format!(
                "Split {} source(s) into {} document(s)",
                outcome.sources_affected, outcome.documents
            ),
        );
        outcome
    }

    /// Send one document's excerpt to an enhancer and adopt the rewrite
    pub fn enhance_document(
        &mut self,
        index: usize,
        enhancer: &dyn TitleEnhancer,
    ) -> anyhow::Result<()> {
        let Some(doc) = self.store.get(index) else {
            self.log
                .record(LogLevel::Error, format!("No document at index {}", index));
            return Err(anyhow!("no document at index {}", index));
        };
        let name = doc.name.clone();
        match enhancer.enhance_titles(enhance::excerpt(&doc.body)) {
            Ok(updated) => {
                self.history.push(&self.store);
                self.store[index].body = updated;
                self.log.record(
                    LogLevel::Success,
                    format!("Enhanced titles in \"{}\"", name),
                );
                Ok(())
            }
            Err(err) => {
                self.log.record(
                    LogLevel::Error,
                    format!("Title enhancement failed for \"{}\": {}", name, err),
                );
                Err(err)
            }
        }
    }

    /// The export listing for the current store
    pub fn export_entries(&self) -> Vec<ExportEntry> {
        document::export_entries(&self.store)
    }
}
