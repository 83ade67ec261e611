//! Split engine: two-phase partitioning of documents at curated boundaries
//!
//! A scan produces a candidate list for operator review; a commit partitions
//! every source document at the approved candidates and replaces the store
//! with the emitted fragments. Candidates are carried by value between the
//! phases and are never re-derived from the documents at commit time.

use clap::ValueEnum;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::document::{sanitize_name, Document};
use crate::dom;
use crate::scanner::{self, HeadingLevel};

/// How split boundaries are detected during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Every heading of the configured tag
    #[default]
    Tag,
    /// Headings of the configured tag whose text contains the pattern
    HeaderText,
    /// Every occurrence of a literal text pattern in the raw body
    TextPattern,
}

/// Operator configuration for one splitting session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    pub method: SplitMethod,
    /// Heading tag for the heading-based methods
    pub tag: HeadingLevel,
    /// Heading substring (`header_text`) or literal text (`text_pattern`)
    pub pattern: String,
    /// Author name injected as a paragraph below each split heading
    pub author: String,
    /// Collection name prefixed to fragment titles
    pub book: String,
    /// Comma-separated phrases; matching headings are not offered as candidates
    pub exclude: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            method: SplitMethod::Tag,
            tag: HeadingLevel::H2,
            pattern: String::new(),
            author: String::new(),
            book: String::new(),
            exclude: String::new(),
        }
    }
}

/// A provisional split point, pending operator approval.
///
/// Valid for one scan generation; a re-scan replaces the whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCandidate {
    /// Index of the source document in the store at scan time
    pub doc_index: usize,
    /// Position within that document's scan sequence
    pub ordinal: usize,
    /// Heading text, or a context window for pattern matches
    pub original_text: String,
    pub should_split: bool,
    pub add_author: bool,
    pub add_book: bool,
    /// Byte offset of the match start (pattern mode only)
    pub match_start: Option<usize>,
    /// Byte offset of the match end (pattern mode only)
    pub match_end: Option<usize>,
}

impl SplitCandidate {
    /// Identifier unique within one scan generation
    pub fn id(&self) -> String {
        format!("{}-{}", self.doc_index, self.ordinal)
    }
}

/// Summary of a split commit
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitOutcome {
    /// Size of the rebuilt store
    pub documents: usize,
    /// Source documents that were actually partitioned
    pub sources_affected: usize,
}

/// Scan the store for split candidates according to the configured method.
///
/// Candidates default to approved; the author/book flags default to whether
/// the corresponding name is configured. An empty pattern in `text_pattern`
/// mode yields no candidates.
pub fn scan(docs: &[Document], opts: &SplitOptions) -> Vec<SplitCandidate> {
    let mut candidates = Vec::new();

    match opts.method {
        SplitMethod::Tag | SplitMethod::HeaderText => {
            for (doc_index, doc) in docs.iter().enumerate() {
                let body = dom::parse_body(&doc.body);
                for (ordinal, heading) in scanner::headings(&body, Some(opts.tag)).iter().enumerate()
                {
                    let text = dom::text_content(heading).trim().to_string();
                    let passes_exclude = !scanner::is_excluded(&text, &opts.exclude);
                    let matches_pattern = match opts.method {
                        SplitMethod::HeaderText => text.contains(&opts.pattern),
                        _ => true,
                    };
                    if passes_exclude && matches_pattern {
                        candidates.push(SplitCandidate {
                            doc_index,
                            ordinal,
                            original_text: text,
                            should_split: true,
                            add_author: !opts.author.is_empty(),
                            add_book: !opts.book.is_empty(),
                            match_start: None,
                            match_end: None,
                        });
                    }
                }
            }
        }
        SplitMethod::TextPattern => {
            for (doc_index, doc) in docs.iter().enumerate() {
                for (ordinal, found) in scanner::pattern_matches(&doc.body, &opts.pattern)
                    .into_iter()
                    .enumerate()
                {
                    let label = if found.context.is_empty() {
                        format!("occurrence {}", ordinal + 1)
                    } else {
                        found.context
                    };
                    candidates.push(SplitCandidate {
                        doc_index,
                        ordinal,
                        original_text: label,
                        should_split: true,
                        add_author: !opts.author.is_empty(),
                        add_book: !opts.book.is_empty(),
                        match_start: Some(found.start),
                        match_end: Some(found.end),
                    });
                }
            }
        }
    }

    candidates
}

/// Partition every source document at its approved candidates and return
/// the rebuilt store.
pub fn commit(
    docs: &[Document],
    opts: &SplitOptions,
    candidates: &[SplitCandidate],
) -> (Vec<Document>, SplitOutcome) {
    let (new_docs, sources_affected) = match opts.method {
        SplitMethod::Tag | SplitMethod::HeaderText => commit_headings(docs, opts, candidates),
        SplitMethod::TextPattern => commit_pattern(docs, candidates),
    };
    let outcome = SplitOutcome {
        documents: new_docs.len(),
        sources_affected,
    };
    (new_docs, outcome)
}

fn commit_headings(
    docs: &[Document],
    opts: &SplitOptions,
    candidates: &[SplitCandidate],
) -> (Vec<Document>, usize) {
    let tag = opts.tag.tag();
    let Ok(boundary) = RegexBuilder::new(&format!("<{0}[^>]*>.*?</{0}>", tag))
        .case_insensitive(true)
        .build()
    else {
        return (docs.to_vec(), 0);
    };
    let Ok(strip_tags) = Regex::new("<[^>]*>") else {
        return (docs.to_vec(), 0);
    };
    let Ok(open_tag) = Regex::new("(?i)<h[1-6][^>]*>") else {
        return (docs.to_vec(), 0);
    };

    let mut new_docs = Vec::new();
    let mut sources_affected = 0;

    for (doc_index, doc) in docs.iter().enumerate() {
        let mut current_content = String::new();
        let mut current_title = doc.name.clone();
        let mut fragment_index = 0usize;
        let mut fragments_for_doc = 0usize;

        let mut last = 0;
        let mut pieces: Vec<(bool, &str)> = Vec::new();
        for found in boundary.find_iter(&doc.body) {
            pieces.push((false, &doc.body[last..found.start()]));
            pieces.push((true, found.as_str()));
            last = found.end();
        }
        pieces.push((false, &doc.body[last..]));

        for (is_heading, piece) in pieces {
            if !is_heading {
                current_content.push_str(piece);
                continue;
            }

            let text = strip_tags.replace_all(piece, "").trim().to_string();
            let candidate = candidates
                .iter()
                .find(|c| c.doc_index == doc_index && c.original_text == text);

            match candidate {
                Some(c) if c.should_split => {
                    if !current_content.trim().is_empty() {
                        new_docs.push(Document::new(
                            sanitize_name(&current_title, fragment_index),
                            current_content.trim(),
                        ));
                        fragments_for_doc += 1;
                    }
                    let base = if text.is_empty() { doc.name.clone() } else { text.clone() };
                    let prefix = if c.add_book {
                        format!("{} ", opts.book)
                    } else {
                        String::new()
                    };
                    current_title = format!("{}{}", prefix, base);
                    let open = open_tag
                        .find(piece)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_else(|| format!("<{}>", tag));
                    current_content = format!("{}{}{}</{}>", open, prefix, text, tag);
                    if c.add_author {
                        current_content.push_str(&format!("\n<p>{}</p>", opts.author));
                    }
                    fragment_index += 1;
                }
                // Unapproved or unknown headings fold into the current fragment
                _ => current_content.push_str(piece),
            }
        }

        if !current_content.trim().is_empty() {
            new_docs.push(Document::new(
                sanitize_name(&current_title, fragment_index),
                current_content.trim(),
            ));
            fragments_for_doc += 1;
        }
        if fragments_for_doc > 1 {
            sources_affected += 1;
        }
    }

    (new_docs, sources_affected)
}

fn commit_pattern(docs: &[Document], candidates: &[SplitCandidate]) -> (Vec<Document>, usize) {
    let mut new_docs = Vec::new();
    let mut sources_affected = 0;

    for (doc_index, doc) in docs.iter().enumerate() {
        let mut approved: Vec<&SplitCandidate> = candidates
            .iter()
            .filter(|c| c.doc_index == doc_index && c.should_split)
            .collect();
        if approved.is_empty() {
            new_docs.push(doc.clone());
            continue;
        }

        sources_affected += 1;
        approved.sort_by_key(|c| c.match_start.unwrap_or(0));

        let mut last_pos = 0;
        for (idx, candidate) in approved.iter().enumerate() {
            let cut = scanner::floor_char_boundary(
                &doc.body,
                candidate.match_start.unwrap_or(0).min(doc.body.len()),
            )
            .max(last_pos);
            let chunk = &doc.body[last_pos..cut];
            if !chunk.trim().is_empty() || idx > 0 {
                new_docs.push(Document::new(
                    sanitize_name(&format!("{}_{}", doc.name, idx), idx),
                    chunk.trim(),
                ));
            }
            last_pos = cut;
        }

        let trailing = &doc.body[last_pos..];
        if !trailing.trim().is_empty() {
            new_docs.push(Document::new(
                sanitize_name(&format!("{}_last", doc.name), approved.len()),
                trailing.trim(),
            ));
        }
    }

    (new_docs, sources_affected)
}

/// Errors that can occur when loading or saving a review plan
#[derive(Error, Debug)]
pub enum SplitPlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// One candidate row of an operator-editable review plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCandidate {
    /// Candidate id, `<documentIndex>-<ordinal>`
    pub id: String,
    pub text: String,
    pub split: bool,
    pub add_author: bool,
    pub add_book: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_end: Option<usize>,
}

/// The scan result written to disk for operator curation between the scan
/// and commit phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPlan {
    pub options: SplitOptions,
    #[serde(default, rename = "candidate")]
    pub candidates: Vec<PlanCandidate>,
}

impl SplitPlan {
    /// Capture a scan generation as an editable plan
    pub fn new(options: SplitOptions, candidates: &[SplitCandidate]) -> Self {
        let rows = candidates
            .iter()
            .map(|c| PlanCandidate {
                id: c.id(),
                text: c.original_text.clone(),
                split: c.should_split,
                add_author: c.add_author,
                add_book: c.add_book,
                match_start: c.match_start,
                match_end: c.match_end,
            })
            .collect();
        Self {
            options,
            candidates: rows,
        }
    }

    /// Rebuild the candidate list from the plan rows.
    ///
    /// Rows with an unparseable id are dropped with a warning; at commit
    /// time a missing candidate simply stops being a boundary.
    pub fn to_candidates(&self) -> Vec<SplitCandidate> {
        self.candidates
            .iter()
            .filter_map(|row| {
                let Some((doc, ordinal)) = row.id.split_once('-') else {
                    log::warn!("dropping plan candidate with malformed id {:?}", row.id);
                    return None;
                };
                let (Ok(doc_index), Ok(ordinal)) = (doc.parse(), ordinal.parse()) else {
                    log::warn!("dropping plan candidate with malformed id {:?}", row.id);
                    return None;
                };
                Some(SplitCandidate {
                    doc_index,
                    ordinal,
                    original_text: row.text.clone(),
                    should_split: row.split,
                    add_author: row.add_author,
                    add_book: row.add_book,
                    match_start: row.match_start,
                    match_end: row.match_end,
                })
            })
            .collect()
    }

    /// Load a plan from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SplitPlanError> {
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save the plan to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SplitPlanError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_options(tag: HeadingLevel) -> SplitOptions {
        SplitOptions {
            method: SplitMethod::Tag,
            tag,
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_tag_mode_collects_candidates() {
        let docs = vec![
            Document::new("one", "<h2>First</h2><p>a</p><h2>Second</h2>"),
            Document::new("two", "<h2>Third</h2>"),
        ];
        let candidates = scan(&docs, &tag_options(HeadingLevel::H2));
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].id(), "0-0");
        assert_eq!(candidates[1].id(), "0-1");
        assert_eq!(candidates[2].id(), "1-0");
        assert!(candidates.iter().all(|c| c.should_split));
        assert!(candidates.iter().all(|c| !c.add_author && !c.add_book));
    }

    #[test]
    fn test_scan_excluded_heading_keeps_its_ordinal() {
        let docs = vec![Document::new(
            "doc",
            "<h2>Appendix</h2><h2>Chapter One</h2>",
        )];
        let opts = SplitOptions {
            exclude: "appendix".to_string(),
            ..tag_options(HeadingLevel::H2)
        };
        let candidates = scan(&docs, &opts);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].ordinal, 1);
        assert_eq!(candidates[0].original_text, "Chapter One");
    }

    #[test]
    fn test_scan_header_text_requires_substring() {
        let docs = vec![Document::new("doc", "<h2>Chapter One</h2><h2>Notes</h2>")];
        let opts = SplitOptions {
            method: SplitMethod::HeaderText,
            pattern: "Chapter".to_string(),
            ..tag_options(HeadingLevel::H2)
        };
        let candidates = scan(&docs, &opts);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].original_text, "Chapter One");
    }

    #[test]
    fn test_scan_pattern_mode_records_offsets() {
        let docs = vec![Document::new("doc", "aaa CUT bbb CUT ccc")];
        let opts = SplitOptions {
            method: SplitMethod::TextPattern,
            pattern: "CUT".to_string(),
            author: "Author".to_string(),
            ..Default::default()
        };
        let candidates = scan(&docs, &opts);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].match_start, Some(4));
        assert_eq!(candidates[0].match_end, Some(7));
        assert!(candidates.iter().all(|c| c.add_author && !c.add_book));
    }

    #[test]
    fn test_scan_pattern_mode_empty_pattern_yields_nothing() {
        let docs = vec![Document::new("doc", "anything")];
        let opts = SplitOptions {
            method: SplitMethod::TextPattern,
            ..Default::default()
        };
        assert!(scan(&docs, &opts).is_empty());
    }

    #[test]
    fn test_commit_headings_partitions_at_approved_points() {
        let docs = vec![Document::new(
            "doc",
            "intro<h2>A</h2>a-content<h2>B</h2>b-content<h2>C</h2>c-content",
        )];
        let opts = tag_options(HeadingLevel::H2);
        let candidates = scan(&docs, &opts);
        let (out, outcome) = commit(&docs, &opts, &candidates);

        assert_eq!(out.len(), 4);
        assert_eq!(outcome.documents, 4);
        assert_eq!(outcome.sources_affected, 1);
        assert_eq!(out[0].name, "doc");
        assert_eq!(out[0].body, "intro");
        assert_eq!(out[1].name, "A");
        assert_eq!(out[1].body, "<h2>A</h2>a-content");
        assert_eq!(out[3].body, "<h2>C</h2>c-content");

        // Concatenated fragments reconstruct the original content
        let rebuilt: String = out.iter().map(|d| d.body.as_str()).collect();
        assert_eq!(rebuilt, docs[0].body);
    }

    #[test]
    fn test_commit_headings_unapproved_candidate_folds_in() {
        let docs = vec![Document::new(
            "doc",
            "intro<h2>A</h2>a-content<h2>B</h2>b-content<h2>C</h2>c-content",
        )];
        let opts = tag_options(HeadingLevel::H2);
        let mut candidates = scan(&docs, &opts);
        candidates[1].should_split = false;

        let (out, _) = commit(&docs, &opts, &candidates);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].body, "<h2>A</h2>a-content<h2>B</h2>b-content");
    }

    #[test]
    fn test_commit_headings_injects_book_and_author() {
        let docs = vec![Document::new("doc", "<h2>A</h2>content")];
        let opts = SplitOptions {
            author: "The Author".to_string(),
            book: "The Book".to_string(),
            ..tag_options(HeadingLevel::H2)
        };
        let candidates = scan(&docs, &opts);
        let (out, _) = commit(&docs, &opts, &candidates);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "The Book A");
        assert_eq!(out[0].body, "<h2>The Book A</h2>\n<p>The Author</p>content");
    }

    #[test]
    fn test_commit_headings_matches_tag_case_insensitively() {
        let docs = vec![Document::new("doc", "x<H2>A</H2>y")];
        let opts = tag_options(HeadingLevel::H2);
        let candidates = scan(&docs, &opts);
        assert_eq!(candidates.len(), 1);

        let (out, _) = commit(&docs, &opts, &candidates);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].body, "<H2>A</H2>y");
    }

    #[test]
    fn test_commit_headings_no_approved_points_is_single_fragment() {
        let docs = vec![Document::new("doc", "<h3>only</h3>text")];
        let opts = tag_options(HeadingLevel::H2);
        let (out, outcome) = commit(&docs, &opts, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].body, "<h3>only</h3>text");
        assert_eq!(outcome.sources_affected, 0);
    }

    #[test]
    fn test_commit_pattern_slices_between_matches() {
        let docs = vec![Document::new("doc", "aaa CUT bbb CUT ccc")];
        let opts = SplitOptions {
            method: SplitMethod::TextPattern,
            pattern: "CUT".to_string(),
            ..Default::default()
        };
        let candidates = scan(&docs, &opts);
        let (out, outcome) = commit(&docs, &opts, &candidates);

        assert_eq!(out.len(), 3);
        assert_eq!(outcome.sources_affected, 1);
        assert_eq!(out[0].name, "doc_0");
        assert_eq!(out[0].body, "aaa");
        assert_eq!(out[1].body, "CUT bbb");
        assert_eq!(out[2].name, "doc_last");
        assert_eq!(out[2].body, "CUT ccc");
    }

    #[test]
    fn test_commit_pattern_skips_blank_leading_chunk() {
        let docs = vec![Document::new("doc", "CUT body")];
        let opts = SplitOptions {
            method: SplitMethod::TextPattern,
            pattern: "CUT".to_string(),
            ..Default::default()
        };
        let candidates = scan(&docs, &opts);
        let (out, _) = commit(&docs, &opts, &candidates);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].body, "CUT body");
    }

    #[test]
    fn test_commit_pattern_passes_through_without_approved_candidates() {
        let mut doc = Document::new("doc", "unchanged");
        doc.original_name = Some("doc.txt".to_string());
        let opts = SplitOptions {
            method: SplitMethod::TextPattern,
            pattern: "CUT".to_string(),
            ..Default::default()
        };
        let (out, outcome) = commit(&[doc.clone()], &opts, &[]);
        assert_eq!(out, vec![doc]);
        assert_eq!(outcome.sources_affected, 0);
    }

    #[test]
    fn test_plan_roundtrip_through_toml() {
        let opts = SplitOptions {
            method: SplitMethod::TextPattern,
            pattern: "###".to_string(),
            author: "A".to_string(),
            ..Default::default()
        };
        let candidates = vec![SplitCandidate {
            doc_index: 2,
            ordinal: 5,
            original_text: "context".to_string(),
            should_split: false,
            add_author: true,
            add_book: false,
            match_start: Some(10),
            match_end: Some(13),
        }];
        let plan = SplitPlan::new(opts.clone(), &candidates);

        let serialized = toml::to_string_pretty(&plan).unwrap();
        let parsed: SplitPlan = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.options, opts);
        assert_eq!(parsed.to_candidates(), candidates);
    }

    #[test]
    fn test_plan_drops_malformed_ids() {
        let plan = SplitPlan {
            options: SplitOptions::default(),
            candidates: vec![PlanCandidate {
                id: "broken".to_string(),
                text: "x".to_string(),
                split: true,
                add_author: false,
                add_book: false,
                match_start: None,
                match_end: None,
            }],
        };
        assert!(plan.to_candidates().is_empty());
    }
}
