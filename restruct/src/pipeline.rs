//! Batch pipeline: a TOML-described sequence of restructuring steps
//!
//! Each step maps to one session operation. A `split` step scans and
//! commits in one pass, accepting every candidate the scan proposes; use
//! the scan/commit subcommands when the candidate list needs curation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::scanner::HeadingLevel;
use crate::session::{Session, TransformError};
use crate::transforms::merge::MergeOptions;
use crate::transforms::normalize::HierarchySkip;
use crate::transforms::split::SplitOptions;

/// Errors that can occur when loading a pipeline description
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One step of a batch pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PipelineStep {
    /// Fold source-heading text into subsequent target headings
    Merge {
        source: HeadingLevel,
        target: HeadingLevel,
        #[serde(default)]
        exclude: String,
    },
    /// Replace a literal string everywhere in leaf-element text
    ReplaceText { find: String, with: String },
    /// Replace a regular expression inside headings
    ReplaceHeadings {
        #[serde(default)]
        scope: Option<HeadingLevel>,
        find: String,
        with: String,
    },
    /// Renumber heading levels into a dense hierarchy
    Normalize {
        #[serde(default)]
        skip: HierarchySkip,
    },
    /// Scan and commit a split, accepting every proposed candidate
    Split {
        #[serde(default)]
        options: SplitOptions,
    },
    /// Restore the store as it was before the previous step
    Undo,
}

/// An ordered sequence of pipeline steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default, rename = "step")]
    pub steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Load a pipeline description from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Execute every step of the pipeline against the session, in order
pub fn run(session: &mut Session, pipeline: &Pipeline) -> Result<(), TransformError> {
    for step in &pipeline.steps {
        match step {
            PipelineStep::Merge {
                source,
                target,
                exclude,
            } => {
                session.merge(&MergeOptions {
                    source: *source,
                    target: *target,
                    exclude: exclude.clone(),
                })?;
            }
            PipelineStep::ReplaceText { find, with } => {
                session.replace_text(find, with)?;
            }
            PipelineStep::ReplaceHeadings { scope, find, with } => {
                session.replace_headings(*scope, find, with)?;
            }
            PipelineStep::Normalize { skip } => {
                session.normalize(skip)?;
            }
            PipelineStep::Split { options } => {
                session.scan_split(options.clone());
                if session.review().is_some() {
                    session.commit_split();
                }
            }
            PipelineStep::Undo => {
                session.undo();
            }
        }
    }
    Ok(())
}
