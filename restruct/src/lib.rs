//! restruct - batch restructuring engine for marked-up text documents
//!
//! Loads a batch of HTML-like text documents, applies heading-oriented
//! restructuring operations (merge, replace, split, hierarchy
//! normalization) with single-step undo, and exports the result as a ZIP
//! archive of plain-text files.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod document;
pub mod dom;
pub mod enhance;
pub mod history;
pub mod oplog;
pub mod pipeline;
pub mod scanner;
pub mod session;
pub mod transforms;
pub mod walker;
pub mod zip_exporter;

pub use document::{Document, DocumentStore, ExportEntry};
pub use session::Session;
