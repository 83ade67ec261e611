//! Directory walker for discovering ingestible text documents

use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use crate::document::Document;

/// File extensions accepted at ingestion
const INGEST_EXTENSIONS: &[&str] = &["txt", "html", "htm"];

/// Errors that can occur while loading documents from disk
#[derive(Error, Debug)]
pub enum WalkerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Walk a directory tree and load every ingestible file as a document.
///
/// Files are visited in filename order so the canonical document order is
/// stable across runs. The document name is the filename stem; the full
/// filename is kept as ingestion provenance. Files that are not valid UTF-8
/// are skipped with a warning.
pub fn load_documents(root: &Path) -> Result<Vec<Document>, WalkerError> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();

        if !path.is_file() || !has_ingest_extension(path) {
            continue;
        }

        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                log::warn!("skipping non-UTF-8 file {}", path.display());
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();
        let original_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string());

        documents.push(Document {
            name,
            body,
            original_name,
        });
    }

    Ok(documents)
}

fn has_ingest_extension(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => INGEST_EXTENSIONS
            .iter()
            .any(|wanted| ext.eq_ignore_ascii_case(wanted)),
        None => false,
    }
}
