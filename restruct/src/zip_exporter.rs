//! ZIP exporter: package the current store as one `.txt` file per document

use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::document::{self, Document};

/// Errors that can occur during ZIP export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Write the export listing of `store` to a ZIP archive at `path`.
///
/// Entry names come from the sanitized export listing, so the archive never
/// contains path separators or other forbidden filename characters. Returns
/// the number of entries written.
pub fn to_zip(store: &[Document], path: &Path) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    let mut writer = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entries = document::export_entries(store);
    for entry in &entries {
        writer.start_file(&entry.filename, options)?;
        writer.write_all(entry.content.as_bytes())?;
    }
    writer.finish()?;

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_zip_contains_sanitized_entries() {
        let store = vec![
            Document::new("alpha", "<p>a</p>"),
            Document::new("be:ta", "<p>b</p>"),
        ];
        let path = std::env::temp_dir().join("restruct_export_test.zip");

        let written = to_zip(&store, &path).unwrap();
        assert_eq!(written, 2);

        let file = File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_name("beta.txt").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "<p>b</p>");
        drop(entry);

        assert!(archive.by_name("alpha.txt").is_ok());
        std::fs::remove_file(&path).unwrap();
    }
}
