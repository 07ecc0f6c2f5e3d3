//! Raw text suppliers
//!
//! The pipeline only needs the full text of a document. Decoding formats
//! such as PDF happens outside this crate; suppliers that do it join their
//! pages with [`join_pages`] so page markers survive as ordinary text.

use crate::error::ExtractorError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the full text of a document
pub trait TextSource: Send + Sync {
    /// Read the document at `path`
    ///
    /// Fails with [`ExtractorError::NotFound`] when the document does not
    /// exist.
    fn read(&self, path: &Path) -> Result<String, ExtractorError>;
}

/// Reads UTF-8 text files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextSource;

impl TextSource for FileTextSource {
    fn read(&self, path: &Path) -> Result<String, ExtractorError> {
        if !path.is_file() {
            return Err(ExtractorError::NotFound(path.display().to_string()));
        }

        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            return Err(ExtractorError::UnsupportedFormat(format!(
                "{} (extract the text first and pass the .txt file)",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            ExtractorError::UnsupportedFormat(format!("{} is not UTF-8 text", path.display()))
        })?;

        debug!("Read {} chars from {}", text.chars().count(), path.display());
        Ok(text)
    }
}

/// In-memory documents keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryTextSource {
    documents: HashMap<PathBuf, String>,
}

impl MemoryTextSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document
    pub fn with_document(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Add or replace a document
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }
}

impl TextSource for MemoryTextSource {
    fn read(&self, path: &Path) -> Result<String, ExtractorError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| ExtractorError::NotFound(path.display().to_string()))
    }
}

/// Concatenate page texts, prefixing each with a `[PAGE n]` marker
///
/// Pages are numbered from 1.
///
/// # Examples
///
/// ```
/// use billbuster_extractor::source::join_pages;
///
/// let text = join_pages(["Title", "Body"]);
/// assert_eq!(text, "\n\n[PAGE 1]\n\nTitle\n\n[PAGE 2]\n\nBody");
/// ```
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for (i, page) in pages.into_iter().enumerate() {
        text.push_str(&format!("\n\n[PAGE {}]\n\n", i + 1));
        text.push_str(page.as_ref());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hb12.txt");
        std::fs::write(&path, "AN ACT relating to water rights.").unwrap();

        let text = FileTextSource.read(&path).unwrap();
        assert_eq!(text, "AN ACT relating to water rights.");
    }

    #[test]
    fn test_file_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileTextSource.read(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(ExtractorError::NotFound(_))));
    }

    #[test]
    fn test_file_source_rejects_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill.PDF");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let result = FileTextSource.read(&path);
        assert!(matches!(result, Err(ExtractorError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_file_source_rejects_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let result = FileTextSource.read(&path);
        assert!(matches!(result, Err(ExtractorError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryTextSource::new().with_document("a.txt", "alpha");
        assert_eq!(source.read(Path::new("a.txt")).unwrap(), "alpha");
        assert!(matches!(
            source.read(Path::new("b.txt")),
            Err(ExtractorError::NotFound(_))
        ));
    }

    #[test]
    fn test_join_pages_empty() {
        assert_eq!(join_pages(Vec::<String>::new()), "");
    }
}
