//! Result and statistics types for document processing

use crate::error::ExtractorError;
use billbuster_domain::{Point, RunId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identity of the document being processed, copied onto every point
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Path of the source document as given
    pub path: String,

    /// File name of the source document
    pub name: String,
}

impl DocumentRef {
    /// Create a reference from an explicit path and name
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Create a reference whose name is the file name of `path`
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(path.to_string_lossy(), name)
    }
}

/// Counters for one document run
///
/// Reset at the start of every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Chunks produced by the chunker
    pub total_chunks: usize,

    /// Chunks whose extraction call completed
    pub processed_chunks: usize,

    /// Points extracted, including parse-failure points
    pub total_points: usize,

    /// Failed chunks, parse failures and failed summarization
    pub processing_errors: usize,

    /// Chunks whose reply could not be parsed
    pub parse_failures: usize,

    /// Points dropped because the queue was full
    pub dropped_points: usize,
}

impl ProcessingStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed chunk and the points it produced
    pub fn record_chunk(&mut self, points: usize) {
        self.processed_chunks += 1;
        self.total_points += points;
    }

    /// Record a failed chunk or failed summarization
    pub fn record_error(&mut self) {
        self.processing_errors += 1;
    }

    /// Record an unparseable reply; also counts as a processing error
    pub fn record_parse_failure(&mut self) {
        self.parse_failures += 1;
        self.processing_errors += 1;
    }

    /// Record points the queue refused
    pub fn record_dropped(&mut self, count: usize) {
        self.dropped_points += count;
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of the counters
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Processing Summary".to_string(),
            "==================".to_string(),
            format!("Chunks: {}/{} processed", self.processed_chunks, self.total_chunks),
            format!("Points: {}", self.total_points),
            format!("Errors: {}", self.processing_errors),
        ];
        if self.parse_failures > 0 {
            lines.push(format!("  Parse failures: {}", self.parse_failures));
        }
        if self.dropped_points > 0 {
            lines.push(format!("Dropped points: {}", self.dropped_points));
        }
        lines.join("\n")
    }
}

/// What one chunk contributed to a run
#[derive(Debug, Clone, Default)]
pub struct ChunkOutcome {
    /// Points extracted from the chunk, with document metadata attached
    pub points: Vec<Point>,

    /// Whether the reply was unparseable and replaced by an error point
    pub parse_failed: bool,

    /// Points the queue refused
    pub dropped: usize,
}

/// Document-level summary and tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Summary text, possibly several paragraphs
    pub summary: String,

    /// Topic tags
    pub tags: Vec<String>,
}

/// Result of processing one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Identifier of the run that produced this result
    pub run_id: RunId,

    /// The processed document
    pub document: DocumentRef,

    /// Every point extracted, in chunk order
    pub points: Vec<Point>,

    /// Document-level summary
    pub summary: String,

    /// Topic tags
    pub tags: Vec<String>,

    /// Counters for the run
    pub stats: ProcessingStats,
}

impl ProcessingResult {
    /// Write the result as pretty-printed JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ExtractorError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbuster_domain::{Confidence, PointType};

    #[test]
    fn test_document_ref_from_path() {
        let doc = DocumentRef::from_path(Path::new("/data/bills/hb1234.txt"));
        assert_eq!(doc.path, "/data/bills/hb1234.txt");
        assert_eq!(doc.name, "hb1234.txt");
    }

    #[test]
    fn test_stats_recording() {
        let mut stats = ProcessingStats::new();
        stats.total_chunks = 3;
        stats.record_chunk(4);
        stats.record_chunk(1);
        stats.record_parse_failure();
        stats.record_error();
        stats.record_dropped(2);

        assert_eq!(stats.processed_chunks, 2);
        assert_eq!(stats.total_points, 5);
        assert_eq!(stats.processing_errors, 2);
        assert_eq!(stats.parse_failures, 1);
        assert_eq!(stats.dropped_points, 2);

        let summary = stats.summary();
        assert!(summary.contains("Chunks: 2/3 processed"));
        assert!(summary.contains("Dropped points: 2"));

        stats.reset();
        assert_eq!(stats, ProcessingStats::default());
    }

    #[test]
    fn test_save_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = ProcessingResult {
            run_id: RunId::new(),
            document: DocumentRef::new("bill.txt", "bill.txt"),
            points: vec![Point::new(PointType::Permission, "Allows telehealth", Confidence::Medium)],
            summary: "Expands telehealth.".to_string(),
            tags: vec!["telehealth".to_string()],
            stats: ProcessingStats::default(),
        };

        result.save_json(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["points"][0]["point_type"], "permission");
        assert_eq!(json["tags"][0], "telehealth");
        assert_eq!(json["run_id"], result.run_id.to_string());
    }
}
