//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use billbuster_domain::{Chunk, Confidence, Point};
use billbuster_extractor::{ProcessingResult, ProcessingStats};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Characters of chunk text shown in the chunk preview
const PREVIEW_CHARS: usize = 60;

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The output format in use.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a complete processing result.
    pub fn format_result(&self, result: &ProcessingResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => Ok(format!(
                "{}\n\n{}",
                self.format_points_table(&result.points),
                self.format_overview(result)?
            )),
        }
    }

    /// Format everything in a result except its points.
    ///
    /// Used after streaming, when the points are already printed. JSON
    /// output is a single line.
    pub fn format_overview(&self, result: &ProcessingResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(&serde_json::json!({
                "run_id": result.run_id,
                "document": result.document,
                "summary": result.summary,
                "tags": result.tags,
                "stats": result.stats,
            }))?),
            OutputFormat::Table => {
                let mut sections = vec![format!("{}\n{}", self.colorize("Summary", "cyan"), result.summary)];
                if !result.tags.is_empty() {
                    sections.push(format!("{} {}", self.colorize("Tags:", "cyan"), result.tags.join(", ")));
                }
                sections.push(self.format_stats(&result.stats));
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format points output.
    pub fn format_points(&self, points: &[Point]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(points)?),
            OutputFormat::Table => Ok(self.format_points_table(points)),
        }
    }

    fn format_points_table(&self, points: &[Point]) -> String {
        if points.is_empty() {
            return self.colorize("No points found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Chunk", "Type", "Description", "Reference", "Page", "Confidence"]);

        for point in points {
            let page = point.page_number.map(|p| p.to_string()).unwrap_or_default();
            builder.push_record([
                point.chunk_index.to_string(),
                point.point_type.to_string(),
                point.description.clone(),
                point.reference.clone(),
                page,
                point.confidence.as_str().to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format one point as it streams out of the queue.
    ///
    /// JSON output is one object per line.
    pub fn format_streamed_point(&self, point: &Point) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(point)?),
            OutputFormat::Table => {
                let label = format!("[{}]", point.point_type);
                let label = match point.confidence {
                    Confidence::High => self.colorize(&label, "green"),
                    Confidence::Medium => self.colorize(&label, "yellow"),
                    Confidence::Low => self.colorize(&label, "red"),
                };
                let mut line = format!("{} {}", label, point.description);
                if !point.reference.is_empty() {
                    line.push_str(&format!(" ({})", point.reference));
                }
                Ok(line)
            }
        }
    }

    /// Format a chunk preview.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("Document is empty.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Index", "Start", "End", "Chars", "Overlap", "Preview"]);

                for (i, chunk) in chunks.iter().enumerate() {
                    let overlap = i
                        .checked_sub(1)
                        .map(|prev| chunks[prev].overlap_with(chunk).to_string())
                        .unwrap_or_default();
                    builder.push_record([
                        chunk.index.to_string(),
                        chunk.char_start.to_string(),
                        chunk.char_end.to_string(),
                        chunk.char_len().to_string(),
                        overlap,
                        preview(chunk.head(PREVIEW_CHARS)),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(table.to_string())
            }
        }
    }

    /// Format processing counters.
    pub fn format_stats(&self, stats: &ProcessingStats) -> String {
        let report = stats.summary();
        if stats.processing_errors > 0 || stats.dropped_points > 0 {
            self.colorize(&report, "yellow")
        } else {
            report
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Flatten whitespace so a chunk head fits on one table row.
fn preview(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbuster_domain::{PointType, RunId};
    use billbuster_extractor::DocumentRef;

    fn create_test_point() -> Point {
        Point::new(PointType::Funding, "Appropriates $2M for rural clinics", Confidence::High)
            .with_reference("Section 3")
            .with_page_number(Some(4))
            .with_chunk_index(1)
            .with_document("/bills/hb1.txt", "hb1.txt")
    }

    fn create_test_result() -> ProcessingResult {
        ProcessingResult {
            run_id: RunId::new(),
            document: DocumentRef::new("/bills/hb1.txt", "hb1.txt"),
            points: vec![create_test_point()],
            summary: "Funds rural clinics.".to_string(),
            tags: vec!["health".to_string(), "funding".to_string()],
            stats: ProcessingStats::default(),
        }
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_points(&[create_test_point()]).unwrap();
        assert!(output.contains("Description"));
        assert!(output.contains("funding"));
        assert!(output.contains("Section 3"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_points(&[create_test_point()]).unwrap();
        assert!(output.contains("\"point_type\": \"funding\""));
        assert!(output.contains("\"page_number\": 4"));
    }

    #[test]
    fn test_empty_points() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_points(&[]).unwrap();
        assert!(output.contains("No points found"));
    }

    #[test]
    fn test_result_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        assert!(output.contains("Funds rural clinics."));
        assert!(output.contains("Tags: health, funding"));
        assert!(output.contains("Processing Summary"));
    }

    #[test]
    fn test_result_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tags"][1], "funding");
        assert_eq!(value["points"][0]["chunk_index"], 1);
    }

    #[test]
    fn test_overview_json_is_one_line() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_overview(&create_test_result()).unwrap();
        assert!(!output.contains('\n'));
        assert!(!output.contains("point_type"));
        assert!(output.contains("\"summary\":\"Funds rural clinics.\""));
    }

    #[test]
    fn test_streamed_point() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let line = formatter.format_streamed_point(&create_test_point()).unwrap();
        assert_eq!(line, "[funding] Appropriates $2M for rural clinics (Section 3)");

        let formatter = Formatter::new(OutputFormat::Json, false);
        let line = formatter.format_streamed_point(&create_test_point()).unwrap();
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_chunk_preview() {
        let chunks = vec![
            Chunk::new(0, "SEC. 1.\n\nShort title.", 0, 21),
            Chunk::new(1, "title. SEC. 2.", 15, 29),
        ];
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_chunks(&chunks).unwrap();
        assert!(output.contains("Overlap"));
        assert!(output.contains("SEC. 1. Short title."));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
