//! Configuration for the document pipeline

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Separators tried by the chunker, coarsest first
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

fn default_separators() -> Vec<String> {
    DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect()
}

/// Configuration for the document pipeline
///
/// Every size is measured in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum chunk size
    pub chunk_size: usize,

    /// Maximum overlap between adjacent chunks
    pub chunk_overlap: usize,

    /// Separators tried by the chunker, coarsest first; `""` splits per character
    pub separators: Vec<String>,

    /// Number of recent chunk snippets kept in sliding memory
    pub memory_size: usize,

    /// Maximum length of the running summary
    pub max_summary_length: usize,

    /// Capacity of the point queue; points beyond it are dropped
    pub queue_capacity: usize,

    /// Points per batch when summarizing a whole document
    pub summary_batch_size: usize,

    /// Leading characters of each chunk kept as recent context
    pub context_snippet_chars: usize,

    /// Maximum time for a single extraction service call (seconds)
    pub extraction_timeout_secs: u64,
}

impl PipelineConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".to_string());
        }
        if self.summary_batch_size == 0 {
            return Err("summary_batch_size must be greater than 0".to_string());
        }
        if self.max_summary_length == 0 {
            return Err("max_summary_length must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            chunk_overlap: 500,
            separators: default_separators(),
            memory_size: 5,
            max_summary_length: 1000,
            queue_capacity: 1000,
            summary_batch_size: 20,
            context_snippet_chars: 500,
            extraction_timeout_secs: 120,
        }
    }
}

impl PipelineConfig {
    /// Aggressive preset: smaller chunks and shorter timeouts for faster, cheaper runs
    pub fn aggressive() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
            memory_size: 3,
            max_summary_length: 600,
            extraction_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Lenient preset: larger chunks, more memory and longer timeouts for better quality
    pub fn lenient() -> Self {
        Self {
            chunk_size: 8000,
            chunk_overlap: 1000,
            memory_size: 8,
            max_summary_length: 2000,
            queue_capacity: 5000,
            extraction_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents).map_err(ExtractorError::Config)?;
        config.validate().map_err(ExtractorError::Config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 4000);
        assert_eq!(config.chunk_overlap, 500);
        assert_eq!(config.summary_batch_size, 20);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::aggressive().validate().is_ok());
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_chunk_size() {
        let mut config = PipelineConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = PipelineConfig::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = PipelineConfig::from_toml("chunk_size = 1200\nchunk_overlap = 100\n").unwrap();
        assert_eq!(parsed.chunk_size, 1200);
        assert_eq!(parsed.memory_size, 5);
        assert_eq!(parsed.separators, default_separators());
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "chunk_size = 100\nchunk_overlap = 100\n").unwrap();

        let result = PipelineConfig::from_file(&path);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }
}
