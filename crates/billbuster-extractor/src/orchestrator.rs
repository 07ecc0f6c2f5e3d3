//! Extraction orchestration
//!
//! Mediates between the sliding memory and the point extraction service:
//! one extraction call per chunk, the memory updates that follow it, and
//! the batch-then-merge summarization over a whole document.

use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_points, parse_tags, PARSE_FAILURE_DESCRIPTION};
use crate::prompt::{
    merge_prompt, summary_prompt, tags_prompt, PromptBuilder, EXTRACTION_SYSTEM_PROMPT,
    MERGE_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, TAGS_SYSTEM_PROMPT,
};
use crate::session::DocumentSession;
use crate::types::{ChunkOutcome, DocumentRef, DocumentSummary};
use billbuster_domain::traits::LlmProvider;
use billbuster_domain::{Chunk, Point};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Summary of a batch with no points
pub const EMPTY_BATCH_SUMMARY: &str = "No points extracted.";

/// Summary of a document with no points
pub const EMPTY_DOCUMENT_SUMMARY: &str = "No points extracted from the document.";

/// Drives the point extraction service for one or more documents
pub struct ExtractionOrchestrator<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: PipelineConfig,
}

impl<L> ExtractionOrchestrator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new orchestrator
    pub fn new(llm_provider: L, config: PipelineConfig) -> Self {
        Self::from_arc(Arc::new(llm_provider), config)
    }

    /// Create an orchestrator sharing an existing provider
    pub fn from_arc(llm_provider: Arc<L>, config: PipelineConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract points from one chunk
    ///
    /// `context` is the rendered sliding memory, or `None` for the first
    /// chunk. A reply that cannot be parsed yields a single error point
    /// instead of an error; only service failures are returned as `Err`.
    pub async fn extract_from_chunk(
        &self,
        chunk: &Chunk,
        context: Option<&str>,
    ) -> Result<Vec<Point>, ExtractorError> {
        let prompt = PromptBuilder::new(&chunk.text).with_context(context).build();

        debug!(chunk = chunk.index, "Extraction prompt length: {} chars", prompt.len());

        let response = self.call_llm(EXTRACTION_SYSTEM_PROMPT, prompt).await?;

        debug!(chunk = chunk.index, "Extraction reply length: {} chars", response.len());

        let points = match parse_points(&response) {
            Ok(points) => points,
            Err(e) => {
                warn!(chunk = chunk.index, "Could not parse extraction reply: {}", e);
                vec![Point::error(PARSE_FAILURE_DESCRIPTION)]
            }
        };

        Ok(points
            .into_iter()
            .map(|point| point.with_chunk_index(chunk.index))
            .collect())
    }

    /// Run the full per-chunk protocol against `session`
    ///
    /// Extracts points, records their descriptions as key points, folds a
    /// summary of them into the running summary, remembers the head of the
    /// chunk as recent context, attaches `document` and pushes every point
    /// to the session queue. Memory is only touched once extraction and the
    /// chunk summary have both succeeded.
    pub async fn process_chunk(
        &self,
        chunk: &Chunk,
        document: &DocumentRef,
        session: &mut DocumentSession,
    ) -> Result<ChunkOutcome, ExtractorError> {
        let context = (chunk.index > 0).then(|| session.memory().context());

        let points = self.extract_from_chunk(chunk, context.as_deref()).await?;
        let parse_failed = points.iter().any(Point::is_error);
        let chunk_summary = self.summarize_points(&points).await?;

        let memory = session.memory_mut();
        for point in points.iter().filter(|p| !p.is_error()) {
            memory.add_key_point(point.description.clone());
        }
        memory.update_summary(&chunk_summary);
        memory.add_chunk_context(chunk.head(self.config.context_snippet_chars));

        let points: Vec<Point> = points
            .into_iter()
            .map(|point| point.with_document(document.path.clone(), document.name.clone()))
            .collect();

        let queue = session.queue();
        let mut dropped = 0;
        for point in &points {
            if !queue.push(point.clone()) {
                dropped += 1;
            }
        }

        info!(
            chunk = chunk.index,
            points = points.len(),
            dropped,
            "Processed chunk"
        );

        Ok(ChunkOutcome {
            points,
            parse_failed,
            dropped,
        })
    }

    /// Summarize a list of points in a few sentences
    pub async fn summarize_points(&self, points: &[Point]) -> Result<String, ExtractorError> {
        if points.is_empty() {
            return Ok(EMPTY_BATCH_SUMMARY.to_string());
        }

        let prompt = summary_prompt(points)?;
        let summary = self.call_llm(SUMMARY_SYSTEM_PROMPT, prompt).await?;
        Ok(summary.trim().to_string())
    }

    /// Summarize and tag a whole document
    ///
    /// Points are summarized in batches of `summary_batch_size`; when there
    /// is more than one batch, the batch summaries are merged by one further
    /// call. Tags come from a separate call over every point.
    pub async fn summarize_all(&self, points: &[Point]) -> Result<DocumentSummary, ExtractorError> {
        if points.is_empty() {
            return Ok(DocumentSummary {
                summary: EMPTY_DOCUMENT_SUMMARY.to_string(),
                tags: Vec::new(),
            });
        }

        let batch_size = self.config.summary_batch_size.max(1);
        let mut batch_summaries = Vec::new();
        for batch in points.chunks(batch_size) {
            batch_summaries.push(self.summarize_points(batch).await?);
        }

        info!(
            points = points.len(),
            batches = batch_summaries.len(),
            "Summarized point batches"
        );

        let summary = if batch_summaries.len() > 1 {
            let prompt = merge_prompt(&batch_summaries);
            self.call_llm(MERGE_SYSTEM_PROMPT, prompt).await?.trim().to_string()
        } else {
            batch_summaries.pop().unwrap_or_default()
        };

        let tags = self.generate_tags(points).await;

        Ok(DocumentSummary { summary, tags })
    }

    /// Generate topic tags for a list of points
    ///
    /// Never fails; a service error yields no tags.
    pub async fn generate_tags(&self, points: &[Point]) -> Vec<String> {
        if points.is_empty() {
            return Vec::new();
        }

        let reply = match tags_prompt(points) {
            Ok(prompt) => self.call_llm(TAGS_SYSTEM_PROMPT, prompt).await,
            Err(e) => Err(e),
        };

        match reply {
            Ok(reply) => parse_tags(&reply),
            Err(e) => {
                warn!("Tag generation failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Call the LLM provider on a blocking worker under the configured timeout
    async fn call_llm(&self, system: &'static str, prompt: String) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm_provider);

        // LlmProvider is synchronous
        let call = tokio::task::spawn_blocking(move || {
            llm.generate(system, &prompt)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        });

        timeout(self.config.extraction_timeout(), call)
            .await
            .map_err(|_| ExtractorError::Timeout)?
            .map_err(|e| ExtractorError::Task(format!("Task join error: {}", e)))?
    }
}
