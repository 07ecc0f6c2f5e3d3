//! Document pipeline: chunk, extract chunk by chunk, summarize

use crate::chunking::TextChunker;
use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::orchestrator::ExtractionOrchestrator;
use crate::session::{DocumentSession, PipelineState};
use crate::source::{FileTextSource, TextSource};
use crate::types::{DocumentRef, DocumentSummary, ProcessingResult};
use billbuster_domain::traits::LlmProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

/// Turns documents into points, a summary and tags
///
/// Chunks of one document are processed strictly in order, since each
/// chunk's context depends on the memory left by the previous one. Separate
/// documents may run concurrently, each with its own [`DocumentSession`].
pub struct DocumentPipeline<L, S = FileTextSource>
where
    L: LlmProvider,
{
    orchestrator: ExtractionOrchestrator<L>,
    chunker: TextChunker,
    source: S,
}

impl<L> DocumentPipeline<L, FileTextSource>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a pipeline reading documents from disk
    ///
    /// Fails with [`ExtractorError::InvalidInput`] when the chunk size or
    /// overlap is unusable, and with [`ExtractorError::Config`] when any
    /// other setting does not validate.
    pub fn new(llm_provider: L, config: PipelineConfig) -> Result<Self, ExtractorError> {
        Self::with_source(llm_provider, FileTextSource, config)
    }
}

impl<L, S> DocumentPipeline<L, S>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    S: TextSource,
{
    /// Create a pipeline reading documents from `source`
    pub fn with_source(llm_provider: L, source: S, config: PipelineConfig) -> Result<Self, ExtractorError> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?
            .with_separators(config.separators.iter().cloned());
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            orchestrator: ExtractionOrchestrator::new(llm_provider, config),
            chunker,
            source,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        self.orchestrator.config()
    }

    /// The chunker used for every document
    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// The orchestrator used for every document
    pub fn orchestrator(&self) -> &ExtractionOrchestrator<L> {
        &self.orchestrator
    }

    /// Create a session sized for this pipeline
    pub fn new_session(&self) -> DocumentSession {
        DocumentSession::new(self.config())
    }

    /// Process the document at `path` in a fresh session
    pub async fn process(&self, path: impl AsRef<Path>) -> Result<ProcessingResult, ExtractorError> {
        let mut session = self.new_session();
        self.process_in(&mut session, path).await
    }

    /// Process the document at `path` in a caller-held session
    ///
    /// The document is read before the session is reset, so a missing
    /// document leaves the session untouched.
    pub async fn process_in(
        &self,
        session: &mut DocumentSession,
        path: impl AsRef<Path>,
    ) -> Result<ProcessingResult, ExtractorError> {
        let path = path.as_ref();
        let text = self.source.read(path)?;
        self.process_text(session, DocumentRef::from_path(path), &text).await
    }

    /// Process already loaded text
    pub async fn process_text(
        &self,
        session: &mut DocumentSession,
        document: DocumentRef,
        text: &str,
    ) -> Result<ProcessingResult, ExtractorError> {
        session.reset();
        let span = info_span!("document", run_id = %session.run_id(), document = %document.name);
        self.run(session, document, text).instrument(span).await
    }

    async fn run(
        &self,
        session: &mut DocumentSession,
        document: DocumentRef,
        text: &str,
    ) -> Result<ProcessingResult, ExtractorError> {
        session.transition(PipelineState::Chunking);
        let chunks = self.chunker.chunk(text);
        session.stats_mut().total_chunks = chunks.len();

        info!(
            "Processing {} ({} chars, {} chunks)",
            document.path,
            text.chars().count(),
            chunks.len()
        );

        let mut all_points = Vec::new();
        for chunk in &chunks {
            session.transition(PipelineState::ExtractingChunk(chunk.index));

            match self.orchestrator.process_chunk(chunk, &document, session).await {
                Ok(outcome) => {
                    let stats = session.stats_mut();
                    stats.record_chunk(outcome.points.len());
                    if outcome.parse_failed {
                        stats.record_parse_failure();
                    }
                    stats.record_dropped(outcome.dropped);
                    all_points.extend(outcome.points);
                }
                Err(e) => {
                    error!(chunk = chunk.index, "Error processing chunk: {}", e);
                    session.stats_mut().record_error();
                }
            }
        }

        session.queue().mark_complete();
        info!("Document processing complete. Total points: {}", all_points.len());

        session.transition(PipelineState::Summarizing);
        let DocumentSummary { summary, tags } =
            match self.orchestrator.summarize_all(&all_points).await {
                Ok(summary) => summary,
                Err(e) => {
                    error!("Error generating document summary: {}", e);
                    session.stats_mut().record_error();
                    DocumentSummary::default()
                }
            };

        info!("Generated summary with {} tags", tags.len());
        session.transition(PipelineState::Done);

        Ok(ProcessingResult {
            run_id: session.run_id(),
            document,
            points: all_points,
            summary,
            tags,
            stats: session.stats().clone(),
        })
    }
}

impl<L, S> DocumentPipeline<L, S>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    S: TextSource + 'static,
{
    /// Process several documents concurrently, one task and session each
    ///
    /// Results come back in the order of `paths`.
    pub async fn process_all(
        self: &Arc<Self>,
        paths: Vec<PathBuf>,
    ) -> Vec<Result<ProcessingResult, ExtractorError>> {
        let handles: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let pipeline = Arc::clone(self);
                tokio::spawn(async move { pipeline.process(&path).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle
                .await
                .map_err(|e| ExtractorError::Task(e.to_string()))
                .and_then(|result| result);
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryTextSource;
    use billbuster_llm::MockProvider;

    fn scripted() -> MockProvider {
        let mut llm = MockProvider::new("unexpected call");
        llm.add_response(
            "extracting key points",
            r#"[{"point_type": "requirement", "description": "Requires annual audits", "confidence": "high"}]"#,
        );
        llm.add_response("concise summaries", "Requires audits.");
        llm.add_response("key topics and themes", r#"["audits"]"#);
        llm
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            chunk_size: 40,
            chunk_overlap: 5,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_invalid_chunking_is_invalid_input() {
        let config = PipelineConfig {
            chunk_overlap: 4000,
            ..PipelineConfig::default()
        };
        let result = DocumentPipeline::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::InvalidInput(_))));

        let config = PipelineConfig {
            chunk_size: 0,
            chunk_overlap: 0,
            ..PipelineConfig::default()
        };
        let result = DocumentPipeline::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig {
            queue_capacity: 0,
            ..PipelineConfig::default()
        };
        let result = DocumentPipeline::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_process_text_single_chunk() {
        let pipeline = DocumentPipeline::new(scripted(), PipelineConfig::default()).unwrap();
        let mut session = pipeline.new_session();

        let result = pipeline
            .process_text(&mut session, DocumentRef::new("sb1.txt", "sb1.txt"), "SEC. 1. Audits.")
            .await
            .unwrap();

        assert_eq!(result.points.len(), 1);
        assert_eq!(result.points[0].document_path, "sb1.txt");
        assert_eq!(result.summary, "Requires audits.");
        assert_eq!(result.tags, vec!["audits"]);
        assert_eq!(result.stats.total_chunks, 1);
        assert_eq!(result.stats.processed_chunks, 1);
        assert_eq!(result.run_id, session.run_id());
        assert_eq!(session.state(), PipelineState::Done);
        assert!(session.queue().is_complete());
    }

    #[tokio::test]
    async fn test_process_reads_from_source() {
        let text = "SEC. 1. Every agency shall be audited.\n\nSEC. 2. Audits are annual.";
        let source = MemoryTextSource::new().with_document("/bills/hb9.txt", text);
        let pipeline = DocumentPipeline::with_source(scripted(), source, small_config()).unwrap();

        let result = pipeline.process("/bills/hb9.txt").await.unwrap();

        assert_eq!(result.document.name, "hb9.txt");
        assert_eq!(result.stats.total_chunks, 2);
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.points[1].chunk_index, 1);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let source = MemoryTextSource::new().with_document("empty.txt", "");
        let llm = scripted();
        let pipeline = DocumentPipeline::with_source(llm.clone(), source, small_config()).unwrap();

        let result = pipeline.process("empty.txt").await.unwrap();

        assert!(result.points.is_empty());
        assert_eq!(result.summary, crate::orchestrator::EMPTY_DOCUMENT_SUMMARY);
        assert_eq!(result.stats.total_chunks, 0);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_summary_failure_is_not_fatal() {
        let llm = MockProvider::new("unexpected call");
        // the chunk summary succeeds, the document summary fails
        llm.push_response(r#"[{"description": "a"}]"#);
        llm.push_response("Chunk summary.");
        llm.push_error();
        let pipeline = DocumentPipeline::new(llm, PipelineConfig::default()).unwrap();
        let mut session = pipeline.new_session();

        let result = pipeline
            .process_text(&mut session, DocumentRef::default(), "text")
            .await
            .unwrap();

        assert_eq!(result.points.len(), 1);
        assert_eq!(result.summary, "");
        assert!(result.tags.is_empty());
        assert_eq!(result.stats.processing_errors, 1);
    }

    #[tokio::test]
    async fn test_process_all_runs_each_document() {
        let source = MemoryTextSource::new()
            .with_document("a.txt", "SEC. 1. Audits.")
            .with_document("b.txt", "SEC. 1. More audits.");
        let pipeline = Arc::new(
            DocumentPipeline::with_source(scripted(), source, PipelineConfig::default()).unwrap(),
        );

        let results = pipeline
            .process_all(vec![
                PathBuf::from("a.txt"),
                PathBuf::from("missing.txt"),
                PathBuf::from("b.txt"),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().document.name, "a.txt");
        assert!(matches!(results[1], Err(ExtractorError::NotFound(_))));
        assert_eq!(results[2].as_ref().unwrap().document.name, "b.txt");
        assert_ne!(
            results[0].as_ref().unwrap().run_id,
            results[2].as_ref().unwrap().run_id
        );
    }
}
