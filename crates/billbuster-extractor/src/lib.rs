//! BillBuster Extractor
//!
//! Turns long legislative documents into structured points.
//!
//! # Overview
//!
//! A document is too large for one call to the point extraction service, so
//! it is split into overlapping chunks and processed chunk by chunk. A
//! sliding memory carries a running summary, key points and recent context
//! from one chunk to the next, so later points can build on earlier ones.
//! Extracted points stream out through a bounded queue while the document is
//! still being processed.
//!
//! # Architecture
//!
//! ```text
//! TextSource → TextChunker → ┬→ ExtractionOrchestrator ⇄ LLM
//!                            │        ↕
//!                            │   SlidingMemory
//!                            └→ PointQueue → consumers
//!
//! all points → summarize_all (batch, merge, tags) → ProcessingResult
//! ```
//!
//! # Key Features
//!
//! - **Recursive chunking**: paragraph, line and word boundaries preferred over hard splits
//! - **Sliding memory**: bounded context across chunks
//! - **Streaming**: bounded, thread-safe queue with completion signalling
//! - **Fault isolation**: a failed chunk is recorded and skipped, never fatal
//! - **Hierarchical summaries**: batch-then-merge summaries and topic tags
//!
//! # Example Usage
//!
//! ```no_run
//! use billbuster_extractor::{DocumentPipeline, PipelineConfig};
//! use billbuster_llm::OllamaProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = OllamaProvider::default_endpoint("llama3");
//! let pipeline = DocumentPipeline::new(llm, PipelineConfig::default())?;
//!
//! // Consumers take the queue before processing starts
//! let mut session = pipeline.new_session();
//! let queue = session.queue();
//! let consumer = std::thread::spawn(move || {
//!     let mut received = 0;
//!     while let Some(point) = queue.pop(None) {
//!         println!("[{}] {}", point.point_type, point.description);
//!         received += 1;
//!     }
//!     received
//! });
//!
//! let result = pipeline.process_in(&mut session, "bills/hb1234.txt").await?;
//!
//! println!("Summary: {}", result.summary);
//! println!("Tags: {}", result.tags.join(", "));
//! println!("{}", result.stats.summary());
//! println!("Streamed: {} points", consumer.join().unwrap_or(0));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod parser;
mod memory;
mod queue;
mod session;
mod orchestrator;
mod pipeline;
pub mod chunking;
pub mod source;


pub use error::ExtractorError;
pub use config::{PipelineConfig, DEFAULT_SEPARATORS};
pub use types::{
    ChunkOutcome, DocumentRef, DocumentSummary, ProcessingResult, ProcessingStats,
};
pub use chunking::{chunk, TextChunker};
pub use memory::SlidingMemory;
pub use queue::PointQueue;
pub use session::{DocumentSession, PipelineState};
pub use orchestrator::{ExtractionOrchestrator, EMPTY_BATCH_SUMMARY, EMPTY_DOCUMENT_SUMMARY};
pub use parser::PARSE_FAILURE_DESCRIPTION;
pub use prompt::{
    EXTRACTION_SYSTEM_PROMPT, MERGE_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, TAGS_SYSTEM_PROMPT,
};
pub use pipeline::DocumentPipeline;
pub use source::{join_pages, FileTextSource, MemoryTextSource, TextSource};
