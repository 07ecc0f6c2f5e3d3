//! Per-document processing state

use crate::config::PipelineConfig;
use crate::memory::SlidingMemory;
use crate::queue::PointQueue;
use crate::types::ProcessingStats;
use billbuster_domain::RunId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Stage of a document run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "chunk")]
pub enum PipelineState {
    /// Nothing started yet
    #[default]
    Idle,
    /// Splitting the document into chunks
    Chunking,
    /// Extracting points from the chunk with this index
    ExtractingChunk(usize),
    /// Building the document summary and tags
    Summarizing,
    /// Run finished
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Chunking => write!(f, "chunking"),
            PipelineState::ExtractingChunk(i) => write!(f, "extracting chunk {}", i),
            PipelineState::Summarizing => write!(f, "summarizing"),
            PipelineState::Done => write!(f, "done"),
        }
    }
}

/// Memory, queue and counters owned by one document run
///
/// Build one session per document; sessions are never shared between
/// documents processed concurrently. Consumers take a queue handle with
/// [`DocumentSession::queue`] before processing starts and keep it across
/// the run.
#[derive(Debug)]
pub struct DocumentSession {
    run_id: RunId,
    memory: SlidingMemory,
    queue: Arc<PointQueue>,
    stats: ProcessingStats,
    state: PipelineState,
}

impl DocumentSession {
    /// Create a session sized by `config`
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            run_id: RunId::new(),
            memory: SlidingMemory::new(config.memory_size, config.max_summary_length),
            queue: Arc::new(PointQueue::new(config.queue_capacity)),
            stats: ProcessingStats::new(),
            state: PipelineState::Idle,
        }
    }

    /// Clear memory, queue and counters and start a new run
    ///
    /// The queue handle stays the same so existing consumers keep working.
    pub fn reset(&mut self) {
        self.run_id = RunId::new();
        self.memory.clear();
        self.queue.clear();
        self.stats.reset();
        self.state = PipelineState::Idle;
    }

    /// Move to `state`
    pub fn transition(&mut self, state: PipelineState) {
        debug!(run_id = %self.run_id, from = %self.state, to = %state, "Pipeline state change");
        self.state = state;
    }

    /// Identifier of the current run
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Shared handle to the point queue
    pub fn queue(&self) -> Arc<PointQueue> {
        Arc::clone(&self.queue)
    }

    /// Current stage
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters for the current run
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ProcessingStats {
        &mut self.stats
    }

    /// Context carried between chunks
    pub fn memory(&self) -> &SlidingMemory {
        &self.memory
    }

    /// Mutable access to the sliding memory
    pub fn memory_mut(&mut self) -> &mut SlidingMemory {
        &mut self.memory
    }
}
