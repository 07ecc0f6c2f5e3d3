//! Bounded, thread-safe point queue with completion signalling
//!
//! The pipeline pushes points as it extracts them; any number of consumers
//! may pop concurrently. Pushing never blocks: when the buffer is full the
//! point is dropped and counted.

use crate::error::ExtractorError;
use billbuster_domain::Point;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct QueueState {
    buffer: VecDeque<Point>,
    complete: bool,
    dropped: u64,
}

/// Bounded FIFO of extracted points
#[derive(Debug)]
pub struct PointQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    available: Condvar,
}

impl PointQueue {
    /// Create an empty queue holding at most `capacity` points
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(QueueState::default()),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a point without blocking
    ///
    /// Returns `false` when the queue is full and the point was dropped.
    pub fn push(&self, point: Point) -> bool {
        let mut state = self.lock();
        if state.buffer.len() >= self.capacity {
            state.dropped += 1;
            warn!(
                capacity = self.capacity,
                dropped = state.dropped,
                "Point queue full, dropping point: {}",
                point.description
            );
            return false;
        }
        state.buffer.push_back(point);
        drop(state);
        self.available.notify_one();
        true
    }

    /// Dequeue the oldest point, waiting up to `timeout`
    ///
    /// Returns `None` when the wait elapses with nothing buffered, whether or
    /// not the queue is complete. Without a timeout the call waits until a
    /// point arrives or the queue is marked complete.
    pub fn pop(&self, timeout: Option<Duration>) -> Option<Point> {
        let mut state = self.lock();
        if let Some(point) = state.buffer.pop_front() {
            return Some(point);
        }

        // a timeout too large to represent waits without a deadline
        match timeout.and_then(|timeout| Instant::now().checked_add(timeout)) {
            None => loop {
                if let Some(point) = state.buffer.pop_front() {
                    return Some(point);
                }
                if state.complete {
                    return None;
                }
                state = self
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            },
            Some(deadline) => {
                loop {
                    if let Some(point) = state.buffer.pop_front() {
                        return Some(point);
                    }
                    let now = Instant::now();
                    if state.complete || now >= deadline {
                        return None;
                    }
                    let (guard, _) = self
                        .available
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    state = guard;
                }
            }
        }
    }

    /// Signal that no more points will be produced
    pub fn mark_complete(&self) {
        let mut state = self.lock();
        if !state.complete {
            debug!(buffered = state.buffer.len(), "Point queue marked complete");
        }
        state.complete = true;
        drop(state);
        self.available.notify_all();
    }

    /// Remove and return every buffered point; completion is unchanged
    pub fn drain_to_list(&self) -> Vec<Point> {
        self.lock().buffer.drain(..).collect()
    }

    /// Drain the buffer and reset completion and the drop counter
    pub fn clear(&self) {
        let mut state = self.lock();
        state.buffer.clear();
        state.complete = false;
        state.dropped = 0;
    }

    /// Drain the queue into a pretty-printed JSON array at `path`
    ///
    /// Returns the number of points written.
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<usize, ExtractorError> {
        let points = self.drain_to_list();
        let json = serde_json::to_string_pretty(&points)?;
        std::fs::write(path.as_ref(), json)?;
        debug!("Exported {} points to {}", points.len(), path.as_ref().display());
        Ok(points.len())
    }

    /// Number of buffered points
    pub fn size(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Whether no points are buffered
    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    /// Whether the producer has finished
    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    /// Maximum number of buffered points
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Points dropped because the queue was full since the last clear
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}
