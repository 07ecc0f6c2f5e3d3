//! Sliding memory of document context
//!
//! Keeps a bounded window of recent chunk snippets, a running summary capped
//! in length, named entities and key points. The orchestrator renders it into
//! the context block that precedes every chunk after the first.

use std::collections::VecDeque;

/// Bounded context carried from one chunk to the next
#[derive(Debug, Clone)]
pub struct SlidingMemory {
    capacity: usize,
    max_summary_length: usize,
    recent: VecDeque<String>,
    summary: String,
    entities: Vec<(String, String)>,
    key_points: Vec<String>,
}

impl SlidingMemory {
    /// Create an empty memory holding up to `capacity` recent snippets
    pub fn new(capacity: usize, max_summary_length: usize) -> Self {
        Self {
            capacity,
            max_summary_length,
            recent: VecDeque::with_capacity(capacity),
            summary: String::new(),
            entities: Vec::new(),
            key_points: Vec::new(),
        }
    }

    /// Remember a snippet of the most recent chunk, evicting the oldest
    pub fn add_chunk_context(&mut self, context: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(context.into());
    }

    /// Fold new summary text into the running summary
    ///
    /// When the result would exceed the maximum length, characters are
    /// dropped from the front of the existing summary so the newest material
    /// always survives, still separated from it by a space. If `delta` alone
    /// is longer than the limit only its tail is kept.
    pub fn update_summary(&mut self, delta: &str) {
        let current = self.summary.chars().count();
        let separator = usize::from(current > 0);
        let incoming = delta.chars().count() + separator;
        let max = self.max_summary_length;

        if current + incoming > max {
            let excess = current + incoming - max;
            if excess >= current {
                let delta_len = incoming - separator;
                self.summary = delta.chars().skip(delta_len.saturating_sub(max)).collect();
            } else {
                let kept: String = self.summary.chars().skip(excess).collect();
                self.summary = kept + " " + delta;
            }
        } else {
            if separator > 0 {
                self.summary.push(' ');
            }
            self.summary.push_str(delta);
        }

        let trimmed = self.summary.trim();
        if trimmed.len() != self.summary.len() {
            self.summary = trimmed.to_string();
        }
    }

    /// Record an entity; a repeated name replaces the earlier description
    pub fn add_entity(&mut self, name: impl Into<String>, description: impl Into<String>) {
        let name = name.into();
        let description = description.into();
        match self.entities.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = description,
            None => self.entities.push((name, description)),
        }
    }

    /// Record several entities at once
    pub fn add_entities<I, N, D>(&mut self, entities: I)
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<String>,
    {
        for (name, description) in entities {
            self.add_entity(name, description);
        }
    }

    /// Record a key point; exact duplicates keep their first position
    pub fn add_key_point(&mut self, point: impl Into<String>) {
        let point = point.into();
        if !self.key_points.contains(&point) {
            self.key_points.push(point);
        }
    }

    /// Render the memory as a context block
    ///
    /// The summary header and the recent context are always present; the
    /// entity and key point sections only when they have entries.
    pub fn context(&self) -> String {
        let mut out = String::from("DOCUMENT SUMMARY SO FAR:\n");
        out.push_str(&self.summary);
        out.push_str("\n\n");

        if !self.entities.is_empty() {
            out.push_str("IMPORTANT ENTITIES AND CONCEPTS:\n");
            for (name, description) in &self.entities {
                out.push_str(&format!("- {}: {}\n", name, description));
            }
            out.push('\n');
        }

        if !self.key_points.is_empty() {
            out.push_str("KEY POINTS IDENTIFIED SO FAR:\n");
            for point in &self.key_points {
                out.push_str(&format!("- {}\n", point));
            }
            out.push('\n');
        }

        out.push_str("RECENT CONTEXT:\n");
        let recent: Vec<&str> = self.recent.iter().map(String::as_str).collect();
        out.push_str(&recent.join("\n"));

        out
    }

    /// Current running summary
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Maximum number of recent snippets kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum running summary length in characters
    pub fn max_summary_length(&self) -> usize {
        self.max_summary_length
    }

    /// Recent chunk snippets, oldest first
    pub fn recent_contexts(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Recorded entities in insertion order
    pub fn entities(&self) -> &[(String, String)] {
        &self.entities
    }

    /// Recorded key points in insertion order
    pub fn key_points(&self) -> &[String] {
        &self.key_points
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.recent.is_empty()
            && self.entities.is_empty()
            && self.key_points.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.recent.clear();
        self.summary.clear();
        self.entities.clear();
        self.key_points.clear();
    }
}
