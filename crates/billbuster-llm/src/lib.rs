//! BillBuster LLM Provider Layer
//!
//! Pluggable implementations of the point extraction service.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `billbuster-domain`. The pipeline only ever sees the trait, so any backend
//! (or a test double) can be injected.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock that records every call
//! - `OllamaProvider`: Local Ollama API integration
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use billbuster_llm::MockProvider;
//! use billbuster_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("You are terse.", "test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use billbuster_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Credentials rejected by the provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Drive an HTTP future to completion from synchronous code
///
/// Inside a tokio blocking worker the ambient runtime is reused; outside any
/// runtime a throwaway current-thread runtime is built. Must not be called
/// from an async worker thread.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, LlmError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

/// A call observed by [`MockProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// System instructions passed to the provider
    pub system: String,
    /// Prompt passed to the provider
    pub prompt: String,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail,
}

#[derive(Debug, Default)]
struct MockState {
    scripted: VecDeque<MockReply>,
    rules: Vec<(String, MockReply)>,
    calls: Vec<RecordedCall>,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Replies are chosen in this order:
///
/// 1. the next scripted reply queued with [`MockProvider::push_response`],
/// 2. the first rule whose pattern occurs in the system instructions or prompt,
/// 3. the default response.
///
/// # Examples
///
/// ```
/// use billbuster_llm::MockProvider;
/// use billbuster_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("sys", "any prompt").unwrap(), "Fixed response");
///
/// // Pattern-matched responses
/// let mut provider = MockProvider::default();
/// provider.add_response("tags", "[\"budget\"]");
/// provider.add_response("summary", "A short summary.");
/// assert_eq!(provider.generate("sys", "generate tags").unwrap(), "[\"budget\"]");
/// assert_eq!(provider.generate("sys", "brief summary").unwrap(), "A short summary.");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    model_name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model_name: "mock".to_string(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Set the reported model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return `response` whenever `pattern` occurs in the system instructions or prompt
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        self.state()
            .rules
            .push((pattern.into(), MockReply::Text(response.into())));
    }

    /// Fail whenever `pattern` occurs in the system instructions or prompt
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        self.state().rules.push((pattern.into(), MockReply::Fail));
    }

    /// Queue a one-shot reply, consumed by the next call
    pub fn push_response(&self, response: impl Into<String>) {
        self.state()
            .scripted
            .push_back(MockReply::Text(response.into()));
    }

    /// Queue a one-shot failure, consumed by the next call
    pub fn push_error(&self) {
        self.state().scripted.push_back(MockReply::Fail);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Reset the recorded calls
    pub fn reset_call_count(&self) {
        self.state().calls.clear();
    }

    /// Every call observed so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Number of calls whose system instructions contain `needle`
    pub fn calls_with_system(&self, needle: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.system.contains(needle))
            .count()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, system: &str, prompt: &str) -> Result<String, Self::Error> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        let reply = match state.scripted.pop_front() {
            Some(reply) => reply,
            None => state
                .rules
                .iter()
                .find(|(pattern, _)| system.contains(pattern.as_str()) || prompt.contains(pattern.as_str()))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| MockReply::Text(self.default_response.clone())),
        };

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail => Err(LlmError::Other("Mock error".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
