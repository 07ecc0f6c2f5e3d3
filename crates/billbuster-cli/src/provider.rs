//! Extraction service selection.

use crate::config::{LlmSettings, ProviderKind};
use crate::error::{CliError, Result};
use billbuster_domain::traits::LlmProvider;
use billbuster_extractor::{EXTRACTION_SYSTEM_PROMPT, TAGS_SYSTEM_PROMPT};
use billbuster_llm::{LlmError, MockProvider, OllamaProvider, OpenAiProvider};

/// Model used with Ollama when none is configured
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Reply of the mock provider to summary requests
pub const MOCK_SUMMARY: &str = "No summary available (mock provider).";

/// Any configured extraction service
pub type DynProvider = Box<dyn LlmProvider<Error = LlmError> + Send + Sync>;

/// Build the provider described by `settings`.
pub fn build_provider(settings: &LlmSettings) -> Result<DynProvider> {
    match settings.provider {
        ProviderKind::Mock => Ok(Box::new(mock_provider())),
        ProviderKind::Ollama => {
            let model = settings.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            let endpoint = settings
                .endpoint
                .as_deref()
                .unwrap_or(billbuster_llm::ollama::DEFAULT_ENDPOINT);
            Ok(Box::new(
                OllamaProvider::new(endpoint, model).with_temperature(settings.temperature),
            ))
        }
        ProviderKind::Openai => {
            let api_key = settings
                .api_key
                .as_deref()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    CliError::Provider("OPENAI_API_KEY is not set and [llm] api_key is empty".into())
                })?;
            let model = settings
                .model
                .as_deref()
                .unwrap_or(billbuster_llm::openai::DEFAULT_MODEL);
            let mut provider = OpenAiProvider::new(api_key, model).with_temperature(settings.temperature);
            if let Some(endpoint) = &settings.endpoint {
                provider = provider.with_endpoint(endpoint.as_str());
            }
            Ok(Box::new(provider))
        }
    }
}

/// Offline provider: no points, a fixed summary and no tags.
///
/// Lets a document run end to end without a model, e.g. to check
/// chunking and output files.
fn mock_provider() -> MockProvider {
    let mut mock = MockProvider::new(MOCK_SUMMARY).with_model_name("mock");
    mock.add_response(EXTRACTION_SYSTEM_PROMPT, "[]");
    mock.add_response(TAGS_SYSTEM_PROMPT, "[]");
    mock
}
