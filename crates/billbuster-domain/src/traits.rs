//! Trait definitions for external interactions
//!
//! These traits define the boundary between the pipeline and the services
//! it calls. Implementations live in other crates.

/// Trait for the point extraction service
///
/// Implemented by the infrastructure layer (billbuster-llm). Calls are
/// synchronous; async callers run them on a blocking worker.
pub trait LlmProvider {
    /// Error type for provider operations
    type Error;

    /// Generate a completion for `prompt` under the given system instructions
    fn generate(&self, system: &str, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model behind this provider, for logs and results
    fn model_name(&self) -> &str {
        "llm"
    }
}

impl<P> LlmProvider for Box<P>
where
    P: LlmProvider + ?Sized,
{
    type Error = P::Error;

    fn generate(&self, system: &str, prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(system, prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
