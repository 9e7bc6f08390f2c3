// Language-model backends
//
// The guard never depends on a concrete server: anything that can turn a
// prompt into text implements LlmProvider. NullProvider stands in when no
// backend is configured.

use anyhow::Result;
use async_trait::async_trait;

pub mod factory;
pub mod ollama;

pub use factory::create_provider;
pub use ollama::OllamaProvider;

/// Trait for LLM backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a complete (non-streaming) response for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name (e.g., "ollama", "none")
    fn name(&self) -> &str;

    /// Model used when generating
    fn model(&self) -> &str;
}

/// Notice returned by [`NullProvider`]
pub const NO_BACKEND_NOTICE: &str =
    "No language model backend is configured; only truth-seeking checks are available.";

/// Backend used when none is configured. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

#[async_trait]
impl LlmProvider for NullProvider {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(NO_BACKEND_NOTICE.to_string())
    }

    fn name(&self) -> &str {
        "none"
    }

    fn model(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_provider() {
        let provider = NullProvider;
        assert_eq!(provider.generate("anything").await.unwrap(), NO_BACKEND_NOTICE);
        assert_eq!(provider.name(), "none");
    }
}
