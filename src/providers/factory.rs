// Provider factory - builds the configured backend

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use super::{LlmProvider, NullProvider, OllamaProvider};
use crate::config::BackendConfig;
use crate::errors::AtlesError;

/// Create the provider named in `config.provider`
pub fn create_provider(config: &BackendConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = OllamaProvider::new(
                config.base_url.clone(),
                config.model.clone(),
                Duration::from_secs(config.timeout_seconds),
            )?;
            tracing::info!("Using Ollama backend at {} ({})", provider.base_url(), config.model);
            Ok(Arc::new(provider))
        }
        "none" => {
            tracing::info!("No backend configured, using null provider");
            Ok(Arc::new(NullProvider))
        }
        other => Err(AtlesError::config(format!("Unknown backend provider '{}'", other)).into()),
    }
}
