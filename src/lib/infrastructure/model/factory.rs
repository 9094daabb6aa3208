//! Provider factory - creates text clients from config

use super::clients::{GeminiClient, OpenAIClient};
use super::retry::RetryPolicy;
use super::traits::TextClient;
use crate::config::{ProviderEntry, ProviderKind};

/// Factory for creating text clients from a provider entry.
pub struct TextClientFactory;

impl TextClientFactory {
    /// Creates a text client based on provider type.
    ///
    /// Supported types:
    /// - `google_gemini`, `gemini`, `google` → Gemini format
    /// - Others → OpenAI-compatible format (default)
    pub fn create(config: &ProviderEntry) -> Box<dyn TextClient> {
        Self::create_with(config, RetryPolicy::default())
    }

    pub fn create_with(config: &ProviderEntry, retry: RetryPolicy) -> Box<dyn TextClient> {
        match config.kind() {
            ProviderKind::GoogleGemini => {
                Box::new(GeminiClient::from_config(config).with_retry(retry))
            }
            ProviderKind::OpenAiCompatible => {
                Box::new(OpenAIClient::from_config(config).with_retry(retry))
            }
        }
    }
}
