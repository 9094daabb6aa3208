//! Image generation providers
//!
//! Mirrors the text model layout: a trait, per-provider clients and a
//! factory. HTTP plumbing, retries and errors are shared with
//! [`crate::infrastructure::model`].

pub mod clients;
pub mod traits;
pub mod types;

use crate::config::{ProviderEntry, ProviderKind};
use crate::infrastructure::model::RetryPolicy;
use clients::{GeminiImageClient, OpenAIImageClient};

pub use traits::ImageClient;
pub use types::{GeneratedImage, ImageRequest};

/// Factory for creating image clients from a provider entry.
pub struct ImageClientFactory;

impl ImageClientFactory {
    pub fn create(config: &ProviderEntry) -> Box<dyn ImageClient> {
        Self::create_with(config, RetryPolicy::default())
    }

    pub fn create_with(config: &ProviderEntry, retry: RetryPolicy) -> Box<dyn ImageClient> {
        match config.kind() {
            ProviderKind::GoogleGemini => {
                Box::new(GeminiImageClient::from_config(config).with_retry(retry))
            }
            ProviderKind::OpenAiCompatible => {
                Box::new(OpenAIImageClient::from_config(config).with_retry(retry))
            }
        }
    }
}
