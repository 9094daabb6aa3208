//! Model traits

use super::types::{ModelError, TextRequest};
use async_trait::async_trait;

/// Trait for text generation clients
#[async_trait]
pub trait TextClient: Send + Sync {
    /// Name of the provider entry backing this client
    fn id(&self) -> &str;

    /// Generate text for the request
    async fn generate(&self, request: TextRequest) -> Result<String, ModelError>;
}
