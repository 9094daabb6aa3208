use super::types::{GeneratedImage, ImageRequest};
use crate::infrastructure::model::ModelError;
use async_trait::async_trait;

/// Trait for image generation clients
#[async_trait]
pub trait ImageClient: Send + Sync {
    fn id(&self) -> &str;

    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ModelError>;
}
