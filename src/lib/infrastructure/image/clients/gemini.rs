//! Gemini image generation through `generateContent`

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::ProviderEntry;
use crate::infrastructure::image::traits::ImageClient;
use crate::infrastructure::image::types::{GeneratedImage, ImageRequest};
use crate::infrastructure::model::adapter::gemini_inline_image;
use crate::infrastructure::model::clients::gemini::{
    GeminiResponse, gemini_api_path, gemini_base, generate_content_url,
};
use crate::infrastructure::model::clients::{AuthScheme, HttpClientBase};
use crate::infrastructure::model::{ModelError, RetryPolicy};

#[derive(Clone)]
pub struct GeminiImageClient {
    base: HttpClientBase,
    api_path: String,
}

impl GeminiImageClient {
    pub fn from_config(config: &ProviderEntry) -> Self {
        Self {
            base: gemini_base(config),
            api_path: gemini_api_path(config),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.base = self.base.with_retry(retry);
        self
    }

    fn payload(request: &ImageRequest) -> Value {
        let mut parts = vec![json!({ "text": request.prompt })];
        parts.extend(request.reference_images.iter().map(gemini_inline_image));

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "imageConfig": { "aspectRatio": request.aspect_ratio }
            }
        })
    }
}

#[async_trait]
impl ImageClient for GeminiImageClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ModelError> {
        let url = generate_content_url(&self.base, &self.api_path, &request.model);
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            references = request.reference_images.len(),
            aspect_ratio = request.aspect_ratio.as_str(),
            "Requesting image from Gemini"
        );

        let response: GeminiResponse = self
            .base
            .post_json(&url, &Self::payload(&request), AuthScheme::GoogleApiKey)
            .await?;

        match response.image() {
            Some(Ok(image)) => {
                debug!(
                    bytes = image.bytes.len(),
                    mime = image.mime_type.as_str(),
                    "Image received"
                );
                Ok(image.into())
            }
            Some(Err(err)) => Err(ModelError::invalid_response(
                &self.base.id,
                format!("image data is not valid base64: {err}"),
            )),
            None => Err(ModelError::invalid_response(
                &self.base.id,
                response.missing_reason("image"),
            )),
        }
    }
}
