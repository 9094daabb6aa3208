//! OpenAI-compatible `/v1/images/generations` client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::config::ProviderEntry;
use crate::constants::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_IMAGE_PATH};
use crate::domain::types::ImageData;
use crate::infrastructure::image::traits::ImageClient;
use crate::infrastructure::image::types::{GeneratedImage, ImageRequest};
use crate::infrastructure::model::clients::{AuthScheme, HttpClientBase};
use crate::infrastructure::model::{ModelError, RetryPolicy};

#[derive(Clone)]
pub struct OpenAIImageClient {
    base: HttpClientBase,
    api_path: String,
    response_format: Option<String>,
}

impl OpenAIImageClient {
    pub fn from_config(config: &ProviderEntry) -> Self {
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string());
        Self {
            base: HttpClientBase::new(config.name.clone(), endpoint, config.api_key.clone()),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_IMAGE_PATH.to_string()),
            response_format: config.extra_str("response_format").map(str::to_string),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.base = self.base.with_retry(retry);
        self
    }

    fn payload(&self, request: &ImageRequest) -> Value {
        let mut payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "n": 1,
            "size": request.size,
        });
        if let Some(format) = &self.response_format {
            payload["response_format"] = json!(format);
        }
        payload
    }
}

#[async_trait]
impl ImageClient for OpenAIImageClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ModelError> {
        let url = self.base.build_url(&self.api_path);
        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            size = request.size.as_str(),
            "Requesting image from OpenAI-compatible provider"
        );
        if !request.reference_images.is_empty() {
            info!(
                references = request.reference_images.len(),
                "Reference images are not sent to the generations endpoint"
            );
        }

        let response: ImagesResponse = self
            .base
            .post_json(&url, &self.payload(&request), AuthScheme::Bearer)
            .await?;

        let Some(item) = response.data.into_iter().next() else {
            return Err(ModelError::invalid_response(&self.base.id, "no image in response"));
        };

        if let Some(encoded) = item.b64_json {
            return ImageData::from_base64(&encoded)
                .map(GeneratedImage::from)
                .map_err(|err| ModelError::invalid_response(&self.base.id, err.to_string()));
        }
        if let Some(image_url) = item.url {
            let bytes = self.base.get_bytes(&image_url).await?;
            return Ok(ImageData::sniffed(bytes).into());
        }
        Err(ModelError::invalid_response(&self.base.id, "no image in response"))
    }
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageItem>,
}

#[derive(Deserialize)]
struct ImageItem {
    b64_json: Option<String>,
    url: Option<String>,
}
