//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::{AuthScheme, HttpClientBase};
use crate::config::ProviderEntry;
use crate::constants::{DEFAULT_OPENAI_CHAT_PATH, DEFAULT_OPENAI_ENDPOINT};
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::retry::RetryPolicy;
use crate::infrastructure::model::traits::TextClient;
use crate::infrastructure::model::types::{ModelError, TextRequest};

/// OpenAI-compatible client (works with OpenAI and any proxy exposing
/// `/v1/chat/completions`)
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
}

impl OpenAIClient {
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
                .unwrap_or_else(|| DEFAULT_OPENAI_CHAT_PATH.to_string()),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.base = self.base.with_retry(retry);
        self
    }
}

#[async_trait]
impl TextClient for OpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn generate(&self, request: TextRequest) -> Result<String, ModelError> {
        let url = self.base.build_url(&self.api_path);

        let payload = OpenAIRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self
            .base
            .post_json(&url, &payload, AuthScheme::Bearer)
            .await?;
        debug!("Received response from OpenAI-compatible provider");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing content"))
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}
