//! Gemini client implementation

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::base::{AuthScheme, HttpClientBase};
use crate::config::ProviderEntry;
use crate::constants::{DEFAULT_GEMINI_API_PATH, DEFAULT_GEMINI_ENDPOINT};
use crate::domain::types::ImageData;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::retry::RetryPolicy;
use crate::infrastructure::model::traits::TextClient;
use crate::infrastructure::model::types::{ModelError, TextRequest};

/// Gemini client for Google AI text generation
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    api_path: String,
}

impl GeminiClient {
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
}

pub(crate) fn gemini_base(config: &ProviderEntry) -> HttpClientBase {
    let endpoint = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string());
    HttpClientBase::new(config.name.clone(), endpoint, config.api_key.clone())
}

pub(crate) fn gemini_api_path(config: &ProviderEntry) -> String {
    config
        .api_path
        .clone()
        .unwrap_or_else(|| DEFAULT_GEMINI_API_PATH.to_string())
        .trim_matches('/')
        .to_string()
}

/// `{endpoint}/{api_path}/{model}:generateContent`
pub(crate) fn generate_content_url(base: &HttpClientBase, api_path: &str, model: &str) -> String {
    base.build_url(&format!("{api_path}/{model}:generateContent"))
}

#[async_trait]
impl TextClient for GeminiClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn generate(&self, request: TextRequest) -> Result<String, ModelError> {
        let url = generate_content_url(&self.base, &self.api_path, &request.model);
        let (system_text, contents) = MessageAdapter::to_gemini_format(&request.messages);

        let mut payload = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_output_tokens
            }
        });

        if let Some(system) = system_text {
            payload["system_instruction"] = json!({
                "parts": [{"text": system}]
            });
        }

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self
            .base
            .post_json(&url, &payload, AuthScheme::GoogleApiKey)
            .await?;
        debug!("Received response from Gemini");

        response
            .text()
            .ok_or_else(|| {
                ModelError::invalid_response(&self.base.id, response.missing_reason("text"))
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType", alias = "mime_type", default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    fn parts(&self) -> impl Iterator<Item = &GeminiPart> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Non-thought text of the first candidate that has any
    pub(crate) fn text(&self) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            let text: String = candidate
                .content
                .as_ref()?
                .parts
                .iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text.as_deref())
                .collect();
            Some(text).filter(|t| !t.trim().is_empty())
        })
    }

    /// First inline image in the response
    pub(crate) fn image(&self) -> Option<Result<ImageData, base64::DecodeError>> {
        self.parts().find_map(|part| part.inline_data.as_ref()).map(|inline| {
            let bytes = STANDARD.decode(inline.data.trim())?;
            Ok(match inline.mime_type.as_deref() {
                Some(mime) if !mime.is_empty() => ImageData::new(mime, bytes),
                _ => ImageData::sniffed(bytes),
            })
        })
    }

    pub(crate) fn missing_reason(&self, what: &str) -> String {
        match self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            Some(reason) => format!("request blocked: {reason}"),
            None => format!("no {what} in response"),
        }
    }
}
