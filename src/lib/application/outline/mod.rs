//! Outline generation
//!
//! Turns a topic (and optional reference images) into a page-by-page
//! outline using the configured text provider.

mod errors;
mod parser;

pub use errors::OutlineError;
pub use parser::parse_outline;

use crate::application::prompts::PromptTemplates;
use crate::config::AppSettings;
use crate::constants::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TEXT_MODEL};
use crate::domain::types::{ChatMessage, ImageData, MessageRole, OutlinePage};
use crate::infrastructure::model::{RetryPolicy, TextClientFactory, TextRequest};
use crate::infrastructure::storage::{HistoryRecord, HistoryStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutlineResult {
    /// History record created for this outline; pass it as `task_id` to
    /// `/api/generate`
    pub record_id: String,
    pub outline: String,
    pub pages: Vec<OutlinePage>,
    pub has_images: bool,
    /// Text provider that produced the outline
    pub provider: String,
}

#[derive(Clone)]
pub struct OutlineService {
    settings: Arc<AppSettings>,
    prompts: Arc<PromptTemplates>,
    history: HistoryStore,
    retry: RetryPolicy,
}

impl OutlineService {
    pub fn new(settings: Arc<AppSettings>, prompts: Arc<PromptTemplates>) -> Self {
        let history = HistoryStore::new(settings.history_dir.clone());
        Self {
            settings,
            prompts,
            history,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn generate_outline(
        &self,
        topic: &str,
        images: Vec<ImageData>,
    ) -> Result<OutlineResult, OutlineError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(OutlineError::EmptyTopic);
        }
        let has_images = !images.is_empty();
        info!(
            topic = truncate(topic, 50),
            images = images.len(),
            "Generating outline"
        );

        let providers = self.settings.text_providers()?;
        let provider = providers.select(has_images)?;
        provider.require_api_key()?;
        info!(
            provider = provider.name.as_str(),
            provider_type = provider.provider_type.as_str(),
            supports_images = provider.supports_images,
            "Using text provider"
        );

        let mut prompt = self.prompts.outline_prompt(topic);
        if has_images {
            prompt.push_str(&format!(
                "\n\nNote: the user attached {} reference image(s). Take their content and \
                 style into account and make the outline relate to what they show; they may \
                 be product shots, personal photos or scenes.",
                images.len()
            ));
        }

        let request = TextRequest {
            model: provider
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            messages: vec![ChatMessage::with_images(MessageRole::User, prompt, images)],
            temperature: provider.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: provider
                .max_output_tokens
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        };

        let client = TextClientFactory::create_with(provider, self.retry);
        let outline = client.generate(request).await?;
        debug!(chars = outline.chars().count(), "Outline text received");

        let pages = parse_outline(&outline);
        info!(pages = pages.len(), "Outline parsed");

        let mut record = HistoryRecord::new(Uuid::new_v4().to_string(), topic);
        record.outline = outline.clone();
        record.pages = pages.clone();
        self.history.create(&record).await?;

        Ok(OutlineResult {
            record_id: record.id,
            outline,
            pages,
            has_images,
            provider: client.id().to_string(),
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
