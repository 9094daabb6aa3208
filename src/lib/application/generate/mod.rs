//! Image generation for outline pages
//!
//! Cover pages render first. The first cover image is then attached as a
//! style reference to every other page so the post looks consistent.

mod errors;
mod renderer;

pub use errors::GenerateError;
pub use renderer::image_url;

use crate::application::prompts::PromptTemplates;
use crate::config::{AppSettings, ProviderEntry};
use crate::constants::{
    DEFAULT_ASPECT_RATIO, DEFAULT_GEMINI_IMAGE_MODEL, DEFAULT_IMAGE_SIZE,
    DEFAULT_OPENAI_IMAGE_MODEL, MAX_CONCURRENT_PAGES,
};
use crate::domain::types::{ImageData, OutlinePage, PageType};
use crate::infrastructure::image::ImageClientFactory;
use crate::infrastructure::model::RetryPolicy;
use crate::infrastructure::storage::{
    FailedPage, HistoryRecord, HistoryStore, OutputStore, PageImage, TaskStatus, is_valid_id,
};
use futures::StreamExt;
use futures::stream;
use renderer::{PageRenderer, RenderedPage};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub pages: Vec<OutlinePage>,
    /// Existing task (usually the outline's record id); a new id is
    /// assigned when absent
    pub task_id: Option<String>,
    pub full_outline: Option<String>,
    pub topic: Option<String>,
    pub reference_images: Vec<ImageData>,
}

#[derive(Debug, Clone)]
pub struct RegenerateRequest {
    pub task_id: String,
    pub page: OutlinePage,
    pub full_outline: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateOutcome {
    pub task_id: String,
    /// Rendered pages ordered by index
    pub images: Vec<PageImage>,
    pub failed: Vec<FailedPage>,
    pub total: usize,
    pub status: TaskStatus,
}

#[derive(Clone)]
pub struct GenerationService {
    settings: Arc<AppSettings>,
    prompts: Arc<PromptTemplates>,
    history: HistoryStore,
    output: OutputStore,
    retry: RetryPolicy,
}

impl GenerationService {
    pub fn new(settings: Arc<AppSettings>, prompts: Arc<PromptTemplates>) -> Self {
        let history = HistoryStore::new(settings.history_dir.clone());
        let output = OutputStore::new(settings.output_dir.clone());
        Self {
            settings,
            prompts,
            history,
            output,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateOutcome, GenerateError> {
        if request.pages.is_empty() {
            return Err(GenerateError::NoPages);
        }
        let mut seen = HashSet::new();
        if let Some(page) = request.pages.iter().find(|page| !seen.insert(page.index)) {
            return Err(GenerateError::DuplicatePage(page.index));
        }
        let task_id = match request.task_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => validated_id(id)?,
            _ => Uuid::new_v4().to_string(),
        };

        let providers = self.settings.image_providers()?;
        let provider = providers.active()?;
        provider.require_api_key()?;

        let mut record = match self.history.find(&task_id).await? {
            Some(record) => record,
            None => HistoryRecord::new(task_id.clone(), request.topic.clone().unwrap_or_default()),
        };
        if let Some(topic) = request.topic.as_deref().filter(|t| !t.trim().is_empty()) {
            record.topic = topic.trim().to_string();
        }
        if let Some(outline) = request.full_outline.as_deref().filter(|o| !o.trim().is_empty()) {
            record.outline = outline.to_string();
        }
        record.pages = request.pages.clone();
        record.failed.clear();
        // Every page is rendered again; old images only count if they come back.
        let previous = std::mem::take(&mut record.images);
        record.status = TaskStatus::Generating;
        self.history.update(&mut record).await?;

        let full_outline = outline_text(&record.outline, &record.pages);
        let client = ImageClientFactory::create_with(provider, self.retry);
        let settings = ImageSettings::from_entry(provider);
        let renderer = PageRenderer {
            client: client.as_ref(),
            store: &self.output,
            prompts: &self.prompts,
            task_id: &task_id,
            topic: &record.topic,
            full_outline: &full_outline,
            model: &settings.model,
            aspect_ratio: &settings.aspect_ratio,
            size: &settings.size,
        };

        info!(
            task_id = task_id.as_str(),
            provider = provider.name.as_str(),
            pages = request.pages.len(),
            high_concurrency = provider.high_concurrency,
            "Starting image generation"
        );

        let (covers, others): (Vec<&OutlinePage>, Vec<&OutlinePage>) = request
            .pages
            .iter()
            .partition(|page| page.page_type == PageType::Cover);

        let mut results = Vec::with_capacity(request.pages.len());
        let mut references = request.reference_images.clone();
        let mut cover_image = None;

        for page in covers {
            let result = renderer.render(page, &references).await;
            if cover_image.is_none() {
                if let Ok(rendered) = &result {
                    cover_image = Some(rendered.image.clone());
                }
            }
            results.push((page.index, result));
        }
        if let Some(cover) = cover_image {
            references.push(cover);
        }

        if provider.high_concurrency {
            let renderer = &renderer;
            let references = &references;
            let rendered: Vec<_> = stream::iter(others.into_iter().cloned())
                .map(move |page: OutlinePage| async move {
                    let result = renderer.render(&page, references).await;
                    (page.index, result)
                })
                .buffer_unordered(MAX_CONCURRENT_PAGES)
                .collect()
                .await;
            results.extend(rendered);
        } else {
            for page in others {
                results.push((page.index, renderer.render(page, &references).await));
            }
        }

        let total = request.pages.len();
        let mut images = Vec::new();
        let mut failed = Vec::new();
        for (index, result) in results {
            match result {
                Ok(RenderedPage { page, .. }) => images.push(page),
                Err(err) => failed.push(FailedPage {
                    index,
                    error: err.user_message(),
                }),
            }
        }
        images.sort_by_key(|image| image.index);
        failed.sort_by_key(|failure| failure.index);

        for image in &images {
            record.set_image(image.clone());
        }
        record.failed = failed.clone();
        let status = record.settle_status();
        self.history.update(&mut record).await?;
        self.remove_stale(&previous, &record.images).await;

        info!(
            task_id = task_id.as_str(),
            succeeded = images.len(),
            failed = failed.len(),
            status = ?status,
            "Image generation finished"
        );

        Ok(GenerateOutcome {
            task_id,
            images,
            failed,
            total,
            status,
        })
    }

    /// Render one page again and patch the task record.
    pub async fn regenerate(&self, request: RegenerateRequest) -> Result<PageImage, GenerateError> {
        let task_id = validated_id(request.task_id.trim())?;
        let mut record = self
            .history
            .find(&task_id)
            .await?
            .ok_or_else(|| GenerateError::TaskNotFound(task_id.clone()))?;

        let providers = self.settings.image_providers()?;
        let provider = providers.active()?;
        provider.require_api_key()?;

        if let Some(topic) = request.topic.as_deref().filter(|t| !t.trim().is_empty()) {
            record.topic = topic.trim().to_string();
        }
        if let Some(outline) = request.full_outline.as_deref().filter(|o| !o.trim().is_empty()) {
            record.outline = outline.to_string();
        }
        match record.pages.iter_mut().find(|p| p.index == request.page.index) {
            Some(existing) => *existing = request.page.clone(),
            None => {
                record.pages.push(request.page.clone());
                record.pages.sort_by_key(|p| p.index);
            }
        }

        let references = match self.cover_reference(&record, request.page.index).await {
            Some(cover) => vec![cover],
            None => Vec::new(),
        };

        let full_outline = outline_text(&record.outline, &record.pages);
        let client = ImageClientFactory::create_with(provider, self.retry);
        let settings = ImageSettings::from_entry(provider);
        let renderer = PageRenderer {
            client: client.as_ref(),
            store: &self.output,
            prompts: &self.prompts,
            task_id: &task_id,
            topic: &record.topic,
            full_outline: &full_outline,
            model: &settings.model,
            aspect_ratio: &settings.aspect_ratio,
            size: &settings.size,
        };

        info!(
            task_id = task_id.as_str(),
            index = request.page.index,
            provider = provider.name.as_str(),
            "Regenerating page"
        );
        let rendered = renderer.render(&request.page, &references).await?;

        record.set_image(rendered.page.clone());
        let orphaned = record.prune_images();
        record.settle_status();
        self.history.update(&mut record).await?;
        self.remove_stale(&orphaned, &record.images).await;
        Ok(rendered.page)
    }

    /// Delete files of `previous` images the record no longer references.
    async fn remove_stale(&self, previous: &[PageImage], current: &[PageImage]) {
        for image in previous {
            if current.iter().any(|kept| kept.filename == image.filename) {
                continue;
            }
            if let Err(err) = self.output.remove(&image.filename).await {
                warn!(
                    filename = image.filename.as_str(),
                    error = %err,
                    "Failed to remove stale image"
                );
            }
        }
    }

    /// Stored image of the task's cover, unless `index` is the cover itself
    async fn cover_reference(&self, record: &HistoryRecord, index: usize) -> Option<ImageData> {
        let cover = record
            .pages
            .iter()
            .find(|page| page.page_type == PageType::Cover && page.index != index)?;
        let image = record.image(cover.index)?;
        match self.output.read_image(&image.filename).await {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(
                    filename = image.filename.as_str(),
                    error = %err,
                    "Cover image unavailable, regenerating without reference"
                );
                None
            }
        }
    }
}

/// Model and image shape resolved from the provider entry
struct ImageSettings {
    model: String,
    aspect_ratio: String,
    size: String,
}

impl ImageSettings {
    fn from_entry(entry: &ProviderEntry) -> Self {
        let default_model = if entry.is_gemini() {
            DEFAULT_GEMINI_IMAGE_MODEL
        } else {
            DEFAULT_OPENAI_IMAGE_MODEL
        };
        Self {
            model: entry
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            aspect_ratio: entry
                .aspect_ratio
                .clone()
                .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string()),
            size: entry
                .size
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
        }
    }
}

fn validated_id(id: &str) -> Result<String, GenerateError> {
    if is_valid_id(id) {
        Ok(id.to_string())
    } else {
        Err(GenerateError::InvalidTaskId(id.to_string()))
    }
}

/// Outline text for prompts, rebuilt from pages when none was stored
fn outline_text(outline: &str, pages: &[OutlinePage]) -> String {
    if !outline.trim().is_empty() {
        return outline.to_string();
    }
    pages
        .iter()
        .map(|page| page.content.as_str())
        .collect::<Vec<_>>()
        .join("\n<page>\n")
}
