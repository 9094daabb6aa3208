//! Task history stored as one JSON document per task

use super::error::StorageError;
use crate::domain::types::OutlinePage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Outline produced, no images yet
    Draft,
    Generating,
    Completed,
    /// Some pages failed
    Partial,
    Failed,
}

impl TaskStatus {
    /// Status after a run with `succeeded` of `total` pages rendered
    pub fn from_counts(succeeded: usize, total: usize) -> Self {
        if total > 0 && succeeded == total {
            TaskStatus::Completed
        } else if succeeded == 0 {
            TaskStatus::Failed
        } else {
            TaskStatus::Partial
        }
    }
}

/// A rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageImage {
    pub index: usize,
    pub filename: String,
    /// Route the image is served from
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedPage {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRecord {
    pub id: String,
    #[serde(default)]
    pub topic: String,
    /// Raw outline text as returned by the text provider
    #[serde(default)]
    pub outline: String,
    #[serde(default)]
    pub pages: Vec<OutlinePage>,
    #[serde(default)]
    pub images: Vec<PageImage>,
    #[serde(default)]
    pub failed: Vec<FailedPage>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            topic: topic.into(),
            outline: String::new(),
            pages: Vec::new(),
            images: Vec::new(),
            failed: Vec::new(),
            status: TaskStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn image(&self, index: usize) -> Option<&PageImage> {
        self.images.iter().find(|image| image.index == index)
    }

    /// Insert or replace the image for a page and clear its failure.
    pub fn set_image(&mut self, image: PageImage) {
        self.failed.retain(|failed| failed.index != image.index);
        match self.images.iter_mut().find(|i| i.index == image.index) {
            Some(existing) => *existing = image,
            None => {
                self.images.push(image);
                self.images.sort_by_key(|i| i.index);
            }
        }
    }

    /// Drop images of pages the record no longer has and return them.
    pub fn prune_images(&mut self) -> Vec<PageImage> {
        let (kept, orphaned): (Vec<_>, Vec<_>) = std::mem::take(&mut self.images)
            .into_iter()
            .partition(|image| self.pages.iter().any(|page| page.index == image.index));
        self.images = kept;
        orphaned
    }

    /// Recompute the status from the pages that have an image.
    pub fn settle_status(&mut self) -> TaskStatus {
        let rendered = self
            .pages
            .iter()
            .filter(|page| self.image(page.index).is_some())
            .count();
        self.status = TaskStatus::from_counts(rendered, self.pages.len());
        self.status
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            id: self.id.clone(),
            topic: self.topic.clone(),
            status: self.status,
            page_count: self.pages.len(),
            image_count: self.images.len(),
            thumbnail: self.images.first().map(|image| image.url.clone()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistorySummary {
    pub id: String,
    pub topic: String,
    pub status: TaskStatus,
    pub page_count: usize,
    pub image_count: usize,
    /// URL of the first rendered page
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ids are uuid-shaped: ASCII letters, digits and `-` only
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_id(id) {
            return Err(StorageError::invalid(id));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    pub async fn create(&self, record: &HistoryRecord) -> Result<(), StorageError> {
        self.write(record).await?;
        debug!(id = record.id.as_str(), "History record created");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<HistoryRecord, StorageError> {
        let path = self.path_for(id)?;
        let raw = fs::read(&path)
            .await
            .map_err(|e| StorageError::from_read(id, &path, e))?;
        serde_json::from_slice(&raw).map_err(|source| StorageError::Json { path, source })
    }

    /// Like [`HistoryStore::get`] but a missing record is `None`
    pub async fn find(&self, id: &str) -> Result<Option<HistoryRecord>, StorageError> {
        match self.get(id).await {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Persist changes, bumping `updated_at`.
    pub async fn update(&self, record: &mut HistoryRecord) -> Result<(), StorageError> {
        record.updated_at = Utc::now();
        self.write(record).await
    }

    /// Summaries of every record, newest first. Unreadable files are skipped.
    pub async fn list(&self) -> Result<Vec<HistorySummary>, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(&self.dir, err)),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.dir, e))?
        {
            let path = entry.path();
            let Some(id) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(".json"))
            else {
                continue;
            };
            match self.get(id).await {
                Ok(record) => summaries.push(record.summary()),
                Err(err) => warn!(
                    path = %path.display(),
                    error = %err,
                    "Skipping unreadable history record"
                ),
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    /// Remove a record and return it so the caller can clean up its images.
    pub async fn delete(&self, id: &str) -> Result<HistoryRecord, StorageError> {
        let record = self.get(id).await?;
        let path = self.path_for(id)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::from_read(id, &path, e))?;
        debug!(id, "History record deleted");
        Ok(record)
    }

    async fn write(&self, record: &HistoryRecord) -> Result<(), StorageError> {
        let path = self.path_for(&record.id)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(&self.dir, e))?;
        let body = serde_json::to_vec_pretty(record).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, body)
            .await
            .map_err(|e| StorageError::io(&path, e))
    }
}
