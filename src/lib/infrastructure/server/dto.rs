use crate::application::generate::GenerateOutcome;
use crate::application::outline::OutlineResult;
use crate::config::{ProviderCategory, ProvidersFile};
use crate::domain::types::{ImageData, OutlinePage};
use crate::infrastructure::storage::{HistorySummary, PageImage};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OutlineRequest {
    pub topic: String,
    /// Reference images as base64 or `data:` URLs
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutlineResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: OutlineResult,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePayload {
    pub pages: Vec<OutlinePage>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub full_outline: Option<String>,
    #[serde(default, alias = "user_topic")]
    pub topic: Option<String>,
    /// Style references as base64 or `data:` URLs
    #[serde(default, alias = "user_images")]
    pub reference_images: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: GenerateOutcome,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegeneratePayload {
    pub task_id: String,
    pub page: OutlinePage,
    #[serde(default)]
    pub full_outline: Option<String>,
    #[serde(default, alias = "user_topic")]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegenerateResponse {
    pub success: bool,
    pub image: PageImage,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryListResponse {
    pub records: Vec<HistorySummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
    pub removed_images: usize,
}

/// Both provider files with API keys masked
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    pub text: ProvidersFile,
    pub image: ProvidersFile,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActiveProviderRequest {
    pub category: ProviderCategory,
    pub provider: String,
}

/// Decode request images, reporting the first bad one by position.
pub fn decode_images(raw: &[String]) -> Result<Vec<ImageData>, String> {
    raw.iter()
        .enumerate()
        .map(|(position, encoded)| {
            ImageData::from_base64(encoded)
                .map_err(|err| format!("image {} is not valid: {err}", position + 1))
        })
        .collect()
}
