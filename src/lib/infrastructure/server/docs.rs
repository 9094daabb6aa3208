use super::dto::{
    ActiveProviderRequest, ConfigResponse, DeleteResponse, ErrorResponse, GeneratePayload,
    GenerateResponse, HealthResponse, HistoryListResponse, OutlineRequest, OutlineResponse,
    RegeneratePayload, RegenerateResponse,
};
use super::routes;
use crate::application::generate::GenerateOutcome;
use crate::application::outline::OutlineResult;
use crate::config::{ProviderCategory, ProviderEntry, ProvidersFile};
use crate::domain::types::{OutlinePage, PageType};
use crate::infrastructure::storage::{
    FailedPage, HistoryRecord, HistorySummary, PageImage, TaskStatus,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_handler,
        routes::outline::outline_handler,
        routes::generate::generate_handler,
        routes::generate::regenerate_handler,
        routes::images::image_handler,
        routes::history::list_handler,
        routes::history::get_handler,
        routes::history::delete_handler,
        routes::config::config_get_handler,
        routes::config::config_active_handler
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            OutlineRequest,
            OutlineResponse,
            OutlineResult,
            OutlinePage,
            PageType,
            GeneratePayload,
            GenerateResponse,
            GenerateOutcome,
            RegeneratePayload,
            RegenerateResponse,
            PageImage,
            FailedPage,
            TaskStatus,
            HistoryRecord,
            HistorySummary,
            HistoryListResponse,
            DeleteResponse,
            ConfigResponse,
            ActiveProviderRequest,
            ProviderCategory,
            ProviderEntry,
            ProvidersFile
        )
    ),
    tags(
        (name = "system", description = "Service status"),
        (name = "generation", description = "Outline and image generation"),
        (name = "images", description = "Generated image files"),
        (name = "history", description = "Past generation tasks"),
        (name = "config", description = "Text and image provider configuration")
    )
)]
pub(super) struct ApiDoc;
