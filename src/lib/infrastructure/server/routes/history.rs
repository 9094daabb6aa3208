use super::super::dto::{DeleteResponse, ErrorResponse, HistoryListResponse};
use super::super::error::{ApiError, from_storage};
use super::super::state::ServerState;
use crate::infrastructure::storage::HistoryRecord;
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::{info, warn};

#[utoipa::path(
    get,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "Task summaries, newest first", body = HistoryListResponse),
        (status = 500, description = "History directory unreadable", body = ErrorResponse)
    )
)]
pub async fn list_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<HistoryListResponse>, ApiError> {
    let records = state
        .history()
        .list()
        .await
        .map_err(|err| from_storage(&err))?;
    Ok(Json(HistoryListResponse { records }))
}

#[utoipa::path(
    get,
    path = "/api/history/{id}",
    tag = "history",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Full task record", body = HistoryRecord),
        (status = 404, description = "Unknown task", body = ErrorResponse)
    )
)]
pub async fn get_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<HistoryRecord>, ApiError> {
    state
        .history()
        .get(&id)
        .await
        .map(Json)
        .map_err(|err| from_storage(&err))
}

#[utoipa::path(
    delete,
    path = "/api/history/{id}",
    tag = "history",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task and its images removed", body = DeleteResponse),
        (status = 404, description = "Unknown task", body = ErrorResponse)
    )
)]
pub async fn delete_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let record = state
        .history()
        .delete(&id)
        .await
        .map_err(|err| from_storage(&err))?;

    let mut removed_images = 0;
    for image in &record.images {
        match state.output().remove(&image.filename).await {
            Ok(()) => removed_images += 1,
            Err(err) => warn!(
                filename = image.filename.as_str(),
                error = %err,
                "Failed to remove image"
            ),
        }
    }
    info!(id = id.as_str(), removed_images, "Deleted history record");

    Ok(Json(DeleteResponse {
        success: true,
        id,
        removed_images,
    }))
}
