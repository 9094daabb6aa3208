use super::super::dto::ErrorResponse;
use super::super::error::{ApiError, from_storage};
use super::super::state::ServerState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/api/images/{filename}",
    tag = "images",
    params(("filename" = String, Path, description = "Generated image file name")),
    responses(
        (status = 200, description = "Image bytes with a guessed content type"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "No such image", body = ErrorResponse)
    )
)]
pub async fn image_handler(
    State(state): State<Arc<ServerState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (bytes, mime) = state.output().read(&filename).await.map_err(|err| {
        debug!(filename = filename.as_str(), error = %err, "Image lookup failed");
        from_storage(&err)
    })?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
