use super::super::dto::{
    ErrorResponse, GeneratePayload, GenerateResponse, RegeneratePayload, RegenerateResponse,
    decode_images,
};
use super::super::error::{ApiError, api_error, from_generate, from_rejection};
use super::super::state::ServerState;
use crate::application::generate::{GenerateRequest, RegenerateRequest};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "generation",
    request_body = GeneratePayload,
    responses(
        (status = 200, description = "Pages rendered; failed pages are listed", body = GenerateResponse),
        (status = 400, description = "Invalid body, pages, task id or image", body = ErrorResponse),
        (status = 500, description = "Provider configuration problem", body = ErrorResponse)
    )
)]
pub async fn generate_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<GeneratePayload>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(payload) = payload.map_err(from_rejection)?;
    info!(
        pages = payload.pages.len(),
        task_id = payload.task_id.as_deref(),
        references = payload.reference_images.len(),
        "Received /api/generate request"
    );

    let reference_images = decode_images(&payload.reference_images)
        .map_err(|message| api_error(StatusCode::BAD_REQUEST, message))?;
    let request = GenerateRequest {
        pages: payload.pages,
        task_id: payload.task_id,
        full_outline: payload.full_outline,
        topic: payload.topic,
        reference_images,
    };

    match state.generation().generate(request).await {
        Ok(outcome) => Ok(Json(GenerateResponse {
            success: true,
            outcome,
        })),
        Err(err) => {
            error!(error = %err, "Image generation failed");
            Err(from_generate(&err))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/regenerate",
    tag = "generation",
    request_body = RegeneratePayload,
    responses(
        (status = 200, description = "Page rendered again", body = RegenerateResponse),
        (status = 400, description = "Invalid body or task id", body = ErrorResponse),
        (status = 404, description = "Unknown task", body = ErrorResponse),
        (status = 502, description = "Image provider failed", body = ErrorResponse)
    )
)]
pub async fn regenerate_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RegeneratePayload>, JsonRejection>,
) -> Result<Json<RegenerateResponse>, ApiError> {
    let Json(payload) = payload.map_err(from_rejection)?;
    info!(
        task_id = payload.task_id.as_str(),
        index = payload.page.index,
        "Received /api/regenerate request"
    );

    let request = RegenerateRequest {
        task_id: payload.task_id,
        page: payload.page,
        full_outline: payload.full_outline,
        topic: payload.topic,
    };
    match state.generation().regenerate(request).await {
        Ok(image) => Ok(Json(RegenerateResponse {
            success: true,
            image,
        })),
        Err(err) => {
            error!(error = %err, "Page regeneration failed");
            Err(from_generate(&err))
        }
    }
}
