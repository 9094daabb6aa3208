use super::dto::ErrorResponse;
use crate::application::generate::GenerateError;
use crate::application::outline::OutlineError;
use crate::config::ConfigError;
use crate::infrastructure::storage::StorageError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
}

/// A body that is not JSON or does not match the request type
pub fn from_rejection(rejection: JsonRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

pub fn from_config(err: &ConfigError) -> ApiError {
    let status = match err {
        ConfigError::UnknownProvider { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.user_message())
}

pub fn from_storage(err: &StorageError) -> ApiError {
    let status = match err {
        StorageError::InvalidName { .. } => StatusCode::BAD_REQUEST,
        StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

pub fn from_outline(err: &OutlineError) -> ApiError {
    match err {
        OutlineError::EmptyTopic => api_error(StatusCode::BAD_REQUEST, err.user_message()),
        OutlineError::Config(inner) => from_config(inner),
        OutlineError::Model(_) => api_error(StatusCode::BAD_GATEWAY, err.user_message()),
        OutlineError::Storage(inner) => from_storage(inner),
    }
}

pub fn from_generate(err: &GenerateError) -> ApiError {
    match err {
        GenerateError::NoPages
        | GenerateError::DuplicatePage(_)
        | GenerateError::InvalidTaskId(_) => {
            api_error(StatusCode::BAD_REQUEST, err.user_message())
        }
        GenerateError::TaskNotFound(_) => api_error(StatusCode::NOT_FOUND, err.user_message()),
        GenerateError::Config(inner) => from_config(inner),
        GenerateError::Model(_) => api_error(StatusCode::BAD_GATEWAY, err.user_message()),
        GenerateError::Storage(inner) => from_storage(inner),
    }
}
