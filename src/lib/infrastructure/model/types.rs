//! Model types - Request and Error types

use crate::domain::types::ChatMessage;
use reqwest::StatusCode;
use thiserror::Error;

/// Text generation request
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Coarse classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Authentication,
    ModelNotFound,
    Network,
    RateLimited,
    Other,
}

/// Errors raised while talking to a text or image provider
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: StatusCode,
        body: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("provider '{provider}' still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        provider: String,
        attempts: u32,
        #[source]
        last: Box<ModelError>,
    },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn status(
        provider: impl Into<String>,
        status: StatusCode,
        body: impl Into<String>,
    ) -> Self {
        Self::Status {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn retries_exhausted(provider: impl Into<String>, attempts: u32, last: ModelError) -> Self {
        Self::RetriesExhausted {
            provider: provider.into(),
            attempts,
            last: Box::new(last),
        }
    }

    /// HTTP status returned by the provider, if any
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            ModelError::Status { status, .. } => Some(*status),
            ModelError::Network { source, .. } => source.status(),
            ModelError::RetriesExhausted { last, .. } => last.http_status(),
            _ => None,
        }
    }

    /// Whether the failure is a rate limit worth retrying
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ModelError::Status { status, body, .. } => {
                if *status == StatusCode::TOO_MANY_REQUESTS {
                    return true;
                }
                let body = body.to_lowercase();
                body.contains("rate limit")
                    || body.contains("rate_limit")
                    || body.contains("ratelimit")
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ModelError::MissingApiKey { .. } => FailureKind::Authentication,
            ModelError::RetriesExhausted { last, .. } => last.kind(),
            ModelError::Network { source, .. } if source.is_connect() || source.is_timeout() => {
                FailureKind::Network
            }
            _ if self.is_rate_limited() => FailureKind::RateLimited,
            _ => match self.http_status() {
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    FailureKind::Authentication
                }
                Some(StatusCode::NOT_FOUND) => FailureKind::ModelNotFound,
                Some(StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT) => {
                    FailureKind::Network
                }
                _ => FailureKind::Other,
            },
        }
    }

    /// Explanation with a remediation hint, returned to API callers
    pub fn user_message(&self) -> String {
        let headline = match self.kind() {
            FailureKind::Authentication => {
                "Authentication with the provider failed. The API key may be invalid, expired, \
                 or lack access to this model. Check api_key in the provider configuration."
            }
            FailureKind::ModelNotFound => {
                "The provider could not find the requested model or endpoint. Check the model \
                 name and base_url in the provider configuration."
            }
            FailureKind::Network => {
                "Could not reach the provider. The network may be unstable, the service may be \
                 down, or base_url may be wrong. Try again later."
            }
            FailureKind::RateLimited => {
                "The provider rejected the request because of rate limits or exhausted quota. \
                 Wait for the quota to reset or upgrade the plan."
            }
            FailureKind::Other => {
                "Generation failed. Check the provider configuration and API key, then try again."
            }
        };
        format!("{headline}\nDetails: {self}")
    }
}
