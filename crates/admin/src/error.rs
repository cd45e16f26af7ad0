//! Unified error handling for the back-office services.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::models::TransitionError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller-correctable input problem; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation is not valid for the entity's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream API failure (transport, auth, rate limit, server error).
    #[error("API error: {0}")]
    Api(ApiError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Returns `true` if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            Self::Validation(_) | Self::Conflict(_) | Self::NotFound(_) | Self::Config(_) => false,
        }
    }

    /// Text to show a user. Server messages pass through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Conflict(message) | Self::NotFound(message) => {
                message.clone()
            }
            Self::Api(err) => err.user_message(),
            Self::Config(err) => err.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Api {
                status: 400 | 422,
                message,
            } => Self::Validation(message),
            ApiError::Api {
                status: 409,
                message,
            } => Self::Conflict(message),
            ApiError::NotFound(message) => Self::NotFound(message),
            other => Self::Api(other),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        Self::Conflict(err.to_string())
    }
}
