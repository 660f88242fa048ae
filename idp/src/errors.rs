// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// A single metadata GET failed.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("unable to parse metadata url {location}: {source}")]
    InvalidUrl {
        location: String,
        source: url::ParseError,
    },
    #[error("unable to get metadata from {location}: {source}")]
    Request {
        location: String,
        source: reqwest::Error,
    },
    #[error("metadata request to {location} returned status {status}")]
    Status { location: String, status: u16 },
    #[error("unable to read metadata response from {location}: {source}")]
    Body {
        location: String,
        source: reqwest::Error,
    },
    #[error("metadata from {location} exceeds {limit} bytes")]
    TooLarge { location: String, limit: u64 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("unable to serialize value for {key}: {message}")]
    Serialization { key: String, message: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegisterError {
    #[error("metadata for {id} is not well-formed xml: {reason}")]
    NotWellFormed { id: String, reason: String },
    #[error("unable to register {id}: {source}")]
    Store { id: String, source: StoreError },
}

/// Outcome of one provider attempt, possibly wrapped by the retry policy.
#[derive(thiserror::Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error("{source}: failed after {attempts} retries")]
    Exhausted {
        attempts: u32,
        source: Box<AttemptError>,
    },
}

impl AttemptError {
    /// Returns the innermost error, looking through retry wrapping.
    pub fn root(&self) -> &AttemptError {
        match self {
            Self::Exhausted { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Terminal result of a bootstrap run.
#[derive(thiserror::Error, Debug)]
pub enum BootstrapError {
    #[error("{source}")]
    Provider { id: String, source: AttemptError },
    #[error("timed out waiting for SP metadata")]
    TimedOut,
    #[error("bootstrap task failed: {0}")]
    TaskFailed(String),
}

impl BootstrapError {
    /// The service provider whose failure ended the run, if any.
    pub fn provider_id(&self) -> Option<&str> {
        match self {
            Self::Provider { id, .. } => Some(id),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AppError {
    #[error("service provider not found")]
    ServiceNotFound,
    #[error("internal server error")]
    InternalServerError,
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::ServiceNotFound => (
                StatusCode::NOT_FOUND,
                "No service provider found".to_string(),
            ),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            Self::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({"code": status.as_u16(), "message": message}));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(source: StoreError) -> Self {
        match source {
            StoreError::NotFound(_) => AppError::ServiceNotFound,
            other => {
                tracing::error!("{:?}", other);
                AppError::InternalServerError
            }
        }
    }
}
