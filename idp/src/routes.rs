// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! HTTP route handlers exposing registered service providers.
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | GET | `/health` | [`health`] | Health check endpoint |
//! | GET | `/services` | [`list_services`] | Ids of registered service providers |
//! | GET | `/services/{id}` | [`get_service`] | Stored metadata for one provider |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::json;

use crate::application::AppState;
use crate::constants::METADATA_CONTENT_TYPE;
use crate::errors::AppError;
use crate::store::ServiceProviders;

/// Health check endpoint.
///
/// ```json
/// {"status": "ok"}
/// ```
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

#[tracing::instrument(skip(state))]
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let ids = ServiceProviders::new(state.store.as_ref()).ids().await;
    Json(ids)
}

/// Returns the metadata document registered for `id`.
///
/// # Errors
///
/// - [`AppError::ServiceNotFound`] - nothing registered under `id`
#[tracing::instrument(skip(state))]
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = ServiceProviders::new(state.store.as_ref()).get(&id).await?;

    Ok(([(header::CONTENT_TYPE, METADATA_CONTENT_TYPE)], service.metadata))
}
