//! HTTP request handlers

use std::sync::Arc;
use std::time::Instant;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::inference::InferenceResult;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Name of the multipart part carrying the image
pub const FILE_FIELD: &str = "file";

/// A single uploaded image, alive for one request
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub result: &'static str,
}

impl From<InferenceResult> for PredictResponse {
    fn from(result: InferenceResult) -> Self {
        Self { result: result.label() }
    }
}

// ============================================================================
// Inference Handlers
// ============================================================================

/// Classify an uploaded image
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Request body is not multipart");
        ServerError::NoFileUploaded
    })?;

    let upload = read_upload(&mut multipart).await?;
    let file_name = upload.file_name;
    let size = upload.data.len();
    info!(file_name = %file_name, bytes = size, "Received file");

    let start = Instant::now();
    let engine = Arc::clone(&state.engine);
    let staging = state.staging.clone();

    // Staging, decoding and inference are all blocking work
    let result = tokio::task::spawn_blocking(move || {
        let staged = staging.stage(&upload.data)?;
        engine.predict_file(staged.path())
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Inference task failed: {}", e)))??;

    info!(
        file_name = %file_name,
        bytes = size,
        score = result.score,
        result = result.label(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Prediction complete"
    );

    Ok(Json(result.into()))
}

/// Pull the `file` part out of a multipart body.
///
/// A `file` part without a filename is an ordinary form field and does not
/// count as an upload; one with an empty filename means the client submitted
/// the form without choosing a file.
pub async fn read_upload(multipart: &mut Multipart) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if file_name.is_empty() {
            return Err(ServerError::NoSelectedFile);
        }

        let data = field.bytes().await?;
        return Ok(Upload { file_name, data });
    }

    Err(ServerError::NoFileUploaded)
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model_path.display().to_string(),
        "uptime_secs": state.uptime_secs(),
    }))
}
