//! Error types for the server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::DetectorError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NoFileUploaded | ServerError::NoSelectedFile => StatusCode::BAD_REQUEST,
            ServerError::Multipart(e) => e.status(),
            ServerError::Detector(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::NoFileUploaded | ServerError::NoSelectedFile => self.to_string(),
            ServerError::Multipart(e) => {
                tracing::warn!(detail = %e, status = %status, "Rejected multipart body");
                if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "Uploaded file is too large".to_string()
                } else {
                    "Malformed multipart request".to_string()
                }
            }
            ServerError::Detector(DetectorError::Decode(msg)) => {
                tracing::warn!(detail = %msg, "Upload could not be decoded");
                "Uploaded file could not be decoded as an image".to_string()
            }
            ServerError::Detector(DetectorError::Storage(e)) => {
                tracing::error!(detail = %e, "Staging error");
                "Failed to stage uploaded file".to_string()
            }
            ServerError::Detector(e) => {
                tracing::error!(detail = %e, "Inference error");
                "Model inference failed".to_string()
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
