use crate::dtos::ErrorResponse;
use crate::middleware::cors::apply_cors_headers;
use crate::services::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Everything that can abort a `/process-csv` request, tagged by origin.
#[derive(Debug, Error)]
pub enum ProcessCsvError {
    /// Body unreadable, not JSON, or missing `filePath`.
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Storage(StorageError),

    /// Object located but its payload could not be read.
    #[error(transparent)]
    Decode(StorageError),
}

impl ProcessCsvError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessCsvError::Input(_) => "input",
            ProcessCsvError::Storage(_) => "storage",
            ProcessCsvError::Decode(_) => "decode",
        }
    }
}

impl From<StorageError> for ProcessCsvError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Body(_) => ProcessCsvError::Decode(err),
            other => ProcessCsvError::Storage(other),
        }
    }
}

impl From<serde_json::Error> for ProcessCsvError {
    fn from(err: serde_json::Error) -> Self {
        ProcessCsvError::Input(err.to_string())
    }
}

// Every variant is a 400; callers only get the message.
impl IntoResponse for ProcessCsvError {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response();
        apply_cors_headers(response.headers_mut());
        response
    }
}
