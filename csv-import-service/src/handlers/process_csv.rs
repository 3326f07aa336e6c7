use crate::dtos::{ProcessCsvRequest, ProcessCsvResult};
use crate::error::ProcessCsvError;
use crate::startup::AppState;
use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;

/// Upper bound on the JSON request body. It only carries an object path.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// `/process-csv`: answers CORS preflights, otherwise downloads the named
/// object and returns the import summary.
pub async fn process_csv(State(state): State<AppState>, req: Request) -> Response {
    if req.method() == Method::OPTIONS {
        return preflight();
    }

    match import(&state, req).await {
        Ok(result) => {
            counter!("csv_process_requests_total", "outcome" => "success").increment(1);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "CSV processing failed");
            counter!("csv_process_requests_total", "outcome" => err.kind()).increment(1);
            err.into_response()
        }
    }
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        "ok",
    )
        .into_response()
}

async fn import(state: &AppState, req: Request) -> Result<ProcessCsvResult, ProcessCsvError> {
    let body = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ProcessCsvError::Input(e.to_string()))?;
    let request: ProcessCsvRequest = serde_json::from_slice(&body)?;

    let data = state.storage.download(&request.file_path).await?;
    // Invalid sequences become U+FFFD; byte content never fails the request.
    let csv_content = String::from_utf8_lossy(&data);

    tracing::info!(file_path = %request.file_path, "CSV file downloaded");
    tracing::debug!(bytes = csv_content.len(), "CSV content decoded");

    Ok(ProcessCsvResult::placeholder())
}
