use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessCsvRequest {
    /// Object path inside the upload bucket.
    #[serde(rename = "filePath")]
    pub file_path: String,
}

/// Import summary returned to the caller.
///
/// Row handling is not implemented yet, so every count is zero and `errors`
/// is empty whatever the file contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCsvResult {
    pub success: bool,
    pub total_rows: u64,
    pub success_count: u64,
    pub failed_count: u64,
    pub errors: Vec<serde_json::Value>,
}

impl ProcessCsvResult {
    pub fn placeholder() -> Self {
        Self {
            success: true,
            total_rows: 0,
            success_count: 0,
            failed_count: 0,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
