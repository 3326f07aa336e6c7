#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use csv_import_service::config::{CsvImportConfig, ObservabilityConfig, StorageConfig};
use csv_import_service::services::{ObjectStorage, StorageError};
use csv_import_service::{build_router, AppState};
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

/// In-memory bucket. Unknown paths fail the way the hosted API does.
#[derive(Default)]
pub struct FakeStorage {
    objects: HashMap<String, Vec<u8>>,
}

impl FakeStorage {
    pub fn with_object(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(path.to_string(), data.into());
        self
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::Api {
                status: 400,
                message: "Object not found".to_string(),
            })
    }
}

pub fn test_config() -> CsvImportConfig {
    CsvImportConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        storage: StorageConfig::default(),
        observability: ObservabilityConfig {
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
    }
}

pub fn test_router(storage: FakeStorage) -> Router {
    build_router(AppState::with_storage(test_config(), Arc::new(storage)))
}

pub async fn send(app: Router, method: &str, uri: &str, body: impl Into<Body>) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("Body is not JSON")
}

pub fn assert_common_headers(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-headers"],
        "authorization, x-client-info, apikey, content-type"
    );
}
