use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use csv_import_service::services::{ObjectStorage, StorageError, SupabaseStorage};
use csv_import_service::config::{StorageBackend, StorageConfig};
use csv_import_service::error::ProcessCsvError;
use secrecy::Secret;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SERVICE_KEY: &str = "service-role-key";

/// Mimics the storage object endpoint: one known object, bearer + apikey auth.
async fn object(Path((bucket, path)): Path<(String, String)>, headers: HeaderMap) -> impl IntoResponse {
    let bearer = format!("Bearer {}", SERVICE_KEY);
    let authorized = headers.get("authorization").map(|v| v.as_bytes()) == Some(bearer.as_bytes())
        && headers.get("apikey").map(|v| v.as_bytes()) == Some(SERVICE_KEY.as_bytes());
    if !authorized {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "statusCode": "403", "error": "Unauthorized", "message": "invalid signature" })),
        )
            .into_response();
    }

    match (bucket.as_str(), path.as_str()) {
        ("csv-uploads", "imports/data.csv") => (StatusCode::OK, "id,value\n1,2\n").into_response(),
        ("csv-uploads", "broken.csv") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "statusCode": "404", "error": "not_found", "message": "Object not found" })),
        )
            .into_response(),
    }
}

async fn spawn_fake_storage() -> String {
    let app = Router::new().route("/storage/v1/object/:bucket/*path", get(object));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake storage");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://127.0.0.1:{}", port)
}

fn client(url: &str, key: &str) -> SupabaseStorage {
    SupabaseStorage::new(url, Secret::new(key.to_string()), "csv-uploads")
}

#[tokio::test]
async fn downloads_existing_object() {
    let url = spawn_fake_storage().await;

    let data = client(&url, SERVICE_KEY)
        .download("imports/data.csv")
        .await
        .expect("download failed");

    assert_eq!(data, b"id,value\n1,2\n");
}

#[tokio::test]
async fn missing_object_surfaces_api_message() {
    let url = spawn_fake_storage().await;

    let err = client(&url, SERVICE_KEY)
        .download("imports/other.csv")
        .await
        .unwrap_err();

    match err {
        StorageError::Api { status, ref message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Object not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn wrong_key_is_rejected() {
    let url = spawn_fake_storage().await;

    let err = client(&url, "wrong").download("imports/data.csv").await.unwrap_err();

    assert_eq!(err.to_string(), "invalid signature");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_reason() {
    let url = spawn_fake_storage().await;

    let err = client(&url, SERVICE_KEY).download("broken.csv").await.unwrap_err();

    assert_eq!(err.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url, SERVICE_KEY).download("x.csv").await.unwrap_err();

    assert!(matches!(err, StorageError::Request(_)));
}

/// Answers every connection with a 200 whose body stops short of its
/// advertised length.
async fn spawn_truncating_storage() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nid,value\n")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", address)
}

#[tokio::test]
async fn truncated_body_is_a_read_failure_not_a_lookup_failure() {
    let url = spawn_truncating_storage().await;

    let err = client(&url, SERVICE_KEY).download("x.csv").await.unwrap_err();

    assert!(matches!(err, StorageError::Body(_)), "unexpected error: {:?}", err);
    assert!(err.to_string().starts_with("Failed to read object body"));

    let err = ProcessCsvError::from(err);
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn lookup_failures_stay_storage_errors() {
    let url = spawn_fake_storage().await;
    let config = StorageConfig {
        backend: StorageBackend::Supabase,
        url,
        service_key: Secret::new(SERVICE_KEY.to_string()),
        ..StorageConfig::default()
    };

    let storage = csv_import_service::services::create_storage_client(&config);
    let err = ProcessCsvError::from(storage.download("missing.csv").await.unwrap_err());

    assert_eq!(err.kind(), "storage");
    assert_eq!(err.to_string(), "Object not found");
}
