use crate::config::{StorageBackend, StorageConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Failures reported by a storage backend. `Display` is the message the
/// caller sees in the `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Object not found")]
    NotFound,

    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),

    #[error("Storage service key is not configured")]
    MissingCredential,

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The object was found but its payload could not be read to the end.
    #[error("Failed to read object body: {0}")]
    Body(reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Read access to a single bucket of an object store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError>;
}

/// Builds the privileged storage client for the configured backend.
///
/// Never fails: empty credentials are reported by `download`.
pub fn create_storage_client(config: &StorageConfig) -> Arc<dyn ObjectStorage> {
    match config.backend {
        StorageBackend::Supabase => Arc::new(SupabaseStorage::new(
            config.url.clone(),
            config.service_key.clone(),
            config.bucket.clone(),
        )),
        StorageBackend::Local => Arc::new(LocalStorage::new(&config.local_path, &config.bucket)),
    }
}

/// Client for the Supabase storage REST API, authenticated with the
/// service-role key.
pub struct SupabaseStorage {
    client: Client,
    url: String,
    service_key: Secret<String>,
    bucket: String,
}

#[derive(Deserialize)]
struct StorageApiError {
    message: Option<String>,
    error: Option<String>,
}

impl SupabaseStorage {
    pub fn new(url: impl Into<String>, service_key: Secret<String>, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            service_key,
            bucket: bucket.into(),
        }
    }

    /// `{url}/storage/v1/object/{bucket}/{path}` with every segment escaped.
    fn object_url(&self, path: &str) -> Result<Url, StorageError> {
        let base = self.url.trim_end_matches('/');
        if base.is_empty() {
            return Err(StorageError::InvalidUrl("storage URL is not configured".to_string()));
        }

        let mut url =
            Url::parse(base).map_err(|e| StorageError::InvalidUrl(format!("{}: {}", base, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidUrl(base.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["storage", "v1", "object", self.bucket.as_str()]);
            segments.extend(path.trim_start_matches('/').split('/'));
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.object_url(path)?;
        let key = self.service_key.expose_secret();
        if key.is_empty() {
            return Err(StorageError::MissingCredential);
        }

        tracing::debug!(bucket = %self.bucket, path = %path, "Downloading object");

        let response = self
            .client
            .get(url)
            .bearer_auth(key)
            .header("apikey", key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }

        let data = response.bytes().await.map_err(StorageError::Body)?;
        Ok(data.to_vec())
    }
}

/// Prefers the API's `message`, then its `error` code, then the reason phrase.
fn api_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<StorageApiError>(body)
        .ok()
        .and_then(|err| err.message.or(err.error))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Storage request failed")
                .to_string()
        })
}

/// Serves objects from `{base_path}/{bucket}/` on the local filesystem.
pub struct LocalStorage {
    base_path: PathBuf,
    bucket: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            bucket: bucket.into(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.as_os_str().is_empty() || escapes {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.base_path.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path)?;
        match fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
