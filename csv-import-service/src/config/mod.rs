use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_BUCKET: &str = "csv-uploads";

#[derive(Debug, Clone)]
pub struct CsvImportConfig {
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Base URL of the storage API, e.g. `https://<project>.supabase.co`.
    pub url: String,
    /// Service-role key. Grants full bucket access, never log it.
    pub service_key: Secret<String>,
    pub bucket: String,
    /// Root directory for [`StorageBackend::Local`].
    pub local_path: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Supabase,
    Local,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl CsvImportConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env and the APP__ prefix
        let common = core_config::Config::load()?;

        // Missing credentials are not a startup error; the first download
        // reports them instead.
        let storage = StorageConfig {
            backend: env_or("STORAGE_BACKEND", "supabase")
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            url: env_or("SUPABASE_URL", ""),
            service_key: Secret::new(env_or("SUPABASE_SERVICE_ROLE_KEY", "")),
            bucket: env_or("STORAGE_BUCKET", DEFAULT_BUCKET),
            local_path: env_or("STORAGE_LOCAL_PATH", "storage"),
        };

        let observability = ObservabilityConfig {
            log_level: env_or("LOG_LEVEL", "info"),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        };

        Ok(Self {
            common,
            storage,
            observability,
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Supabase,
            url: String::new(),
            service_key: Secret::new(String::new()),
            bucket: DEFAULT_BUCKET.to_string(),
            local_path: "storage".to_string(),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supabase" => Ok(StorageBackend::Supabase),
            "local" => Ok(StorageBackend::Local),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
