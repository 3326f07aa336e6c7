pub mod health;
pub mod metrics;
pub mod process_csv;

pub use health::health_check;
pub use self::metrics::metrics_endpoint;
pub use process_csv::process_csv;
