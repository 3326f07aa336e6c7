pub mod processing;

pub use processing::{ErrorResponse, ProcessCsvRequest, ProcessCsvResult};
