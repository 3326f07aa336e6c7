pub mod storage;

pub use storage::{create_storage_client, LocalStorage, ObjectStorage, StorageError, SupabaseStorage};
