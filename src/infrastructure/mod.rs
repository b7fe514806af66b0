pub mod db;
pub mod error;
pub mod storage;

pub use error::{StorageError, StorageResult};
