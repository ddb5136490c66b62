//! Disk cache for aggregate records
//!
//! One JSON file per rounded coordinate pair. File modification time decides
//! freshness; expired entries are removed when they are looked up.

pub mod store;

pub use store::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;
