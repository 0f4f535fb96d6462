use std::str::FromStr;
use std::sync::Arc;

use pw_core::{ArticleRepository, Error, Result};

pub mod backends;

pub use backends::*;

/// Available article repository backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageKind::Memory),
            other => Err(Error::Configuration(format!("Unknown storage backend: {}", other))),
        }
    }
}

pub fn create_repository(kind: StorageKind) -> Arc<dyn ArticleRepository> {
    match kind {
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_repository, StorageKind};
}
