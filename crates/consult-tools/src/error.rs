//! Error Types for the Memory Store

use std::path::PathBuf;

use consult_core::ConsultError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot create memory directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no unique file name after {0} attempts")]
    NameExhausted(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for ConsultError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}
