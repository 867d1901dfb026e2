//! Memory Store
//!
//! Append-only directory of JSON memory records, one file per record:
//! `{dir}/observation-{unix_ts}-{8 hex}.json`.
//!
//! Files are opened with create-new semantics, so two writers can never
//! land on the same file even within the same second.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::MemoryRecord;

/// File name prefix for memory records
pub const FILE_PREFIX: &str = "observation";

const MAX_NAME_ATTEMPTS: usize = 8;

/// Directory-backed record store
#[derive(Clone, Debug)]
pub struct MemoryStore {
    dir: PathBuf,
}

impl MemoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<system temp dir>/fast-consult-memory`
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("fast-consult-memory")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a record under a fresh unique name and return its path.
    ///
    /// Creates the directory (and parents) when missing.
    pub async fn save(&self, record: &MemoryRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let body = serde_json::to_vec_pretty(record)?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(record_file_name(Utc::now().timestamp()));

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "memory file name taken, retrying");
                    continue;
                }
                Err(source) => return Err(StoreError::Write { path, source }),
            };

            let written = match file.write_all(&body).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            drop(file);
            discard_on_error(&path, written).await?;

            tracing::info!(path = %path.display(), "saved memory record");
            return Ok(path);
        }

        Err(StoreError::NameExhausted(MAX_NAME_ATTEMPTS))
    }
}

/// Remove a partially written record so failed saves leave nothing behind
async fn discard_on_error(path: &Path, written: std::io::Result<()>) -> Result<()> {
    let Err(source) = written else {
        return Ok(());
    };

    if let Err(e) = fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "could not remove partial memory file");
    }
    Err(StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn record_file_name(unix_ts: i64) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{FILE_PREFIX}-{unix_ts}-{}.json", &id[..8])
}
