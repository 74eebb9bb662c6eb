//! Endpoint directory.
//!
//! A name → endpoint URL map served to browsers, reloaded on demand from a
//! JSON object on disk (`{"go": "ws://127.0.0.1:8001/", ...}`). A reload is
//! skipped when the file has not been modified since the last applied one.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::EndpointName;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("File does not exist")]
    NotFound,

    #[error("Malformed JSON")]
    Malformed(#[source] serde_json::Error),

    /// One line per invalid entry
    #[error("{}", .0.join("\n"))]
    Invalid(Vec<String>),

    #[error("Internal server error: {0}")]
    Io(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// New map applied, with this many entries
    Applied(usize),
    /// File not modified since the last applied reload
    Unchanged,
}

#[derive(Default)]
struct DirectoryState {
    endpoints: BTreeMap<String, String>,
    last_modified: Option<SystemTime>,
}

pub struct EndpointDirectory {
    path: PathBuf,
    state: RwLock<DirectoryState>,
}

impl EndpointDirectory {
    /// Empty directory backed by `path`. Nothing is read until `reload`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(DirectoryState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn endpoints(&self) -> BTreeMap<String, String> {
        self.state.read().await.endpoints.clone()
    }

    /// Re-read the backing file and replace the map if it is valid.
    ///
    /// Concurrent reloads are serialized; readers keep seeing the previous map
    /// until a valid one is applied.
    pub async fn reload(&self) -> Result<ReloadOutcome, DirectoryError> {
        let mut state = self.state.write().await;

        let metadata = tokio::fs::metadata(&self.path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                DirectoryError::NotFound
            } else {
                DirectoryError::Io(e)
            }
        })?;
        let modified = metadata.modified().map_err(DirectoryError::Io)?;
        if state.last_modified.is_some_and(|last| last >= modified) {
            return Ok(ReloadOutcome::Unchanged);
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(DirectoryError::Io)?;
        let endpoints: BTreeMap<String, String> =
            serde_json::from_slice(&bytes).map_err(DirectoryError::Malformed)?;
        validate(&endpoints)?;

        let count = endpoints.len();
        state.endpoints = endpoints;
        state.last_modified = Some(modified);
        tracing::info!(path = %self.path.display(), count, "Endpoint directory reloaded");

        Ok(ReloadOutcome::Applied(count))
    }
}

fn validate(endpoints: &BTreeMap<String, String>) -> Result<(), DirectoryError> {
    let problems: Vec<String> = endpoints
        .iter()
        .filter_map(|(name, address)| {
            if let Err(e) = EndpointName::new(name.clone()) {
                return Some(e.to_string());
            }
            url::Url::parse(address)
                .err()
                .map(|e| format!("Bad URL ({address}): {e}"))
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DirectoryError::Invalid(problems))
    }
}
