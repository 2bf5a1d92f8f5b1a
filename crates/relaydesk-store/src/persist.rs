// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-file JSON persistence with atomic replacement.
//!
//! Every save serializes the complete record and replaces the target file via
//! a temp file in the same directory, so a crash mid-write never leaves a
//! truncated file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use relaydesk_core::BridgeError;

/// One JSON-backed file. The stores own one of these per record type.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record, returning the default when the file does not exist
    /// yet. A file that exists but fails to parse is an error: silently
    /// starting empty would orphan every open ticket.
    pub fn load<T: DeserializeOwned + Default>(&self) -> Result<T, BridgeError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "data file absent, starting empty");
            return Ok(T::default());
        }
        let bytes = std::fs::read(&self.path).map_err(|source| BridgeError::Persistence {
            source: Box::new(source),
        })?;
        serde_json::from_slice(&bytes).map_err(|source| BridgeError::Persistence {
            source: Box::new(source),
        })
    }

    /// Serializes `record` and atomically replaces the file.
    pub fn save<T: Serialize>(&self, record: &T) -> Result<(), BridgeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BridgeError::Persistence {
                source: Box::new(source),
            })?;
        }
        let json =
            serde_json::to_vec_pretty(record).map_err(|source| BridgeError::Persistence {
                source: Box::new(source),
            })?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|source| BridgeError::Persistence {
                source: Box::new(source),
            })?;
        tmp.write_all(&json)
            .and_then(|()| tmp.flush())
            .map_err(|source| BridgeError::Persistence {
                source: Box::new(source),
            })?;
        tmp.persist(&self.path)
            .map_err(|source| BridgeError::Persistence {
                source: Box::new(source.error),
            })?;
        Ok(())
    }

    /// Saves and downgrades failures to a warning. Mutating store operations
    /// use this so an unwritable disk degrades durability, not availability:
    /// in-memory state stays authoritative for the session.
    pub fn save_logged<T: Serialize>(&self, record: &T) {
        if let Err(err) = self.save(record) {
            warn!(path = %self.path.display(), error = %err, "failed to persist data file");
        }
    }
}
