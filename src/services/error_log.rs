//! Import error log
//!
//! Row and batch failures are written to tracing and kept in a bounded
//! in-memory log with file-backed persistence, so operators can review
//! them after the batch has replied.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

const MAX_LOG_SIZE: usize = 100;

pub const GOSI_ROW_ERROR: &str = "GOSI Import Error";
pub const GOSI_CRITICAL_ERROR: &str = "GOSI Import Critical Error";
pub const WORKER_ROW_ERROR: &str = "Worker Import Error";
pub const WORKER_CRITICAL_ERROR: &str = "Worker Import Critical Error";

/// Sink for categorized import errors
pub trait ErrorLog: Send + Sync {
    fn log(&self, message: &str, category: &str);
}

/// Logged error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub id: Uuid,
    pub category: String,
    pub message: String,
    pub logged_at: DateTime<Utc>,
}

/// Response for listing logged errors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogResponse {
    pub entries: Vec<ErrorLogEntry>,
    pub total: usize,
}

/// Newest-first error log, optionally mirrored to a JSON file
pub struct ErrorLogService {
    entries: Arc<RwLock<VecDeque<ErrorLogEntry>>>,
    path: Option<PathBuf>,
}

impl ErrorLogService {
    /// Log persisted at `path`, loading any entries already there
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut deque = VecDeque::with_capacity(MAX_LOG_SIZE);
        if let Some(loaded) = Self::load_from_disk(&path) {
            deque.extend(loaded.into_iter().take(MAX_LOG_SIZE));
            info!("Loaded {} import error entries from {}", deque.len(), path.display());
        }
        Self {
            entries: Arc::new(RwLock::new(deque)),
            path: Some(path),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(MAX_LOG_SIZE))),
            path: None,
        }
    }

    fn add_entry(&self, entry: ErrorLogEntry) {
        let mut entries = self.entries.write();

        if entries.len() >= MAX_LOG_SIZE {
            entries.pop_back();
        }
        entries.push_front(entry);

        if let Some(path) = &self.path {
            Self::save_to_disk(path, &entries);
        }
    }

    /// Most recent entries, optionally restricted to one category
    pub fn get_recent(&self, category: Option<&str>, limit: usize) -> ErrorLogResponse {
        let entries = self.entries.read();
        let matching: Vec<ErrorLogEntry> = entries
            .iter()
            .filter(|e| category.map_or(true, |c| e.category == c))
            .take(limit)
            .cloned()
            .collect();
        let total = match category {
            Some(c) => entries.iter().filter(|e| e.category == c).count(),
            None => entries.len(),
        };

        ErrorLogResponse {
            entries: matching,
            total,
        }
    }

    fn load_from_disk(path: &Path) -> Option<Vec<ErrorLogEntry>> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<ErrorLogEntry>>(&content) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!("Failed to parse import error log: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read import error log: {}", e);
                None
            }
        }
    }

    fn save_to_disk(path: &Path, entries: &VecDeque<ErrorLogEntry>) {
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("Failed to create import error log directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!("Failed to write import error log: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize import error log: {}", e),
        }
    }
}

impl ErrorLog for ErrorLogService {
    fn log(&self, message: &str, category: &str) {
        error!(category, "{}", message);
        self.add_entry(ErrorLogEntry {
            id: Uuid::new_v4(),
            category: category.to_string(),
            message: message.to_string(),
            logged_at: Utc::now(),
        });
    }
}
