//! Record file discovery and loading.
//!
//! Reads exported event records from a single JSON file or a directory of
//! them and converts every record into an [`Event`] at this one boundary.

use std::path::{Path, PathBuf};

use serde_json::Value;
use stats_core::data_processors::RecordExtractor;
use stats_core::error::{Result, StatsError};
use stats_core::models::Event;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Record files under `input`, sorted by path.
///
/// A file path is returned as-is.  A directory is walked recursively for
/// `.json` and `.jsonl` files.
pub fn find_record_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_record_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every event under `input`, files concatenated in path order.
///
/// A missing path, or a directory without record files, is an error.  A file
/// that cannot be read or parsed is logged and skipped.
pub fn load_events(input: &Path) -> Result<Vec<Event>> {
    if !input.exists() {
        return Err(StatsError::InputNotFound(input.to_path_buf()));
    }

    let files = find_record_files(input);
    if files.is_empty() {
        return Err(StatsError::NoRecordFiles(input.to_path_buf()));
    }

    let mut events = Vec::new();
    for file in &files {
        match read_records_file(file) {
            Ok(batch) => events.extend(batch),
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }

    debug!("Loaded {} events from {} files", events.len(), files.len());
    Ok(events)
}

/// Read one file holding a JSON document or JSON lines.
pub fn read_records_file(path: &Path) -> Result<Vec<Event>> {
    let content = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    match serde_json::from_str::<Value>(&content) {
        Ok(doc) => Ok(parse_records(&doc)),
        Err(doc_err) => {
            let events = parse_json_lines(path, &content);
            if events.is_empty() {
                Err(doc_err.into())
            } else {
                Ok(events)
            }
        }
    }
}

/// Extract events from a parsed document.
///
/// Accepts the export envelope `{"records": [...]}`, a bare array of records
/// or a single record object.
pub fn parse_records(doc: &Value) -> Vec<Event> {
    let records: &[Value] = match doc {
        Value::Object(map) => match map.get("records") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                warn!("\"records\" is not an array");
                return Vec::new();
            }
            None => std::slice::from_ref(doc),
        },
        Value::Array(items) => items.as_slice(),
        _ => {
            warn!("Unsupported record document: expected an object or array");
            return Vec::new();
        }
    };

    let mut skipped = 0usize;
    let events: Vec<Event> = records
        .iter()
        .filter_map(|record| {
            let event = RecordExtractor::extract(record);
            if event.is_none() {
                skipped += 1;
            }
            event
        })
        .collect();

    if skipped > 0 {
        debug!("Skipped {} non-object records", skipped);
    }
    events
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "json" || ext == "jsonl")
        .unwrap_or(false)
}

/// Parse one record (or one envelope) per line, skipping bad lines.
fn parse_json_lines(path: &Path, content: &str) -> Vec<Event> {
    let mut events = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => events.extend(parse_records(&value)),
            Err(e) => debug!(
                "Failed to parse line {} in {}: {}",
                line_no + 1,
                path.display(),
                e
            ),
        }
    }
    events
}

// ── Tests ─────────────────────────────────────────────────────────────────────
