//! Change-detecting event source for the watch runtime.
//!
//! Wraps [`load_events`] with an input fingerprint and transparent retry
//! logic.  Callers use [`EventSource::refresh`] on every poll; the source
//! reloads only when the record files changed, retries a failing load up to
//! three times with back-off, and keeps the previous events on failure.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use stats_core::models::Event;
use stats_data::reader::{find_record_files, load_events};

/// Maximum number of load attempts before giving up and keeping stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── InputFingerprint ──────────────────────────────────────────────────────────

/// Identity of one record file at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
}

/// Snapshot of the record file set: paths, modification times and sizes.
///
/// Two fingerprints compare equal when no file was added, removed or
/// rewritten in between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFingerprint {
    files: Vec<FileStamp>,
}

impl InputFingerprint {
    pub fn capture(input: &Path) -> Self {
        let files = find_record_files(input)
            .into_iter()
            .filter_map(|path| {
                let meta = std::fs::metadata(&path).ok()?;
                Some(FileStamp {
                    modified: meta.modified().ok(),
                    len: meta.len(),
                    path,
                })
            })
            .collect();
        Self { files }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

// ── RefreshOutcome ────────────────────────────────────────────────────────────

/// Result of one [`EventSource::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The input changed and the events were reloaded.
    Reloaded,
    /// The fingerprint matched the last successful load.
    Unchanged,
    /// Every attempt failed; previous events (if any) are kept.
    Failed,
}

// ── EventSource ───────────────────────────────────────────────────────────────

/// Record input watched for changes.
pub struct EventSource {
    input: PathBuf,
    /// Fingerprint of the files behind `events`.
    fingerprint: Option<InputFingerprint>,
    events: Option<Vec<Event>>,
    last_error: Option<String>,
    last_successful_load: Option<Instant>,
}

impl EventSource {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            fingerprint: None,
            events: None,
            last_error: None,
            last_successful_load: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Reload the events when the input changed since the last load.
    ///
    /// With `force` the fingerprint check is skipped.
    pub fn refresh(&mut self, force: bool) -> RefreshOutcome {
        let current = InputFingerprint::capture(&self.input);
        if !force && self.events.is_some() && self.fingerprint.as_ref() == Some(&current) {
            tracing::trace!(files = current.file_count(), "input unchanged");
            return RefreshOutcome::Unchanged;
        }

        match self.load_with_retry() {
            Ok(events) => {
                tracing::debug!(
                    events = events.len(),
                    files = current.file_count(),
                    "events reloaded"
                );
                self.events = Some(events);
                self.fingerprint = Some(current);
                self.last_successful_load = Some(Instant::now());
                self.last_error = None;
                RefreshOutcome::Reloaded
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed; keeping previous events");
                self.last_error = Some(e);
                RefreshOutcome::Failed
            }
        }
    }

    /// Events from the last successful load.
    pub fn events(&self) -> Option<&[Event]> {
        self.events.as_deref()
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Time since the last successful load, or `None` if nothing loaded yet.
    pub fn last_load_age(&self) -> Option<Duration> {
        self.last_successful_load.map(|ts| ts.elapsed())
    }

    /// Description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn load_with_retry(&self) -> Result<Vec<Event>, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = (attempt as u64) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying load after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match load_events(&self.input) {
                Ok(events) => return Ok(events),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "load attempt failed");
                    last_err = e.to_string();
                }
            }
        }

        Err(last_err)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
