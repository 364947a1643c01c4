//! Async watch orchestrator.
//!
//! Polls an [`EventSource`] in a tokio task, feeds changes into a
//! [`StatsSession`] and sends every recomputed [`StatsReport`] through an
//! `mpsc` channel so the caller can render it without shared mutable state.

use std::path::PathBuf;
use std::time::Duration;

use stats_core::categories::CategoryConfig;
use stats_core::models::TimeWindow;
use stats_core::time_utils::ReportTimezone;
use stats_data::analysis::StatsReport;
use tokio::sync::mpsc;
use tokio::time;

use crate::session::{InputsChanged, StatsSession};
use crate::source::{EventSource, RefreshOutcome};

// ── Public types ──────────────────────────────────────────────────────────────

/// What triggered a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// First successful load after start.
    Initial,
    /// The record files changed on disk.
    EventsReloaded,
    /// The local calendar day changed.
    DayRolledOver,
}

/// A freshly computed report forwarded to the presentation layer.
#[derive(Debug, Clone)]
pub struct StatsUpdate {
    pub report: StatsReport,
    pub reason: UpdateReason,
}

// ── StatsOrchestrator ─────────────────────────────────────────────────────────

/// Background watch coordinator.
///
/// Call [`StatsOrchestrator::start`] to spin up the polling loop in a
/// dedicated tokio task and receive a channel endpoint for [`StatsUpdate`]s.
pub struct StatsOrchestrator {
    /// How often to check the input for changes.
    refresh_interval: Duration,
    /// Record file or directory.
    input: PathBuf,
    window: TimeWindow,
    config: CategoryConfig,
    /// IANA timezone used to resolve the current day.
    timezone: String,
}

impl StatsOrchestrator {
    pub fn new(
        refresh_interval_secs: u64,
        input: PathBuf,
        window: TimeWindow,
        config: CategoryConfig,
        timezone: String,
    ) -> Self {
        Self {
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            input,
            window,
            config,
            timezone,
        }
    }

    /// Start the watch loop.
    ///
    /// Returns the receiving end of the update channel and a [`WatchHandle`]
    /// that aborts the loop.
    pub fn start(self) -> (mpsc::Receiver<StatsUpdate>, WatchHandle) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.watch_loop(tx).await;
        });

        (rx, WatchHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Loads immediately, then polls on `refresh_interval` until the
    /// receiver is dropped.
    async fn watch_loop(self, tx: mpsc::Sender<StatsUpdate>) {
        let tz = ReportTimezone::resolve(&self.timezone);
        let mut source = EventSource::new(self.input.clone());
        let mut session = StatsSession::new(self.window, self.config.clone(), tz.today());

        self.poll(&mut source, &mut session, &tz, &tx, true).await;

        let mut interval = time::interval(self.refresh_interval);
        // The first tick fires immediately; the initial load already ran.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("update channel closed; exiting watch loop");
                break;
            }

            self.poll(&mut source, &mut session, &tz, &tx, false).await;
        }
    }

    /// Check the day and the input, recompute on change and send the result.
    async fn poll(
        &self,
        source: &mut EventSource,
        session: &mut StatsSession,
        tz: &ReportTimezone,
        tx: &mpsc::Sender<StatsUpdate>,
        initial: bool,
    ) {
        let mut update = session
            .apply(InputsChanged::ReferenceDate(tz.today()))
            .map(|report| StatsUpdate {
                report,
                reason: UpdateReason::DayRolledOver,
            });

        if source.refresh(initial) == RefreshOutcome::Reloaded {
            if let Some(events) = source.events() {
                let report = session.apply(InputsChanged::Events(events.to_vec()));
                update = report.map(|report| StatsUpdate {
                    report,
                    reason: if initial {
                        UpdateReason::Initial
                    } else {
                        UpdateReason::EventsReloaded
                    },
                });
            }
        }

        let Some(update) = update else {
            return;
        };
        // A day rollover before the first successful load has nothing to show.
        if source.events().is_none() {
            return;
        }

        tracing::debug!(
            reason = ?update.reason,
            events = update.report.metadata.events_in_window,
            "sending stats update"
        );
        if let Err(e) = tx.send(update).await {
            tracing::warn!(error = %e, "failed to send stats update; receiver dropped");
        }
    }
}

// ── WatchHandle ───────────────────────────────────────────────────────────────

/// A handle to the background watch task.
///
/// Call [`WatchHandle::abort`] to stop the loop.
pub struct WatchHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Immediately abort the watch loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
