//! Input tracking for the statistics pipeline.
//!
//! [`StatsSession`] owns the pipeline's inputs (events, time window and the
//! reference day) and turns every [`InputsChanged`] notification into a full
//! recomputation.  Derived views are never cached between changes.

use chrono::NaiveDate;
use stats_core::categories::CategoryConfig;
use stats_core::models::{Event, TimeWindow};
use stats_data::analysis::{analyze_events, StatsReport};

// ── Public types ──────────────────────────────────────────────────────────────

/// A change to one of the pipeline inputs.
#[derive(Debug, Clone)]
pub enum InputsChanged {
    /// The raw event collection was reloaded.
    Events(Vec<Event>),
    /// The user selected another time window.
    Window(TimeWindow),
    /// The local calendar day rolled over.
    ReferenceDate(NaiveDate),
}

impl InputsChanged {
    fn kind(&self) -> &'static str {
        match self {
            InputsChanged::Events(_) => "events",
            InputsChanged::Window(_) => "window",
            InputsChanged::ReferenceDate(_) => "reference-date",
        }
    }
}

// ── StatsSession ──────────────────────────────────────────────────────────────

/// Current pipeline inputs plus a count of recomputations.
pub struct StatsSession {
    events: Vec<Event>,
    window: TimeWindow,
    today: NaiveDate,
    config: CategoryConfig,
    recomputations: usize,
}

impl StatsSession {
    /// Create a session with no events.
    pub fn new(window: TimeWindow, config: CategoryConfig, today: NaiveDate) -> Self {
        Self {
            events: Vec::new(),
            window,
            today,
            config,
            recomputations: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Apply an input change and recompute the report.
    ///
    /// Returns `None` when the change leaves the inputs as they were (same
    /// window or same day).  A new event collection always recomputes.
    pub fn apply(&mut self, change: InputsChanged) -> Option<StatsReport> {
        let kind = change.kind();
        match change {
            InputsChanged::Events(events) => self.events = events,
            InputsChanged::Window(window) => {
                if window == self.window {
                    return None;
                }
                self.window = window;
            }
            InputsChanged::ReferenceDate(today) => {
                if today == self.today {
                    return None;
                }
                self.today = today;
            }
        }

        tracing::debug!(change = kind, "inputs changed; recomputing");
        Some(self.recompute())
    }

    /// Compute the report for the current inputs.
    pub fn recompute(&mut self) -> StatsReport {
        self.recomputations += 1;
        analyze_events(&self.events, self.window, &self.config, self.today)
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of reports computed since creation.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
