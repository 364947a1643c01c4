//! Categorical aggregation over configuration and controller-position codes.
//!
//! Labels come from the [`CategoryConfig`] passed in; codes missing from its
//! tables are kept out of every distribution and reported separately.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use stats_core::categories::{CategoryConfig, CodeRange, PercentageBase};
use stats_core::formatting::percentage;
use stats_core::models::Event;

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    /// Share of the configured base, rounded to one decimal.
    pub percentage: f64,
}

/// A code seen in the data but absent from its label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownCode {
    pub code: u32,
    pub count: u64,
}

/// All categorical distributions for one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalSummary {
    /// Every known configuration except the sentinel, in table order.
    pub config_usage: Vec<CategoryCount>,
    /// Primary-range positions as percentages, busiest first.
    pub primary_activity: Vec<CategoryShare>,
    /// Secondary-range positions as raw counts, busiest first.
    pub secondary_activity: Vec<CategoryCount>,
    pub unknown_config_codes: Vec<UnknownCode>,
    pub unknown_position_codes: Vec<UnknownCode>,
}

// ── PositionTally ─────────────────────────────────────────────────────────────

/// Per-position activity counts, one slot per entry of the position table.
///
/// Each event contributes at most one increment per distinct position code.
#[derive(Debug, Clone)]
pub struct PositionTally {
    counts: Vec<u64>,
    unknown: BTreeMap<u32, u64>,
}

impl PositionTally {
    fn new(config: &CategoryConfig) -> Self {
        Self {
            counts: vec![0; config.position_labels.len()],
            unknown: BTreeMap::new(),
        }
    }

    /// Accumulate the distinct positions of `event`.
    fn add_event(&mut self, event: &Event, config: &CategoryConfig) {
        let mut seen = HashSet::new();
        for &code in &event.atco {
            if !seen.insert(code) {
                continue;
            }
            match config.position_labels.iter().position(|p| p.code == code) {
                Some(slot) if config.is_none_label(&config.position_labels[slot].label) => {}
                Some(slot) => self.counts[slot] += 1,
                None => *self.unknown.entry(code).or_default() += 1,
            }
        }
    }

    /// Activity count of every known, non-sentinel position.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Positions whose code falls in `range` with a non-zero count, sorted by
    /// count descending.  Equal counts keep table order.
    fn ranked(&self, config: &CategoryConfig, range: CodeRange) -> Vec<CategoryCount> {
        let mut ranked: Vec<CategoryCount> = config
            .position_labels
            .iter()
            .zip(&self.counts)
            .filter(|(entry, &count)| count > 0 && range.contains(entry.code))
            .map(|(entry, &count)| CategoryCount {
                label: entry.label.clone(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    fn unknown_codes(&self) -> Vec<UnknownCode> {
        to_unknown_codes(&self.unknown)
    }
}

// ── CategoryAggregator ────────────────────────────────────────────────────────

/// Stateless helper computing the categorical views.
pub struct CategoryAggregator;

impl CategoryAggregator {
    /// Count events per known configuration.
    ///
    /// The sentinel is omitted and configurations with no events are kept
    /// with a zero count.  Second element: unknown codes, ascending.
    pub fn config_usage(
        events: &[Event],
        config: &CategoryConfig,
    ) -> (Vec<CategoryCount>, Vec<UnknownCode>) {
        let mut counts = vec![0u64; config.config_labels.len()];
        let mut unknown: BTreeMap<u32, u64> = BTreeMap::new();

        for code in events.iter().filter_map(|e| e.config) {
            match config.config_labels.iter().position(|c| c.code == code) {
                Some(slot) => counts[slot] += 1,
                None => *unknown.entry(code).or_default() += 1,
            }
        }

        let usage = config
            .config_labels
            .iter()
            .zip(counts)
            .filter(|(entry, _)| !config.is_none_label(&entry.label))
            .map(|(entry, count)| CategoryCount {
                label: entry.label.clone(),
                count,
            })
            .collect();
        (usage, to_unknown_codes(&unknown))
    }

    /// Tally distinct positions per event across `events`.
    pub fn position_activity(events: &[Event], config: &CategoryConfig) -> PositionTally {
        let mut tally = PositionTally::new(config);
        for event in events {
            tally.add_event(event, config);
        }
        tally
    }

    /// Primary-range activity as percentages of the configured base.
    pub fn primary_share(
        tally: &PositionTally,
        event_count: usize,
        config: &CategoryConfig,
    ) -> Vec<CategoryShare> {
        let base = match config.percentage_base {
            PercentageBase::PositionOccurrences => tally.total() as f64,
            PercentageBase::EventCount => event_count as f64,
        };
        tally
            .ranked(config, config.primary_range)
            .into_iter()
            .map(|c| CategoryShare {
                percentage: percentage(c.count as f64, base, 1),
                label: c.label,
            })
            .collect()
    }

    /// Secondary-range activity as raw counts.
    pub fn secondary_counts(tally: &PositionTally, config: &CategoryConfig) -> Vec<CategoryCount> {
        tally.ranked(config, config.secondary_range)
    }

    /// Every categorical view in one pass over `events`.
    pub fn summarize(events: &[Event], config: &CategoryConfig) -> CategoricalSummary {
        let (config_usage, unknown_config_codes) = Self::config_usage(events, config);
        let tally = Self::position_activity(events, config);
        CategoricalSummary {
            config_usage,
            primary_activity: Self::primary_share(&tally, events.len(), config),
            secondary_activity: Self::secondary_counts(&tally, config),
            unknown_config_codes,
            unknown_position_codes: tally.unknown_codes(),
        }
    }
}

fn to_unknown_codes(map: &BTreeMap<u32, u64>) -> Vec<UnknownCode> {
    map.iter()
        .map(|(&code, &count)| UnknownCode { code, count })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
