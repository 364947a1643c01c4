//! Code → label tables and grouping parameters for the categorical views.
//!
//! Everything here is data: the aggregation code receives a
//! [`CategoryConfig`] value and never reads these constants directly, so a
//! deployment can override any part of it from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StatsError};

// ── Shared constants ──────────────────────────────────────────────────────────

/// Label marking a code that must never appear in category aggregates.
pub const NONE_LABEL: &str = "NIL";

/// First code of the primary (percentage) position group.
pub const DEFAULT_PRIMARY_RANGE_START: u32 = 1;
/// Last code of the primary (percentage) position group.
pub const DEFAULT_PRIMARY_RANGE_END: u32 = 10;
/// First code of the secondary (raw count) position group.
pub const DEFAULT_SECONDARY_RANGE_START: u32 = 11;
/// Last code of the secondary (raw count) position group.
///
/// Some deployments extend the regional group up to 40.
pub const DEFAULT_SECONDARY_RANGE_END: u32 = 23;

/// Known runway configurations, in display order.
pub const DEFAULT_CONFIG_LABELS: &[(u32, &str)] = &[
    (0, NONE_LABEL),
    (1, "OPEN V"),
    (2, "PARA 22"),
    (3, "PARA 04"),
    (7, "Single Runway"),
    (8, "Other (LVP / Closed V)"),
];

/// Known controller positions, in display order.
pub const DEFAULT_POSITION_LABELS: &[(u32, &str)] = &[
    (0, NONE_LABEL),
    (1, "GND"),
    (2, "TWR E"),
    (3, "RAD E"),
    (4, "ARR E"),
    (5, "TWR W"),
    (6, "RAD W"),
    (7, "ARR W"),
    (8, "ICE C"),
    (9, "ICE D"),
    (10, "EFIN"),
    (11, "EFRO"),
    (12, "EFTU"),
    (13, "EFKT"),
    (14, "EFJY"),
    (15, "EFOU"),
    (16, "EFPO"),
    (17, "EFKI"),
    (18, "EFVA"),
    (19, "EFIV"),
    (20, "EFKU"),
    (21, "EFMI"),
    (22, "EFMA"),
    (23, "EFTP"),
];

/// Positions that must all be staffed for simultaneous parallel approaches.
pub const PARALLEL_APPROACH_POSITIONS: &[&str] =
    &["GND", "TWR E", "RAD E", "ARR E", "TWR W", "RAD W", "ARR W"];

// ── Types ─────────────────────────────────────────────────────────────────────

/// One entry of a code → label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLabel {
    pub code: u32,
    pub label: String,
}

impl CodeLabel {
    fn table(entries: &[(u32, &str)]) -> Vec<CodeLabel> {
        entries
            .iter()
            .map(|&(code, label)| CodeLabel {
                code,
                label: label.to_string(),
            })
            .collect()
    }
}

/// Inclusive range of position codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub start: u32,
    pub end: u32,
}

impl CodeRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, code: u32) -> bool {
        self.start <= code && code <= self.end
    }

    fn overlaps(&self, other: &CodeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Denominator used for the primary-group activity percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBase {
    /// Sum of activity counts over every known, non-sentinel position.
    #[default]
    PositionOccurrences,
    /// Number of events in the window.
    EventCount,
}

/// Lookup tables and grouping parameters for the categorical views and the
/// pattern detector.
///
/// Deserialisation fills every missing field from [`CategoryConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Configuration code table; its order is the output order.
    pub config_labels: Vec<CodeLabel>,
    /// Controller-position code table; its order breaks sorting ties.
    pub position_labels: Vec<CodeLabel>,
    /// Sentinel label excluded from every aggregate.
    pub none_label: String,
    pub primary_range: CodeRange,
    pub secondary_range: CodeRange,
    pub percentage_base: PercentageBase,
    /// Position labels that must all be present for the pattern to match.
    pub required_positions: Vec<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            config_labels: CodeLabel::table(DEFAULT_CONFIG_LABELS),
            position_labels: CodeLabel::table(DEFAULT_POSITION_LABELS),
            none_label: NONE_LABEL.to_string(),
            primary_range: CodeRange::new(DEFAULT_PRIMARY_RANGE_START, DEFAULT_PRIMARY_RANGE_END),
            secondary_range: CodeRange::new(
                DEFAULT_SECONDARY_RANGE_START,
                DEFAULT_SECONDARY_RANGE_END,
            ),
            percentage_base: PercentageBase::default(),
            required_positions: PARALLEL_APPROACH_POSITIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CategoryConfig {
    /// Label for a configuration code, or `None` for an unknown code.
    pub fn config_label(&self, code: u32) -> Option<&str> {
        lookup(&self.config_labels, code)
    }

    /// Label for a position code, or `None` for an unknown code.
    pub fn position_label(&self, code: u32) -> Option<&str> {
        lookup(&self.position_labels, code)
    }

    /// Whether `label` is the sentinel that is never aggregated.
    pub fn is_none_label(&self, label: &str) -> bool {
        label == self.none_label
    }

    /// Load a configuration file, filling absent fields with defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CategoryConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise return the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject configurations the aggregators cannot interpret unambiguously.
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("primary_range", &self.primary_range),
            ("secondary_range", &self.secondary_range),
        ] {
            if range.start > range.end {
                return Err(StatsError::Config(format!(
                    "{name} start {} is greater than end {}",
                    range.start, range.end
                )));
            }
        }
        if self.primary_range.overlaps(&self.secondary_range) {
            return Err(StatsError::Config(
                "primary_range and secondary_range overlap".to_string(),
            ));
        }
        for (name, table) in [
            ("config_labels", &self.config_labels),
            ("position_labels", &self.position_labels),
        ] {
            if let Some(dup) = first_duplicate_code(table) {
                return Err(StatsError::Config(format!(
                    "{name} declares code {dup} more than once"
                )));
            }
        }
        Ok(())
    }
}

fn lookup(table: &[CodeLabel], code: u32) -> Option<&str> {
    table
        .iter()
        .find(|entry| entry.code == code)
        .map(|entry| entry.label.as_str())
}

fn first_duplicate_code(table: &[CodeLabel]) -> Option<u32> {
    let mut seen = std::collections::HashSet::new();
    table
        .iter()
        .map(|entry| entry.code)
        .find(|&code| !seen.insert(code))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
