//! Co-occurrence detection over staffed controller positions.

use std::collections::HashSet;

use stats_core::categories::CategoryConfig;
use stats_core::models::Event;

/// Whether every label in `config.required_positions` is staffed in `event`.
///
/// Codes are mapped to labels first; unknown codes contribute nothing.  An
/// empty required set matches every event.
pub fn matches(event: &Event, config: &CategoryConfig) -> bool {
    let staffed: HashSet<&str> = event
        .atco
        .iter()
        .filter_map(|&code| config.position_label(code))
        .collect();
    config
        .required_positions
        .iter()
        .all(|required| staffed.contains(required.as_str()))
}

/// Number of events matching the required position set.
pub fn count_matches(events: &[Event], config: &CategoryConfig) -> usize {
    events.iter().filter(|e| matches(e, config)).count()
}
