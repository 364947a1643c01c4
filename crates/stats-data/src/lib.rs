//! Aggregation engine for the event statistics tool.
//!
//! Reads exported event records, normalises them for a time window and
//! derives the movement, trend, categorical, monthly and staffing-pattern
//! views collected in a [`analysis::StatsReport`].

pub mod aggregator;
pub mod analysis;
pub mod calendar;
pub mod movement;
pub mod patterns;
pub mod reader;
pub mod trend;
pub mod window;
