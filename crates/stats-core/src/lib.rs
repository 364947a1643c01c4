//! Shared building blocks for the event statistics tool.
//!
//! Holds the event data model, the category lookup configuration, the error
//! type, CLI settings and the small date and number helpers used by the
//! aggregation engine in `stats-data`.

pub mod categories;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
