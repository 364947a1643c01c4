use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::Event;

// ── DateProcessor ─────────────────────────────────────────────────────────────

/// Parses event dates from the formats seen in exported record files.
pub struct DateProcessor;

impl DateProcessor {
    /// Attempt to parse a [`serde_json::Value`] into a calendar date.
    ///
    /// Handles:
    /// * `null`      → `None`
    /// * JSON string → `YYYY-MM-DD`, RFC 3339 or a naive ISO date-time.
    /// * anything else → `None`
    pub fn parse(value: &Value) -> Option<NaiveDate> {
        match value {
            Value::String(s) => Self::parse_str(s.trim()),
            _ => None,
        }
    }

    /// Parse a date string; the date part of a timestamp is kept as written.
    pub fn parse_str(s: &str) -> Option<NaiveDate> {
        if s.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(date);
        }

        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.date_naive());
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive.date());
            }
        }

        warn!("DateProcessor: could not parse date string \"{}\"", s);
        None
    }
}

// ── CodeListParser ────────────────────────────────────────────────────────────

/// Turns the comma-separated position field into a list of integer codes.
pub struct CodeListParser;

impl CodeListParser {
    /// Parse a position field.
    ///
    /// * string → split on `,`, trim, parse each token; blank → empty list.
    /// * array  → every integer element.
    /// * number → single-element list.
    ///
    /// Tokens that are not non-negative integers are dropped.
    pub fn parse(value: &Value) -> Vec<u32> {
        match value {
            Value::String(s) => Self::parse_str(s),
            Value::Array(items) => items.iter().filter_map(value_as_code).collect(),
            Value::Number(_) => value_as_code(value).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn parse_str(s: &str) -> Vec<u32> {
        s.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| match token.parse::<u32>() {
                Ok(code) => Some(code),
                Err(_) => {
                    debug!("CodeListParser: dropping non-numeric code \"{}\"", token);
                    None
                }
            })
            .collect()
    }
}

// ── RecordExtractor ───────────────────────────────────────────────────────────

/// Maps one raw JSON record onto an [`Event`].
///
/// Both the export envelope shape (`{"fields": {"Date": ..}}`) and flat
/// objects (`{"date": ..}`) are accepted; field names are looked up in both
/// capitalised and lowercase spellings.
pub struct RecordExtractor;

impl RecordExtractor {
    /// Extract an event from a record.  Returns `None` only when `data` is not
    /// a JSON object; malformed fields degrade into `NaN` / `None` instead.
    pub fn extract(data: &Value) -> Option<Event> {
        let fields = match data.get("fields") {
            Some(f) if f.is_object() => f,
            _ => data,
        };
        if !fields.is_object() {
            return None;
        }

        let date_value = find_value(fields, &["Date", "date"]);
        let raw_date = match date_value {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let date = date_value.and_then(DateProcessor::parse);

        Some(Event {
            date,
            raw_date,
            departures: Self::find_f64(fields, &["Departures", "departures"]),
            arrivals: Self::find_f64(fields, &["Arrivals", "arrivals"]),
            config: find_value(fields, &["Config", "config"]).and_then(value_as_code),
            atco: find_value(fields, &["ATCO", "atco", "Atco"])
                .map(CodeListParser::parse)
                .unwrap_or_default(),
        })
    }

    /// Read a movement count.  Missing, non-numeric or infinite values
    /// become `NaN`.
    fn find_f64(obj: &Value, keys: &[&str]) -> f64 {
        let parsed = match find_value(obj, keys) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite()).unwrap_or(f64::NAN)
    }
}

fn find_value<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|&key| obj.get(key))
        .filter(|v| !v.is_null())
}

fn value_as_code(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|c| u32::try_from(c).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── DateProcessor ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(DateProcessor::parse(&json!("2024-03-15")), Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_parse_rfc3339_z() {
        assert_eq!(
            DateProcessor::parse(&json!("2024-03-15T22:30:00.000Z")),
            Some(date(2024, 3, 15))
        );
    }

    #[test]
    fn test_parse_naive_datetime() {
        assert_eq!(
            DateProcessor::parse(&json!("2024-03-15T08:00:00")),
            Some(date(2024, 3, 15))
        );
    }

    #[test]
    fn test_parse_invalid_date() {
        assert_eq!(DateProcessor::parse(&json!("15th of March")), None);
        assert_eq!(DateProcessor::parse(&json!("")), None);
        assert_eq!(DateProcessor::parse(&json!(null)), None);
        assert_eq!(DateProcessor::parse(&json!(20240315)), None);
    }

    // ── CodeListParser ────────────────────────────────────────────────────────

    #[test]
    fn test_code_list_comma_separated() {
        assert_eq!(CodeListParser::parse(&json!("1,2,3")), vec![1, 2, 3]);
        assert_eq!(CodeListParser::parse(&json!(" 4 , 5 ")), vec![4, 5]);
    }

    #[test]
    fn test_code_list_blank_is_empty() {
        assert!(CodeListParser::parse(&json!("")).is_empty());
        assert!(CodeListParser::parse(&json!("  ")).is_empty());
        assert!(CodeListParser::parse(&json!(null)).is_empty());
    }

    #[test]
    fn test_code_list_drops_garbage_tokens() {
        assert_eq!(CodeListParser::parse(&json!("1,x,,3")), vec![1, 3]);
    }

    #[test]
    fn test_code_list_array_and_number() {
        assert_eq!(CodeListParser::parse(&json!([7, 8, "9"])), vec![7, 8, 9]);
        assert_eq!(CodeListParser::parse(&json!(5)), vec![5]);
    }

    #[test]
    fn test_code_list_keeps_duplicates() {
        assert_eq!(CodeListParser::parse(&json!("2,2")), vec![2, 2]);
    }

    // ── RecordExtractor ───────────────────────────────────────────────────────

    #[test]
    fn test_extract_envelope_record() {
        let record = json!({
            "id": "rec1",
            "fields": {
                "Date": "2024-01-01",
                "Departures": 10,
                "Arrivals": 5,
                "Config": 1,
                "ATCO": "1,2"
            }
        });
        let event = RecordExtractor::extract(&record).unwrap();
        assert_eq!(event.date, Some(date(2024, 1, 1)));
        assert_eq!(event.raw_date, "2024-01-01");
        assert!((event.departures - 10.0).abs() < 1e-9);
        assert!((event.arrivals - 5.0).abs() < 1e-9);
        assert_eq!(event.config, Some(1));
        assert_eq!(event.atco, vec![1, 2]);
    }

    #[test]
    fn test_extract_flat_record() {
        let record = json!({
            "date": "2024-02-01",
            "departures": "20",
            "arrivals": 5,
            "config": "3",
            "atco": [1, 2, 3]
        });
        let event = RecordExtractor::extract(&record).unwrap();
        assert_eq!(event.date, Some(date(2024, 2, 1)));
        assert!((event.departures - 20.0).abs() < 1e-9);
        assert_eq!(event.config, Some(3));
        assert_eq!(event.atco, vec![1, 2, 3]);
    }

    #[test]
    fn test_extract_malformed_counts_become_nan() {
        let record = json!({"fields": {"Date": "2024-01-01", "Departures": "lots"}});
        let event = RecordExtractor::extract(&record).unwrap();
        assert!(event.departures.is_nan());
        assert!(event.arrivals.is_nan());
        assert_eq!(event.config, None);
        assert!(event.atco.is_empty());
    }

    #[test]
    fn test_extract_infinite_counts_become_nan() {
        let record = json!({"fields": {"Date": "2024-01-01", "Departures": " inf ", "Arrivals": "-infinity"}});
        let event = RecordExtractor::extract(&record).unwrap();
        assert!(event.departures.is_nan());
        assert!(event.arrivals.is_nan());
    }

    #[test]
    fn test_extract_numeric_string_count() {
        let record = json!({"fields": {"Date": "2024-01-01", "Departures": " 12 ", "Arrivals": 3}});
        let event = RecordExtractor::extract(&record).unwrap();
        assert_eq!(event.departures, 12.0);
        assert_eq!(event.arrivals, 3.0);
    }

    #[test]
    fn test_extract_bad_date_keeps_raw_text() {
        let record = json!({"fields": {"Date": "soon", "Departures": 1, "Arrivals": 1}});
        let event = RecordExtractor::extract(&record).unwrap();
        assert_eq!(event.date, None);
        assert_eq!(event.raw_date, "soon");
    }

    #[test]
    fn test_extract_non_object() {
        assert!(RecordExtractor::extract(&json!("text")).is_none());
        assert!(RecordExtractor::extract(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_extract_negative_config_is_none() {
        let record = json!({"config": -1, "date": "2024-01-01"});
        let event = RecordExtractor::extract(&record).unwrap();
        assert_eq!(event.config, None);
    }
}
