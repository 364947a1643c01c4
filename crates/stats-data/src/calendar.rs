//! Calendar-month buckets in rolling order ending at the current month.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use stats_core::models::Event;
use stats_core::time_utils::{month_label, rolling_month_order};

/// Totals for one calendar month (all years folded together).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// Three-letter month label.
    pub month: String,
    pub departures: f64,
    pub arrivals: f64,
    /// Sum of per-event position counts.
    pub atco_activity: u64,
}

impl MonthlyBucket {
    pub fn traffic(&self) -> f64 {
        self.departures + self.arrivals
    }
}

/// Twelve buckets plus the busiest months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// Slot 0 is the month after the current one, slot 11 the current month.
    pub buckets: Vec<MonthlyBucket>,
    /// `None` when no dated event fell into any bucket.
    pub month_with_most_traffic: Option<String>,
    pub month_with_most_atco_activity: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthTotals {
    departures: f64,
    arrivals: f64,
    atco_activity: u64,
    events: usize,
}

/// Running totals keyed by month number.
#[derive(Debug, Default)]
struct MonthAccumulator {
    months: [MonthTotals; 12],
}

impl MonthAccumulator {
    fn add_event(&mut self, date: NaiveDate, event: &Event) {
        let slot = &mut self.months[date.month0() as usize];
        slot.departures += event.departures;
        slot.arrivals += event.arrivals;
        slot.atco_activity += event.position_count() as u64;
        slot.events += 1;
    }

    fn get(&self, month: u32) -> MonthTotals {
        self.months[(month - 1) as usize]
    }

    fn is_empty(&self) -> bool {
        self.months.iter().all(|m| m.events == 0)
    }
}

/// Fold dated `events` into twelve month slots ordered to end at
/// `current_month` (`1..=12`).  Undated events are skipped.
pub fn bucket_by_month(events: &[Event], current_month: u32) -> MonthlySummary {
    let mut acc = MonthAccumulator::default();
    for event in events {
        if let Some(date) = event.date {
            acc.add_event(date, event);
        }
    }

    let buckets: Vec<MonthlyBucket> = rolling_month_order(current_month)
        .iter()
        .map(|&month| {
            let totals = acc.get(month);
            MonthlyBucket {
                month: month_label(month).to_string(),
                departures: totals.departures,
                arrivals: totals.arrivals,
                atco_activity: totals.atco_activity,
            }
        })
        .collect();

    if acc.is_empty() {
        return MonthlySummary {
            buckets,
            month_with_most_traffic: None,
            month_with_most_atco_activity: None,
        };
    }

    let busiest = first_max_by(&buckets, |b| b.traffic());
    let most_staffed = first_max_by(&buckets, |b| b.atco_activity as f64);
    MonthlySummary {
        month_with_most_traffic: busiest.map(|b| b.month.clone()),
        month_with_most_atco_activity: most_staffed.map(|b| b.month.clone()),
        buckets,
    }
}

/// First bucket holding the maximum key.  NaN keys never win.
fn first_max_by(buckets: &[MonthlyBucket], key: impl Fn(&MonthlyBucket) -> f64) -> Option<&MonthlyBucket> {
    let mut best: Option<(&MonthlyBucket, f64)> = None;
    for bucket in buckets {
        let value = key(bucket);
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((bucket, value)),
        }
    }
    best.map(|(bucket, _)| bucket)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
