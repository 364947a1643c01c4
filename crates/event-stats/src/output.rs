//! Report rendering for stdout.

use std::fmt::Write;

use stats_core::formatting::format_number;
use stats_data::aggregator::UnknownCode;
use stats_data::analysis::StatsReport;
use stats_data::movement::PeakRecord;

const NO_DATA: &str = "No data available";

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl OutputFormat {
    /// Unknown names fall back to the summary.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Summary,
        }
    }
}

pub fn render(report: &StatsReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Summary => Ok(render_summary(report)),
    }
}

/// Plain-text summary of the scalar metrics and distributions.
pub fn render_summary(report: &StatsReport) -> String {
    let meta = &report.metadata;
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Window: {} (as of {}), {} of {} events",
        meta.window.as_str(),
        meta.reference_date,
        meta.events_in_window,
        meta.events_received
    );
    if meta.undated_events > 0 {
        let _ = writeln!(out, "Events with unreadable dates: {}", meta.undated_events);
    }
    let _ = writeln!(
        out,
        "Latest data: {}",
        summary
            .latest_data_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| NO_DATA.to_string())
    );

    if report.is_empty() {
        let _ = writeln!(out, "{NO_DATA}");
        return out;
    }

    let _ = writeln!(
        out,
        "Average global movements: {}",
        optional_number(summary.average_global_movements, 0)
    );
    let _ = writeln!(
        out,
        "Average departures: {}  Average arrivals: {}",
        optional_number(summary.average_departures, 1),
        optional_number(summary.average_arrivals, 1)
    );
    let _ = writeln!(out, "Max traffic: {}", peak(summary.max_traffic.as_ref()));
    let _ = writeln!(out, "Max departures: {}", peak(summary.max_departures.as_ref()));
    let _ = writeln!(out, "Max arrivals: {}", peak(summary.max_arrivals.as_ref()));
    let _ = writeln!(out, "Growth rate: {}", summary.growth_rate.formatted);
    match (report.trendline.slope, report.trendline.intercept) {
        (Some(m), Some(b)) => {
            let _ = writeln!(
                out,
                "Departure trend: {} per event (from {})",
                format_number(m, 2),
                format_number(b, 1)
            );
        }
        _ => {
            let _ = writeln!(out, "Departure trend: {NO_DATA}");
        }
    }
    let _ = writeln!(
        out,
        "Busiest month: {}  Most ATCO activity: {}",
        report.monthly.month_with_most_traffic.as_deref().unwrap_or(NO_DATA),
        report
            .monthly
            .month_with_most_atco_activity
            .as_deref()
            .unwrap_or(NO_DATA)
    );
    let _ = writeln!(out, "Parallel approaches: {}", report.parallel_approach_count);

    let categories = &report.categories;
    let _ = writeln!(out, "Configuration usage:");
    for c in &categories.config_usage {
        let _ = writeln!(out, "  {}: {}", c.label, c.count);
    }
    let _ = writeln!(out, "Primary positions:");
    for s in &categories.primary_activity {
        let _ = writeln!(out, "  {}: {}%", s.label, format_number(s.percentage, 1));
    }
    let _ = writeln!(out, "Secondary positions:");
    for c in &categories.secondary_activity {
        let _ = writeln!(out, "  {}: {}", c.label, c.count);
    }
    let _ = writeln!(out, "Monthly traffic:");
    for b in &report.monthly.buckets {
        let _ = writeln!(
            out,
            "  {}: {} dep / {} arr, {} ATCO",
            b.month,
            format_number(b.departures, 0),
            format_number(b.arrivals, 0),
            b.atco_activity
        );
    }

    if !categories.unknown_config_codes.is_empty() {
        let _ = writeln!(
            out,
            "Unknown configuration codes: {}",
            unknown_list(&categories.unknown_config_codes)
        );
    }
    if !categories.unknown_position_codes.is_empty() {
        let _ = writeln!(
            out,
            "Unknown position codes: {}",
            unknown_list(&categories.unknown_position_codes)
        );
    }

    out
}

fn optional_number(value: Option<f64>, decimals: u32) -> String {
    value
        .map(|v| format_number(v, decimals))
        .unwrap_or_else(|| NO_DATA.to_string())
}

fn peak(record: Option<&PeakRecord>) -> String {
    match record {
        None => NO_DATA.to_string(),
        Some(p) => match p.date {
            Some(date) => format!("{} on {}", format_number(p.value, 0), date),
            None => format_number(p.value, 0),
        },
    }
}

fn unknown_list(codes: &[UnknownCode]) -> String {
    codes
        .iter()
        .map(|u| format!("{} (x{})", u.code, u.count))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
