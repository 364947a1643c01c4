use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::models::TimeWindow;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Movement and controller-staffing statistics for airport event records
#[derive(Parser, Debug, Clone)]
#[command(
    name = "event-stats",
    about = "Movement and controller-staffing statistics for airport event records",
    version
)]
pub struct Settings {
    /// Record file or directory of exported record files
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Time window
    #[arg(long, default_value = "all-time", value_parser = ["all-time", "rolling-year"])]
    pub window: String,

    /// JSON file overriding the category tables and ranges
    #[arg(long)]
    pub categories: Option<PathBuf>,

    /// Timezone used for "today" (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "summary", value_parser = ["summary", "json"])]
    pub format: String,

    /// Keep running and recompute whenever the input changes
    #[arg(long)]
    pub watch: bool,

    /// Input polling interval in seconds (1-60)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub refresh_rate: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}


/// Options remembered between runs in `~/.event-stats/last_used.json`.
///
/// Only analysis inputs are kept. `--watch`, logging flags and `--clear`
/// apply to a single run.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct RememberedParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
}

impl RememberedParams {
    pub fn default_path() -> PathBuf {
        Self::path_under(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn path_under(home: &Path) -> PathBuf {
        home.join(".event-stats").join("last_used.json")
    }

    /// A missing or unreadable file yields empty params.
    pub fn read(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Writes through a sibling temp file and a rename.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, body)?;
        std::fs::rename(&staging, path)
    }

    pub fn forget(path: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl From<&Settings> for RememberedParams {
    fn from(s: &Settings) -> Self {
        Self {
            input: s.input.clone(),
            window: Some(s.window.clone()),
            categories: s.categories.clone(),
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
            refresh_rate: Some(s.refresh_rate),
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parses the process arguments, fills unset options from the previous
    /// run and records the result for the next one.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &RememberedParams::default_path(),
        )
    }

    pub fn load_with_last_used_impl(args: Vec<OsString>, store: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args);
        let mut settings = match Settings::from_arg_matches(&matches) {
            Ok(s) => s,
            Err(e) => e.exit(),
        };

        if settings.clear {
            if let Err(e) = RememberedParams::forget(store) {
                tracing::warn!("Could not remove {}: {}", store.display(), e);
            }
            return settings.finalize();
        }

        let saved = RememberedParams::read(store);
        // Arg ids are field names, so `refresh_rate` keeps its underscore.
        fill(&matches, "input", &mut settings.input, saved.input.map(Some));
        fill(&matches, "window", &mut settings.window, saved.window);
        fill(&matches, "categories", &mut settings.categories, saved.categories.map(Some));
        fill(&matches, "timezone", &mut settings.timezone, saved.timezone);
        fill(&matches, "format", &mut settings.format, saved.format);
        fill(&matches, "refresh_rate", &mut settings.refresh_rate, saved.refresh_rate);

        let settings = settings.finalize();
        if let Err(e) = RememberedParams::from(&settings).write(store) {
            tracing::warn!("Could not save {}: {}", store.display(), e);
        }
        settings
    }

    /// The parsed time window. Unknown persisted values fall back to
    /// [`TimeWindow::AllTime`].
    pub fn time_window(&self) -> TimeWindow {
        self.window.parse().unwrap_or_default()
    }

    fn finalize(mut self) -> Self {
        if self.timezone == "auto" {
            self.timezone = crate::time_utils::get_system_timezone();
        }
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

/// Replaces `slot` with the remembered value unless `id` came from the
/// command line.
fn fill<T>(matches: &ArgMatches, id: &str, slot: &mut T, remembered: Option<T>) {
    if matches.value_source(id) == Some(ValueSource::CommandLine) {
        return;
    }
    if let Some(value) = remembered {
        *slot = value;
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
