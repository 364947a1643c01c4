use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Application directory, `~/.event-stats/`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".event-stats")
}

/// Ensure `~/.event-stats/` and `~/.event-stats/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI log-level name onto an [`EnvFilter`] directive.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `log_level` when set.  Output goes to `log_file` when
/// given, otherwise to stderr so that stdout carries only the report.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}

// ── Input discovery ────────────────────────────────────────────────────────────

/// Resolve the record input.
///
/// An explicit path is returned unchanged.  Otherwise the first existing of
/// `~/.event-stats/data/` and `~/.event-stats/events.json` is used.
pub fn resolve_input(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    discover_input_in(&app_dir())
}

fn discover_input_in(base: &Path) -> Option<PathBuf> {
    let candidates = [base.join("data"), base.join("events.json")];
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
