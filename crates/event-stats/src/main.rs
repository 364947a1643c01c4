mod bootstrap;
mod output;

use anyhow::{Context, Result};
use stats_core::categories::CategoryConfig;
use stats_core::settings::Settings;
use stats_core::time_utils::ReportTimezone;
use stats_data::analysis::analyze_input;
use stats_runtime::orchestrator::StatsOrchestrator;

use crate::output::OutputFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Event Stats v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Window: {}, Format: {}, Timezone: {}",
        settings.window,
        settings.format,
        settings.timezone
    );

    let input = bootstrap::resolve_input(settings.input.as_deref())
        .context("No input found: pass --input <file-or-directory>")?;
    let config = CategoryConfig::load_or_default(settings.categories.as_deref())
        .context("Failed to load category configuration")?;
    let window = settings.time_window();
    let format = OutputFormat::from_name(&settings.format);

    if settings.watch {
        tracing::info!(
            "Watching {} every {}s",
            input.display(),
            settings.refresh_rate
        );

        let orchestrator = StatsOrchestrator::new(
            u64::from(settings.refresh_rate),
            input,
            window,
            config,
            settings.timezone.clone(),
        );
        let (mut rx, handle) = orchestrator.start();

        loop {
            tokio::select! {
                update = rx.recv() => match update {
                    Some(update) => {
                        tracing::info!(reason = ?update.reason, "report updated");
                        println!("{}", output::render(&update.report, format)?);
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; stopping watch task");
                    break;
                }
            }
        }
        handle.abort();
    } else {
        let today = ReportTimezone::resolve(&settings.timezone).today();
        let report = analyze_input(&input, window, &config, today)
            .with_context(|| format!("Failed to analyze {}", input.display()))?;
        print!("{}", output::render(&report, format)?);
        if format == OutputFormat::Json {
            println!();
        }
    }

    Ok(())
}
