/// Logging utilities
///
/// Subscriber setup plus the banner helpers used by the orchestration layer
use crate::config::Config;
use crate::models::SearchCombo;
use crate::orchestrator::{CampaignStats, ComboStats};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: stderr plus one file per run
///
/// # Arguments
/// - `log_dir`: directory for `<timestamp>_applyJobs.log`, created if missing
///
/// # Returns
/// The writer guard (keep it alive until exit) and the log file path
pub fn init(log_dir: &Path) -> Result<(WorkerGuard, PathBuf)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory: {}", log_dir.display()))?;

    let file_name = format!("{}_applyJobs.log", Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let path = log_dir.join(&file_name);
    let (writer, guard) = tracing_appender::non_blocking(rolling::never(log_dir, file_name));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    Ok((guard, path))
}

/// Log the effective settings at startup
///
/// The password is never logged
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 easy apply bot starting");
    info!("👤 account: {}", config.username);
    info!(
        "📋 {} positions × {} locations, levels: {}",
        config.positions.len(),
        config.locations.len(),
        config
            .experience_level
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!(
        "⏱️ {} min per search, up to {} searches",
        config.limits.combo_budget_minutes, config.limits.max_combos
    );
    info!("📄 ledger: {}", config.output_file.display());
    info!("💬 answers: {}", config.qa_file.display());
    if let Some(resume) = &config.uploads.resume {
        info!("📎 resume: {}", resume.display());
    }
    if let Some(letter) = &config.uploads.cover_letter {
        info!("📎 cover letter: {}", letter.display());
    }
    info!("{}", "=".repeat(60));
}

/// Log the start of one combo
///
/// # Arguments
/// - `index`: 1-based combo number
/// - `total`: combos in this run
pub fn log_combo_start(index: usize, total: usize, combo: &SearchCombo) {
    info!("\n{}", "=".repeat(60));
    info!("🔍 search {}/{}: {}", index, total, combo);
    info!("{}", "=".repeat(60));
}

pub fn log_combo_complete(index: usize, combo: &SearchCombo, stats: &ComboStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ search {} done ({}): {} found on {} pages, {} submitted, {} failed, {} skipped",
        index, combo, stats.found, stats.pages, stats.submitted, stats.failed, stats.skipped
    );
    info!("{}", "─".repeat(60));
}

/// Print the run summary
pub fn print_final_stats(stats: &CampaignStats, ledger_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 run complete");
    info!("finished at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("🔍 searches: {}", stats.combos);
    info!("📋 postings seen: {}", stats.found);
    info!("✅ submitted: {}", stats.submitted);
    info!("❌ failed: {}", stats.failed);
    info!("⏭️ skipped: {}", stats.skipped);
    info!("{}", "=".repeat(60));
    info!("\nledger saved to: {}", ledger_path.display());
}

/// Shorten long text for log lines
///
/// # Arguments
/// - `text`: original text
/// - `max_len`: maximum number of characters kept
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
