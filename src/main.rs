use anyhow::Result;
use clap::Parser;
use easy_apply::utils::logging;
use easy_apply::{App, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "easy_apply", version, about = "Easy-apply job application bot")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "EASY_APPLY_CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // load config
    let config = Config::load(&cli.config)?;

    // init logging
    let (_guard, log_path) = logging::init(&config.log_dir)?;
    tracing::info!("📝 logging to {}", log_path.display());

    // initialize and run
    let _stats = App::initialize(config).await?.run().await?;

    Ok(())
}
