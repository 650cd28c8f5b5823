//! Application - orchestration layer
//!
//! The only owner of the browser. Starts or attaches to it, logs in, wires
//! the services together and hands the run to the campaign driver.

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{pacing, ChromiumDriver, DelayPolicy};
use crate::orchestrator::campaign::{
    build_combos, Campaign, CampaignParts, CampaignSettings, CampaignStats,
};
use crate::services::{answer_store, login, AnswerStore, AppliedLedger, Credentials, JobSearch};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{ApplyFlow, ApplySettings};
use anyhow::{Context, Result};
use chromiumoxide::Browser;
use std::sync::Arc;
use tracing::info;

/// Application main structure
pub struct App {
    config: Config,
    _browser: Browser,
    driver: ChromiumDriver,
}

impl App {
    /// Start or attach to the browser
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = match config.browser.debug_port {
            Some(port) => browser::connect_to_browser_and_page(port).await?,
            None => browser::launch_browser(&config.browser).await?,
        };

        Ok(Self {
            config,
            _browser: browser,
            driver: ChromiumDriver::new(page),
        })
    }

    /// Log in, then apply through every combo
    pub async fn run(&self) -> Result<CampaignStats> {
        let config = &self.config;
        let pacing: Arc<dyn DelayPolicy> = Arc::from(pacing::from_settings(&config.pacing));

        let credentials = Credentials::resolve(config)?;
        login(
            &self.driver,
            &*pacing,
            &config.browser.login_url,
            &credentials,
            config.limits.page_load_timeout(),
        )
        .await
        .context("cannot continue without a signed-in session")?;

        let answers = AnswerStore::load(&config.qa_file)
            .with_context(|| format!("cannot open answer store {}", config.qa_file.display()))?;
        let parts = CampaignParts {
            search: JobSearch::new(
                &config.browser.search_url,
                config.experience_level.clone(),
                config.limits.page_load_timeout(),
            )?,
            flow: ApplyFlow::new(
                ApplySettings::from_config(config),
                answer_store::source_from_config(config),
                pacing.clone(),
            ),
            ledger: AppliedLedger::new(&config.output_file),
            answers,
            pacing,
        };

        let mut campaign = Campaign::new(
            &self.driver,
            parts,
            CampaignSettings::from_config(config),
            chrono::Local::now().naive_local(),
        );

        let combos = build_combos(
            &config.positions,
            &config.locations,
            config.limits.max_combos,
            &mut rand::thread_rng(),
        );
        info!("📋 {} search combos queued", combos.len());

        let stats = campaign.run(combos).await;
        print_final_stats(&stats, &config.output_file);
        Ok(stats)
    }
}
