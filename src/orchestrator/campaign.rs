//! Campaign driver - orchestration layer
//!
//! ## Responsibilities
//!
//! 1. **Combos**: positions × locations, shuffled, no repeats, capped
//! 2. **Skip set**: job ids from the ledger's recency window plus everything
//!    attempted during this run
//! 3. **Per job**: skip / blacklist checks, then the form walker, then one
//!    ledger row
//! 4. **Statistics**: per combo and for the whole run
//!
//! Pagination and the per-combo time budget live in `combo_processor`.

use crate::config::Config;
use crate::infrastructure::{DelayPolicy, PageDriver};
use crate::models::{AppliedRecord, ApplyResult, JobPosting, SearchCombo};
use crate::orchestrator::combo_processor::{self, ComboStats};
use crate::services::{AnswerStore, AppliedLedger, JobSearch};
use crate::utils::logging::{log_combo_complete, log_combo_start};
use crate::workflow::{ApplyCtx, ApplyFlow, ApplyOutcome};
use chrono::{Local, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Build the shuffled, de-duplicated combo list
///
/// # Returns
/// `min(distinct positions × distinct locations, cap)` combos, no repeats
pub fn build_combos<R: Rng + ?Sized>(
    positions: &[String],
    locations: &[String],
    cap: usize,
    rng: &mut R,
) -> Vec<SearchCombo> {
    let mut seen = HashSet::new();
    let mut combos: Vec<SearchCombo> = positions
        .iter()
        .flat_map(|p| locations.iter().map(move |l| SearchCombo::new(p.clone(), l.clone())))
        .filter(|combo| seen.insert(combo.clone()))
        .collect();
    combos.shuffle(rng);
    combos.truncate(cap);
    combos
}

/// Why a posting was passed over without opening it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// In the ledger's recency window or already attempted this run
    AlreadyApplied,
    BlacklistedCompany,
    BlacklistedTitle,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyApplied => write!(f, "already applied"),
            SkipReason::BlacklistedCompany => write!(f, "blacklisted company"),
            SkipReason::BlacklistedTitle => write!(f, "blacklisted title"),
        }
    }
}

/// What happened to one posting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDisposition {
    Skipped(SkipReason),
    Finished(ApplyOutcome),
}

#[derive(Debug, Clone)]
pub struct CampaignSettings {
    pub combo_budget: Duration,
    pub max_combos: usize,
    pub jobs_per_page: usize,
    pub dedup_window: chrono::Duration,
    pub blacklist: Vec<String>,
    pub blacklist_titles: Vec<String>,
}

impl CampaignSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            combo_budget: config.limits.combo_budget(),
            max_combos: config.limits.max_combos,
            jobs_per_page: config.limits.jobs_per_page.max(1),
            dedup_window: config.limits.dedup_window(),
            blacklist: config.blacklist.clone(),
            blacklist_titles: config.blacklist_titles.clone(),
        }
    }
}

/// Services the campaign takes ownership of
pub struct CampaignParts {
    pub search: JobSearch,
    pub flow: ApplyFlow,
    pub ledger: AppliedLedger,
    pub answers: AnswerStore,
    pub pacing: Arc<dyn DelayPolicy>,
}

/// Run-wide totals
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CampaignStats {
    pub combos: usize,
    pub found: usize,
    pub submitted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CampaignStats {
    fn add(&mut self, combo: &ComboStats) {
        self.combos += 1;
        self.found += combo.found;
        self.submitted += combo.submitted;
        self.failed += combo.failed;
        self.skipped += combo.skipped;
    }
}

/// Campaign driver
///
/// Owns the ledger and the answer store for the whole run; borrows the page.
pub struct Campaign<'a, D: PageDriver> {
    pub(crate) driver: &'a D,
    pub(crate) search: JobSearch,
    pub(crate) flow: ApplyFlow,
    pub(crate) ledger: AppliedLedger,
    pub(crate) answers: AnswerStore,
    pub(crate) pacing: Arc<dyn DelayPolicy>,
    pub(crate) settings: CampaignSettings,
    skip: HashSet<String>,
}

impl<'a, D: PageDriver> Campaign<'a, D> {
    /// Assemble a campaign and load the recently-applied skip set
    ///
    /// # Arguments
    /// - `driver`: the page every service works on
    /// - `parts`: search, walker, ledger, answers and pacing
    /// - `settings`: limits and blacklists
    /// - `now`: anchors the ledger's recency window
    pub fn new(
        driver: &'a D,
        parts: CampaignParts,
        settings: CampaignSettings,
        now: NaiveDateTime,
    ) -> Self {
        let skip = parts.ledger.load_recent(now, settings.dedup_window);
        Self {
            driver,
            search: parts.search,
            flow: parts.flow,
            ledger: parts.ledger,
            answers: parts.answers,
            pacing: parts.pacing,
            settings,
            skip,
        }
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    /// Work through `combos` in the given order, at most `max_combos`
    ///
    /// # Returns
    /// Totals over every combo processed
    pub async fn run(&mut self, combos: Vec<SearchCombo>) -> CampaignStats {
        let total = combos.len().min(self.settings.max_combos);
        let mut stats = CampaignStats::default();

        for (index, combo) in combos.iter().take(total).enumerate() {
            log_combo_start(index + 1, total, combo);
            let combo_stats = combo_processor::process_combo(self, combo).await;
            log_combo_complete(index + 1, combo, &combo_stats);
            stats.add(&combo_stats);
        }

        stats
    }

    /// Reason to pass over `job` without opening it, if any
    pub fn skip_reason(&self, job: &JobPosting) -> Option<SkipReason> {
        if self.skip.contains(&job.job_id) {
            return Some(SkipReason::AlreadyApplied);
        }
        let company = job.company.trim();
        if self
            .settings
            .blacklist
            .iter()
            .any(|b| b.trim().eq_ignore_ascii_case(company))
        {
            return Some(SkipReason::BlacklistedCompany);
        }
        let title = job.title.to_lowercase();
        if self
            .settings
            .blacklist_titles
            .iter()
            .map(|t| t.trim().to_lowercase())
            .any(|t| !t.is_empty() && title.contains(&t))
        {
            return Some(SkipReason::BlacklistedTitle);
        }
        None
    }

    /// Skip checks, form walker and ledger row for one posting
    pub(crate) async fn handle_job(&mut self, job: &JobPosting, ctx: &ApplyCtx) -> JobDisposition {
        if let Some(reason) = self.skip_reason(job) {
            info!("{} ⏭️ skipped: {}", ctx, reason);
            // recently-applied ids already have their row
            if reason != SkipReason::AlreadyApplied {
                self.record(AppliedRecord::new(now(), job, false, ApplyResult::Skipped));
            }
            return JobDisposition::Skipped(reason);
        }

        info!("{} 🚀 applying", ctx);
        let outcome = self
            .flow
            .run(self.driver, &mut self.answers, job, ctx)
            .await;
        info!("{} outcome: {}", ctx, outcome);

        self.record(AppliedRecord::new(
            now(),
            job,
            outcome.attempted(),
            outcome.result(),
        ));
        self.skip.insert(job.job_id.clone());
        JobDisposition::Finished(outcome)
    }

    fn record(&self, record: AppliedRecord) {
        if let Err(e) = self.ledger.append(&record) {
            error!("❌ could not write ledger row for {}: {}", record.job_id, e);
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
