//! Single combo processor - orchestration layer
//!
//! Pages through the search results of one (position, location) pair and
//! hands every posting to the campaign, until the results run out or the
//! combo's wall-clock budget is spent. The budget is only checked between
//! jobs, so an abandoned combo never leaves a half-written ledger row.

use crate::infrastructure::{PaceStep, PageDriver};
use crate::models::SearchCombo;
use crate::orchestrator::campaign::{Campaign, JobDisposition};
use crate::workflow::{ApplyCtx, ApplyOutcome};
use std::collections::HashSet;
use tokio::time::Instant;
use tracing::{error, info};

/// Per-combo statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ComboStats {
    pub found: usize,
    pub submitted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pages: usize,
    /// Stopped by the time budget rather than running out of results
    pub budget_exhausted: bool,
}

impl ComboStats {
    fn tally(&mut self, disposition: &JobDisposition) {
        match disposition {
            JobDisposition::Skipped(_) => self.skipped += 1,
            JobDisposition::Finished(ApplyOutcome::Submitted) => self.submitted += 1,
            JobDisposition::Finished(ApplyOutcome::Closed(_)) => self.skipped += 1,
            JobDisposition::Finished(ApplyOutcome::Failed(_)) => self.failed += 1,
        }
    }
}

/// Process one combo
///
/// Pages are requested at `0, jobs_per_page, 2 × jobs_per_page, …` until a
/// page shows no cards, the search fails, or the budget runs out.
///
/// # Arguments
/// - `campaign`: lends the driver, services and skip set
/// - `combo`: the (position, location) to search
///
/// # Returns
/// Counts for this combo; `budget_exhausted` tells a timed-out combo apart
pub async fn process_combo<D: PageDriver>(
    campaign: &mut Campaign<'_, D>,
    combo: &SearchCombo,
) -> ComboStats {
    let budget = campaign.settings.combo_budget;
    let deadline = Instant::now() + budget;
    let page_size = campaign.settings.jobs_per_page;

    let mut stats = ComboStats::default();
    let mut visited = HashSet::new();
    let mut offset = 0;
    let mut job_index = 0;

    'pages: loop {
        let now = Instant::now();
        if now >= deadline {
            stats.budget_exhausted = true;
            break;
        }
        info!(
            "⏳ {} minutes left in this search",
            (deadline - now).as_secs() / 60
        );

        let page = match campaign
            .search
            .search(campaign.driver, combo, offset, &mut visited)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                error!("❌ search failed for {} (offset {}): {}", combo, offset, e);
                break;
            }
        };
        if page.is_last() {
            info!("🔍 no more postings for {}", combo);
            break;
        }

        stats.pages += 1;
        stats.found += page.postings.len();
        info!(
            "✓ {} new postings on page {} ({} cards)",
            page.postings.len(),
            stats.pages,
            page.cards
        );
        campaign.pacing.pause(PaceStep::AfterSearch).await;

        for job in &page.postings {
            if Instant::now() >= deadline {
                stats.budget_exhausted = true;
                break 'pages;
            }
            job_index += 1;
            let ctx = ApplyCtx::new(job_index, job, combo);

            let disposition = campaign.handle_job(job, &ctx).await;
            stats.tally(&disposition);
            if matches!(disposition, JobDisposition::Finished(_)) {
                campaign.pacing.pause(PaceStep::BetweenJobs).await;
            }
        }

        offset += page_size;
    }

    if stats.budget_exhausted {
        info!("⏰ time budget for {} used up, moving on", combo);
    }
    stats
}
