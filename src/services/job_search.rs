//! Job search - business capability layer
//!
//! Only responsible for "give me one page of postings"; advancing pages is
//! the caller's job.

use crate::error::{AppError, AppResult};
use crate::infrastructure::{Condition, Locator, PageDriver};
use crate::models::{ExperienceLevel, JobPosting, SearchCombo};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// One results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Postings not returned earlier for the same combo
    pub postings: Vec<JobPosting>,
    /// Job cards shown, repeats included
    pub cards: usize,
}

impl SearchPage {
    /// No cards at all: the search has no further pages
    pub fn is_last(&self) -> bool {
        self.cards == 0
    }
}

/// Job search paginator
pub struct JobSearch {
    base_url: Url,
    experience_levels: Vec<ExperienceLevel>,
    load_timeout: Duration,
}

impl JobSearch {
    /// Search bound to one site's results page
    ///
    /// # Arguments
    /// - `base_url`: search page url without query
    /// - `experience_levels`: sent as the `f_E` filter, none means no filter
    /// - `load_timeout`: how long to wait for the results list
    ///
    /// # Returns
    /// Error if `base_url` does not parse
    pub fn new(
        base_url: &str,
        experience_levels: Vec<ExperienceLevel>,
        load_timeout: Duration,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Other(format!("invalid search url '{}': {}", base_url, e)))?;
        Ok(Self {
            base_url,
            experience_levels,
            load_timeout,
        })
    }

    /// Search page url for one combo, restricted to easy-apply postings
    ///
    /// # Arguments
    /// - `combo`: fills `keywords` and `location`
    /// - `offset`: index of the first card, a multiple of the page size
    ///
    /// # Examples
    /// ```
    /// use easy_apply::models::{ExperienceLevel, SearchCombo};
    /// use easy_apply::services::JobSearch;
    /// use std::time::Duration;
    ///
    /// let search = JobSearch::new(
    ///     "https://jobs.test/jobs/search/",
    ///     vec![ExperienceLevel::EntryLevel],
    ///     Duration::from_secs(5),
    /// )
    /// .unwrap();
    /// let url = search.search_url(&SearchCombo::new("Rust Engineer", "Remote"), 25);
    ///
    /// let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    /// assert!(query.contains(&("f_AL".to_string(), "true".to_string())));
    /// assert!(query.contains(&("keywords".to_string(), "Rust Engineer".to_string())));
    /// assert!(query.contains(&("start".to_string(), "25".to_string())));
    /// assert!(query.contains(&("f_E".to_string(), "2".to_string())));
    /// ```
    pub fn search_url(&self, combo: &SearchCombo, offset: usize) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("f_AL", "true")
                .append_pair("keywords", &combo.position)
                .append_pair("location", &combo.location)
                .append_pair("start", &offset.to_string());
            if !self.experience_levels.is_empty() {
                let levels = self
                    .experience_levels
                    .iter()
                    .map(|level| level.code().to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                query.append_pair("f_E", &levels);
            }
        }
        url
    }

    /// One page of postings not yet seen for this combo
    ///
    /// # Arguments
    /// - `offset`: value of the `start` query parameter
    /// - `visited`: ids already returned for the running combo; new ids are added
    ///
    /// # Returns
    /// The page's new postings plus how many cards it showed. A page whose
    /// cards were all seen before has `cards > 0` and no postings; only
    /// `cards == 0` means the results ran out.
    pub async fn search<D: PageDriver>(
        &self,
        driver: &D,
        combo: &SearchCombo,
        offset: usize,
        visited: &mut HashSet<String>,
    ) -> AppResult<SearchPage> {
        let url = self.search_url(combo, offset);
        driver.navigate(url.as_str()).await?;

        let loaded = driver
            .wait_until(&Condition::Present(Locator::SearchResults), self.load_timeout)
            .await?;
        if !loaded {
            info!("🔍 no results list for {} (offset {})", combo, offset);
            return Ok(SearchPage::default());
        }

        let cards = driver.find_all(Locator::JobCard).await?;
        let mut postings = Vec::new();
        for card in &cards {
            let Some(job_id) = driver.attribute(card, "data-job-id").await? else {
                continue;
            };
            let job_id = job_id.trim().to_string();
            if job_id.is_empty() || !visited.insert(job_id.clone()) {
                continue;
            }

            let title = first_text(driver, card, Locator::JobCardTitle).await?;
            let company = first_text(driver, card, Locator::JobCardCompany).await?;
            postings.push(JobPosting {
                job_id,
                title,
                company,
            });
        }

        debug!(
            "{} cards on page, {} new postings ({} offset {})",
            cards.len(),
            postings.len(),
            combo,
            offset
        );
        Ok(SearchPage {
            postings,
            cards: cards.len(),
        })
    }
}

async fn first_text<D: PageDriver>(
    driver: &D,
    parent: &D::Element,
    locator: Locator,
) -> AppResult<String> {
    match driver.find_in(parent, locator).await?.first() {
        Some(element) => driver.text(element).await,
        None => Ok(String::new()),
    }
}
