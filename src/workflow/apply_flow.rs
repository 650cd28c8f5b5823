//! Easy-apply form walker - workflow layer
//!
//! Defines the complete flow for one job:
//! 1. open the posting and the apply dialog (no dialog → closed)
//! 2. walk however many form sections appear, answering every field
//! 3. submit
//!
//! Every path ends in exactly one [`ApplyOutcome`]; faults from the page or
//! the answer store become `Failed(Unexpected)` instead of escaping.

use crate::config::{Config, Uploads};
use crate::error::AppResult;
use crate::infrastructure::{Condition, DelayPolicy, Locator, PaceStep, PageDriver};
use crate::models::{ApplyResult, JobPosting};
use crate::services::{AnswerSource, AnswerStore};
use crate::workflow::apply_ctx::ApplyCtx;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Why a job ended without applying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    NoEasyApply,
}

/// Why a job attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Inline error still shown after one corrective pass
    Validation,
    /// No step control appeared after a transition
    Timeout,
    MaxStepsExceeded,
    /// Missing control, challenge page, driver or file fault
    Unexpected(String),
}

/// Terminal state of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Submitted,
    Closed(CloseReason),
    Failed(FailureReason),
}

impl ApplyOutcome {
    /// Ledger result column
    pub fn result(&self) -> ApplyResult {
        match self {
            ApplyOutcome::Submitted => ApplyResult::Success,
            ApplyOutcome::Closed(_) => ApplyResult::Skipped,
            ApplyOutcome::Failed(_) => ApplyResult::Failure,
        }
    }

    /// The apply dialog was opened
    pub fn attempted(&self) -> bool {
        !matches!(self, ApplyOutcome::Closed(_))
    }
}

impl Display for ApplyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyOutcome::Submitted => write!(f, "submitted"),
            ApplyOutcome::Closed(CloseReason::NoEasyApply) => write!(f, "closed (no easy apply)"),
            ApplyOutcome::Failed(FailureReason::Validation) => write!(f, "failed (validation)"),
            ApplyOutcome::Failed(FailureReason::Timeout) => write!(f, "failed (timeout)"),
            ApplyOutcome::Failed(FailureReason::MaxStepsExceeded) => {
                write!(f, "failed (max steps exceeded)")
            }
            ApplyOutcome::Failed(FailureReason::Unexpected(msg)) => {
                write!(f, "failed (unexpected: {})", msg)
            }
        }
    }
}

/// Knobs of the form walker
#[derive(Debug, Clone)]
pub struct ApplySettings {
    /// Posting url prefix, the job id is appended
    pub job_url: String,
    pub uploads: Uploads,
    pub max_steps: usize,
    pub step_timeout: Duration,
    pub unfollow_companies: bool,
}

impl ApplySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            job_url: config.browser.job_url.clone(),
            uploads: config.uploads.clone(),
            max_steps: config.limits.max_steps,
            step_timeout: config.limits.step_timeout(),
            unfollow_companies: config.unfollow_companies,
        }
    }

    fn job_url(&self, job_id: &str) -> String {
        if self.job_url.ends_with('/') {
            format!("{}{}/", self.job_url, job_id)
        } else {
            format!("{}/{}/", self.job_url, job_id)
        }
    }
}

/// Easy-apply form walker
///
/// - owns how questions get answered and how long to pause
/// - does not own the page or the answer store; both are lent per job
/// - does not write the ledger
pub struct ApplyFlow {
    settings: ApplySettings,
    source: Box<dyn AnswerSource>,
    pacing: Arc<dyn DelayPolicy>,
}

impl ApplyFlow {
    /// # Arguments
    /// - `settings`: job url, uploads and step limits
    /// - `source`: asked for answers the store does not have
    /// - `pacing`: pauses between form actions
    pub fn new(
        settings: ApplySettings,
        source: Box<dyn AnswerSource>,
        pacing: Arc<dyn DelayPolicy>,
    ) -> Self {
        Self {
            settings,
            source,
            pacing,
        }
    }

    /// Walk one posting's apply dialog from open to submit
    ///
    /// Never returns an error: anything unexpected is folded into
    /// `Failed(Unexpected)` so the campaign can record it and move on.
    ///
    /// # Arguments
    /// - `driver`: the page to work on
    /// - `answers`: read for known questions, updated with new ones
    /// - `job`: the posting to open
    /// - `ctx`: log prefix for this job
    ///
    /// # Returns
    /// Exactly one outcome for the posting
    pub async fn run<D: PageDriver>(
        &self,
        driver: &D,
        answers: &mut AnswerStore,
        job: &JobPosting,
        ctx: &ApplyCtx,
    ) -> ApplyOutcome {
        match self.walk(driver, answers, job, ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} ❌ abandoned: {}", ctx, e);
                ApplyOutcome::Failed(FailureReason::Unexpected(e.to_string()))
            }
        }
    }

    async fn walk<D: PageDriver>(
        &self,
        driver: &D,
        answers: &mut AnswerStore,
        job: &JobPosting,
        ctx: &ApplyCtx,
    ) -> AppResult<ApplyOutcome> {
        driver.navigate(&self.settings.job_url(&job.job_id)).await?;
        self.pacing.pause(PaceStep::AfterNavigation).await;

        let Some(apply_button) = driver.find(Locator::EasyApplyButton).await? else {
            info!("{} no easy apply button", ctx);
            return Ok(ApplyOutcome::Closed(CloseReason::NoEasyApply));
        };
        self.pacing.pause(PaceStep::BeforeClick).await;
        driver.click(&apply_button).await?;
        self.pacing.pause(PaceStep::BetweenFields).await;

        let mut steps = 0;
        loop {
            if driver.is_present(Locator::TwoFactorChallenge).await? {
                warn!("{} ⚠️ account challenge shown", ctx);
                return Ok(ApplyOutcome::Failed(FailureReason::Unexpected(
                    "account challenge".to_string(),
                )));
            }

            if let Some(submit) = driver.find(Locator::SubmitButton).await? {
                return self.submit(driver, &submit, ctx).await;
            }

            if steps >= self.settings.max_steps {
                warn!("{} ⚠️ gave up after {} steps", ctx, steps);
                return Ok(ApplyOutcome::Failed(FailureReason::MaxStepsExceeded));
            }

            let Some(control) = step_control(driver).await? else {
                let state = driver.page_state().await?;
                warn!("{} ⚠️ no next/review control at {}", ctx, state.url);
                return Ok(ApplyOutcome::Failed(FailureReason::Unexpected(format!(
                    "no step control at {}",
                    state.url
                ))));
            };
            steps += 1;
            debug!("{} step {}", ctx, steps);

            self.fill_section(driver, answers, false).await?;
            self.pacing.pause(PaceStep::BeforeClick).await;
            driver.click(&control).await?;

            if driver.is_present(Locator::ErrorFeedback).await? {
                warn!("{} ⚠️ validation error on step {}, correcting", ctx, steps);
                self.fill_section(driver, answers, true).await?;

                let Some(control) = step_control(driver).await? else {
                    return Ok(ApplyOutcome::Failed(FailureReason::Validation));
                };
                self.pacing.pause(PaceStep::BeforeClick).await;
                driver.click(&control).await?;

                if driver.is_present(Locator::ErrorFeedback).await? {
                    warn!("{} ⚠️ step {} still invalid", ctx, steps);
                    return Ok(ApplyOutcome::Failed(FailureReason::Validation));
                }
            }

            let advanced = driver
                .wait_until(
                    &Condition::AnyPresent(vec![
                        Locator::NextButton,
                        Locator::ReviewButton,
                        Locator::SubmitButton,
                    ]),
                    self.settings.step_timeout,
                )
                .await?;
            if !advanced {
                warn!("{} ⚠️ timed out after step {}", ctx, steps);
                return Ok(ApplyOutcome::Failed(FailureReason::Timeout));
            }
        }
    }

    async fn submit<D: PageDriver>(
        &self,
        driver: &D,
        submit: &D::Element,
        ctx: &ApplyCtx,
    ) -> AppResult<ApplyOutcome> {
        if self.settings.unfollow_companies {
            if let Some(follow) = driver.find(Locator::FollowCompany).await? {
                driver.click(&follow).await?;
            }
        }
        self.pacing.pause(PaceStep::BeforeClick).await;
        driver.click(submit).await?;
        self.pacing.pause(PaceStep::AfterNavigation).await;
        info!("{} 📤 application submitted", ctx);
        Ok(ApplyOutcome::Submitted)
    }

    // ========== filling one section ==========

    /// Answer every visible field
    ///
    /// `force` retypes text inputs that already hold a value (corrective pass).
    async fn fill_section<D: PageDriver>(
        &self,
        driver: &D,
        answers: &mut AnswerStore,
        force: bool,
    ) -> AppResult<()> {
        self.fill_uploads(driver).await?;

        for group in driver.find_all(Locator::FieldGroup).await? {
            let question = question_text(driver, &group).await?;

            let radios = driver.find_in(&group, Locator::RadioInput).await?;
            if !radios.is_empty() {
                self.answer_radio(driver, answers, &question, &radios).await?;
            } else if let Some(list) = driver
                .find_in(&group, Locator::MultiSelect)
                .await?
                .into_iter()
                .next()
            {
                self.answer_select(driver, answers, &question, &list).await?;
            } else if let Some(input) = driver
                .find_in(&group, Locator::TextInput)
                .await?
                .into_iter()
                .next()
            {
                self.answer_text(driver, answers, &question, &input, force)
                    .await?;
            }
            self.pacing.pause(PaceStep::BetweenFields).await;
        }
        Ok(())
    }

    async fn fill_uploads<D: PageDriver>(&self, driver: &D) -> AppResult<()> {
        let slots: [(Locator, &Option<PathBuf>); 2] = [
            (Locator::UploadResume, &self.settings.uploads.resume),
            (Locator::UploadCoverLetter, &self.settings.uploads.cover_letter),
        ];
        for (locator, path) in slots {
            let Some(input) = driver.find(locator).await? else {
                continue;
            };
            match path {
                Some(path) => {
                    driver.upload(&input, path).await?;
                    debug!("uploaded {} for {:?}", path.display(), locator);
                }
                None => debug!("no file configured for {:?}, leaving it", locator),
            }
        }
        Ok(())
    }

    /// Known answer if it names an option, else the first option with a value
    async fn answer_radio<D: PageDriver>(
        &self,
        driver: &D,
        answers: &mut AnswerStore,
        question: &str,
        radios: &[D::Element],
    ) -> AppResult<()> {
        let mut options = Vec::with_capacity(radios.len());
        for radio in radios {
            let value = driver.attribute(radio, "value").await?.unwrap_or_default();
            options.push((value.trim().to_string(), radio));
        }

        let known = answers.get(question).map(str::to_string);
        let chosen = known
            .as_deref()
            .and_then(|k| options.iter().find(|(v, _)| v.eq_ignore_ascii_case(k)))
            .or_else(|| options.iter().find(|(v, _)| !v.is_empty()));

        let Some((value, radio)) = chosen else {
            debug!("radio group '{}' has no usable option", question);
            return Ok(());
        };
        driver.click(radio).await?;
        if known.is_none() && !question.is_empty() {
            answers.record(question, value)?;
        }
        Ok(())
    }

    /// Known answer if it names an option, else the first real option
    async fn answer_select<D: PageDriver>(
        &self,
        driver: &D,
        answers: &mut AnswerStore,
        question: &str,
        list: &D::Element,
    ) -> AppResult<()> {
        let mut options = Vec::new();
        for option in driver.find_in(list, Locator::SelectOption).await? {
            let text = driver.text(&option).await?;
            let value = driver
                .attribute(&option, "value")
                .await?
                .unwrap_or_else(|| text.clone());
            options.push((text, value));
        }

        let known = answers.get(question).map(str::to_string);
        let chosen = known
            .as_deref()
            .and_then(|k| {
                options
                    .iter()
                    .find(|(text, value)| text.eq_ignore_ascii_case(k) || value == k)
            })
            .or_else(|| options.iter().find(|(text, value)| !is_placeholder(text, value)));

        let Some((text, value)) = chosen else {
            debug!("select '{}' has no usable option", question);
            return Ok(());
        };
        driver.select(list, value).await?;
        if known.is_none() && !question.is_empty() {
            answers.record(question, text)?;
        }
        Ok(())
    }

    async fn answer_text<D: PageDriver>(
        &self,
        driver: &D,
        answers: &mut AnswerStore,
        question: &str,
        input: &D::Element,
        force: bool,
    ) -> AppResult<()> {
        if !force {
            let current = driver.attribute(input, "value").await?.unwrap_or_default();
            if !current.trim().is_empty() {
                return Ok(());
            }
        }
        if question.is_empty() {
            debug!("text input without a label, leaving it");
            return Ok(());
        }

        let answer = answers.get_or_prompt(question, self.source.as_ref()).await?;
        driver.type_text(input, &answer).await
    }
}

/// Next if present, else review
async fn step_control<D: PageDriver>(driver: &D) -> AppResult<Option<D::Element>> {
    if let Some(next) = driver.find(Locator::NextButton).await? {
        return Ok(Some(next));
    }
    driver.find(Locator::ReviewButton).await
}

/// Label text of a field group, whitespace collapsed
async fn question_text<D: PageDriver>(driver: &D, group: &D::Element) -> AppResult<String> {
    let raw = match driver.find_in(group, Locator::FieldLabel).await?.first() {
        Some(label) => driver.text(label).await?,
        None => driver.text(group).await?,
    };
    Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn is_placeholder(text: &str, value: &str) -> bool {
    let text = text.trim();
    text.is_empty() || value.trim().is_empty() || text.to_ascii_lowercase().starts_with("select")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_maps_to_ledger_result() {
        assert_eq!(ApplyOutcome::Submitted.result(), ApplyResult::Success);
        assert_eq!(
            ApplyOutcome::Closed(CloseReason::NoEasyApply).result(),
            ApplyResult::Skipped
        );
        for reason in [
            FailureReason::Validation,
            FailureReason::Timeout,
            FailureReason::MaxStepsExceeded,
            FailureReason::Unexpected("x".into()),
        ] {
            let outcome = ApplyOutcome::Failed(reason);
            assert_eq!(outcome.result(), ApplyResult::Failure);
            assert!(outcome.attempted());
        }
        assert!(!ApplyOutcome::Closed(CloseReason::NoEasyApply).attempted());
    }

    #[test]
    fn placeholder_options_are_skipped() {
        assert!(is_placeholder("Select an option", "Select an option"));
        assert!(is_placeholder("Anything", ""));
        assert!(!is_placeholder("Native or bilingual", "Native or bilingual"));
    }

    #[test]
    fn job_url_handles_trailing_slash() {
        let mut settings = ApplySettings {
            job_url: "https://example.com/jobs/view/".into(),
            uploads: Uploads::default(),
            max_steps: 25,
            step_timeout: Duration::from_secs(1),
            unfollow_companies: true,
        };
        assert_eq!(settings.job_url("42"), "https://example.com/jobs/view/42/");
        settings.job_url = "https://example.com/jobs/view".into();
        assert_eq!(settings.job_url("42"), "https://example.com/jobs/view/42/");
    }
}
