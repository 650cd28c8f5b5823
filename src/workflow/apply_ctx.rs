//! Per-job context
//!
//! Wraps "which job of which combo am I on" for log lines

use crate::models::{JobPosting, SearchCombo};
use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct ApplyCtx {
    /// Position of the job within the combo, from 1 (log display only)
    pub job_index: usize,
    pub job_id: String,
    pub title: String,
    pub company: String,
    /// The search that surfaced the job, as `position: location`
    pub combo: String,
}

impl ApplyCtx {
    pub fn new(job_index: usize, job: &JobPosting, combo: &SearchCombo) -> Self {
        Self {
            job_index,
            job_id: job.job_id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            combo: combo.to_string(),
        }
    }
}

impl Display for ApplyCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[job #{} id {} | {} @ {} | {}]",
            self.job_index, self.job_id, self.title, self.company, self.combo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_prefix_names_the_search() {
        let job = JobPosting::new("42", "Rust Engineer", "Acme");
        let combo = SearchCombo::new("Rust Engineer", "Remote");
        let ctx = ApplyCtx::new(3, &job, &combo);

        assert_eq!(
            ctx.to_string(),
            "[job #3 id 42 | Rust Engineer @ Acme | Rust Engineer: Remote]"
        );
    }
}
