pub mod experience;
pub mod job;

pub use experience::ExperienceLevel;
pub use job::{AppliedRecord, ApplyResult, JobPosting, SearchCombo};
