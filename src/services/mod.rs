pub mod answer_store;
pub mod auth;
pub mod job_search;
pub mod ledger;

pub use answer_store::{AnswerSource, AnswerStore, OperatorPrompt, ProfileAnswers};
pub use auth::{login, Credentials};
pub use job_search::{JobSearch, SearchPage};
pub use ledger::AppliedLedger;
