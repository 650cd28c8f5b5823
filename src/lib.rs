//! # Easy Apply
//!
//! Drives a signed-in browser session through a job site's "easy apply"
//! flow for every (position, location) search the user configures.
//!
//! ## Architecture
//!
//! The crate is split into four layers:
//!
//! ### ① Infrastructure
//! - `infrastructure/` - owns the scarce resource (the page), exposes capabilities only
//! - `PageDriver` - navigate / find / click / type / upload / select / wait
//! - `ChromiumDriver` - the chromiumoxide-backed driver, the only selector table
//! - `DelayPolicy` - human-like pacing between actions
//!
//! ### ② Services
//! - `services/` - what the bot can do, one thing at a time
//! - `AnswerStore` - question → answer memory backed by a CSV file
//! - `AppliedLedger` - append-only history of every attempt
//! - `JobSearch` - one page of search results
//! - `login` - signs the session in
//!
//! ### ③ Workflow
//! - `workflow/` - the complete flow for a single job
//! - `ApplyCtx` - job index, id and title for log lines
//! - `ApplyFlow` - open → walk the form sections → submit, one outcome per job
//!
//! ### ④ Orchestration
//! - `orchestrator/campaign` - combos, skip set, ledger rows
//! - `orchestrator/combo_processor` - pagination and the per-combo time budget
//! - `orchestrator/app` - browser lifecycle and wiring
//!
//! ## Module layout

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// common re-exports
pub use browser::{connect_to_browser_and_page, launch_browser};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromiumDriver, DelayPolicy, PageDriver};
pub use models::{AppliedRecord, ApplyResult, JobPosting, SearchCombo};
pub use orchestrator::{App, Campaign, CampaignStats};
pub use workflow::{ApplyCtx, ApplyFlow, ApplyOutcome};
