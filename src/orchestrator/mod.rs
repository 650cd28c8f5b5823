//! Orchestration layer
//!
//! ```text
//! app (browser, login, wiring)
//!     ↓
//! campaign (combos, skip set, ledger rows)
//!     ↓
//! combo_processor (pages of one combo, time budget)
//!     ↓
//! workflow::ApplyFlow (one job)
//!     ↓
//! services (search / ledger / answers / login)
//!     ↓
//! infrastructure (PageDriver, pacing)
//! ```

pub mod app;
pub mod campaign;
pub mod combo_processor;

pub use app::App;
pub use campaign::{
    build_combos, Campaign, CampaignParts, CampaignSettings, CampaignStats, JobDisposition,
    SkipReason,
};
pub use combo_processor::ComboStats;
