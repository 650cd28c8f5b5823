pub mod chromium;
pub mod pacing;
pub mod page_driver;

pub use chromium::ChromiumDriver;
pub use pacing::{DelayPolicy, NoDelay, PaceStep, RandomPacing};
pub use page_driver::{Condition, Locator, PageDriver, PageState};
