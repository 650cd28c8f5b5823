//! Page driver - infrastructure layer
//!
//! The only thing the workflow knows about the browser. Elements are opaque
//! handles; locations on the page are named by [`Locator`], never by
//! selector strings.

use crate::error::AppResult;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Interval between polls in [`PageDriver::wait_until`]
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Named places on the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    // login
    LoginUsername,
    LoginPassword,
    LoginSubmit,
    SignedInNav,
    /// Two-factor / one-click reset challenge
    TwoFactorChallenge,

    // search results
    SearchResults,
    JobCard,
    JobCardTitle,
    JobCardCompany,

    // apply dialog
    EasyApplyButton,
    NextButton,
    ReviewButton,
    SubmitButton,
    ErrorFeedback,
    UploadResume,
    UploadCoverLetter,
    FollowCompany,
    FieldGroup,
    FieldLabel,
    RadioInput,
    MultiSelect,
    SelectOption,
    TextInput,
}

/// Something to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Present(Locator),
    AnyPresent(Vec<Locator>),
}

impl Condition {
    fn locators(&self) -> &[Locator] {
        match self {
            Condition::Present(locator) => std::slice::from_ref(locator),
            Condition::AnyPresent(locators) => locators,
        }
    }
}

/// Where the browser currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub url: String,
    pub title: String,
}

/// Browser capability used by login, search and the form walker
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> AppResult<()>;

    /// All matches on the page, possibly none
    async fn find_all(&self, locator: Locator) -> AppResult<Vec<Self::Element>>;

    /// All matches below `parent`
    async fn find_in(
        &self,
        parent: &Self::Element,
        locator: Locator,
    ) -> AppResult<Vec<Self::Element>>;

    async fn click(&self, element: &Self::Element) -> AppResult<()>;

    async fn type_text(&self, element: &Self::Element, text: &str) -> AppResult<()>;

    /// Attach a file to a file input
    async fn upload(&self, element: &Self::Element, path: &Path) -> AppResult<()>;

    /// Choose `value` in a select list
    async fn select(&self, element: &Self::Element, value: &str) -> AppResult<()>;

    /// Visible text
    async fn text(&self, element: &Self::Element) -> AppResult<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> AppResult<Option<String>>;

    async fn page_state(&self) -> AppResult<PageState>;

    /// First match, if any
    async fn find(&self, locator: Locator) -> AppResult<Option<Self::Element>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn is_present(&self, locator: Locator) -> AppResult<bool> {
        Ok(self.find(locator).await?.is_some())
    }

    /// Poll until `condition` holds. `Ok(false)` means the timeout elapsed.
    async fn wait_until(&self, condition: &Condition, timeout: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            for locator in condition.locators() {
                if self.is_present(*locator).await? {
                    return Ok(true);
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
