//! Chromium page driver - infrastructure layer
//!
//! Holds the one `Page` of the run and implements [`PageDriver`] over it.
//! This is the only file that knows the site's selectors.

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::page_driver::{Locator, PageDriver, PageState};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use std::path::Path;
use tracing::debug;

/// CSS selector for each locator
pub fn selector(locator: Locator) -> &'static str {
    match locator {
        Locator::LoginUsername => "#username",
        Locator::LoginPassword => "#password",
        Locator::LoginSubmit => "form button[type='submit']",
        Locator::SignedInNav => "#global-nav",
        Locator::TwoFactorChallenge => "#reset-password-submit-button, #input__phone_verification_pin",

        Locator::SearchResults => ".jobs-search-results-list, .scaffold-layout__list",
        Locator::JobCard => "div[data-job-id]",
        Locator::JobCardTitle => ".job-card-list__title, .job-card-container__link",
        Locator::JobCardCompany => {
            ".job-card-container__primary-description, .artdeco-entity-lockup__subtitle"
        }

        Locator::EasyApplyButton => "button.jobs-apply-button",
        Locator::NextButton => "button[aria-label='Continue to next step']",
        Locator::ReviewButton => "button[aria-label='Review your application']",
        Locator::SubmitButton => "button[aria-label='Submit application']",
        Locator::ErrorFeedback => ".artdeco-inline-feedback__message",
        Locator::UploadResume => "[id*='jobs-document-upload-file-input-upload-resume']",
        Locator::UploadCoverLetter => "[id*='jobs-document-upload-file-input-upload-cover-letter']",
        Locator::FollowCompany => "label[for='follow-company-checkbox']",
        Locator::FieldGroup => ".jobs-easy-apply-form-section__grouping",
        Locator::FieldLabel => "label, legend",
        Locator::RadioInput => "input[type='radio']",
        Locator::MultiSelect => "select, [id*='text-entity-list-form-component']",
        Locator::SelectOption => "option",
        Locator::TextInput => "input.artdeco-text-input--input, input[type='text'], textarea",
    }
}

/// Page driver backed by chromiumoxide
pub struct ChromiumDriver {
    page: Page,
}

impl ChromiumDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run `function() { ... }` with `this` bound to the element
    async fn call_on(&self, element: &Element, function: String) -> AppResult<()> {
        element
            .call_js_fn(function, false)
            .await
            .map_err(|e| AppError::element_action_failed("script", e))?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> AppResult<()> {
        debug!("navigate: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    async fn find_all(&self, locator: Locator) -> AppResult<Vec<Element>> {
        // not-found is reported as an error by CDP; an absent element is not one for us
        Ok(self
            .page
            .find_elements(selector(locator))
            .await
            .unwrap_or_default())
    }

    async fn find_in(&self, parent: &Element, locator: Locator) -> AppResult<Vec<Element>> {
        Ok(parent
            .find_elements(selector(locator))
            .await
            .unwrap_or_default())
    }

    async fn click(&self, element: &Element) -> AppResult<()> {
        // DOM click, so overlaid labels of radios and checkboxes don't intercept it
        self.call_on(
            element,
            "function() { this.scrollIntoView({block: 'center'}); this.click(); }".to_string(),
        )
        .await
    }

    async fn type_text(&self, element: &Element, text: &str) -> AppResult<()> {
        element
            .click()
            .await
            .map_err(|e| AppError::element_action_failed("focus", e))?;
        self.call_on(element, "function() { this.value = ''; }".to_string())
            .await?;
        element
            .type_str(text)
            .await
            .map_err(|e| AppError::element_action_failed("type", e))?;
        Ok(())
    }

    async fn upload(&self, element: &Element, path: &Path) -> AppResult<()> {
        let mut params = SetFileInputFilesParams::new(vec![path.display().to_string()]);
        params.backend_node_id = Some(element.backend_node_id);
        self.page
            .execute(params)
            .await
            .map_err(|e| AppError::element_action_failed("upload", e))?;
        Ok(())
    }

    async fn select(&self, element: &Element, value: &str) -> AppResult<()> {
        let function = format!(
            "function() {{ this.value = {}; this.dispatchEvent(new Event('change', {{ bubbles: true }})); }}",
            serde_json::to_string(value)?
        );
        self.call_on(element, function).await
    }

    async fn text(&self, element: &Element) -> AppResult<String> {
        let text = element
            .inner_text()
            .await
            .map_err(|e| AppError::Browser(BrowserError::StaleElement(e.to_string())))?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, element: &Element, name: &str) -> AppResult<Option<String>> {
        // `value` lives on the property, the attribute keeps the initial markup value
        if name == "value" {
            let value = element
                .property("value")
                .await
                .map_err(|e| AppError::Browser(BrowserError::StaleElement(e.to_string())))?;
            return Ok(value.and_then(|v| v.as_str().map(str::to_string)));
        }
        element
            .attribute(name)
            .await
            .map_err(|e| AppError::Browser(BrowserError::StaleElement(e.to_string())))
    }

    async fn page_state(&self) -> AppResult<PageState> {
        let url = self.page.url().await?.unwrap_or_default();
        let title = self.page.get_title().await?.unwrap_or_default();
        Ok(PageState { url, title })
    }
}
