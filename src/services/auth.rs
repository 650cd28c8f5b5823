//! Login - business capability layer

use crate::config::Config;
use crate::error::{AppError, AppResult, AuthError, ConfigError};
use crate::infrastructure::{Condition, DelayPolicy, Locator, PaceStep, PageDriver};
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Username and password for one run
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// From config (env overrides already applied); asks for the password if empty
    pub fn resolve(config: &Config) -> AppResult<Self> {
        if config.username.trim().is_empty() {
            return Err(ConfigError::MissingUsername.into());
        }
        let password = if config.password.is_empty() {
            prompt_password(&config.username)?
        } else {
            config.password.clone()
        };
        Ok(Self {
            username: config.username.clone(),
            password,
        })
    }
}

fn prompt_password(username: &str) -> AppResult<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "🔑 password for {}: ", username)?;
    stdout.flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Sign in; any failure here ends the run
///
/// # Arguments
/// - `login_url`: the site's sign-in page
/// - `timeout`: how long to wait for the form and for the result
///
/// # Returns
/// `AuthError::Challenge` for a verification step, `AuthError::Rejected`
/// when the site keeps the form up, `AuthError::FormNotFound` without a form
pub async fn login<D: PageDriver>(
    driver: &D,
    pacing: &dyn DelayPolicy,
    login_url: &str,
    credentials: &Credentials,
    timeout: Duration,
) -> AppResult<()> {
    info!("🔐 logging in as {} ...", credentials.username);
    driver.navigate(login_url).await?;
    pacing.pause(PaceStep::AfterNavigation).await;

    let user_field = driver
        .find(Locator::LoginUsername)
        .await?
        .ok_or(AuthError::FormNotFound("username field"))?;
    let password_field = driver
        .find(Locator::LoginPassword)
        .await?
        .ok_or(AuthError::FormNotFound("password field"))?;
    let submit = driver
        .find(Locator::LoginSubmit)
        .await?
        .ok_or(AuthError::FormNotFound("sign-in button"))?;

    driver.type_text(&user_field, &credentials.username).await?;
    pacing.pause(PaceStep::BetweenFields).await;
    driver.type_text(&password_field, &credentials.password).await?;
    pacing.pause(PaceStep::BeforeClick).await;
    driver.click(&submit).await?;

    let settled = driver
        .wait_until(
            &Condition::AnyPresent(vec![Locator::SignedInNav, Locator::TwoFactorChallenge]),
            timeout,
        )
        .await?;

    let state = driver.page_state().await?;
    if settled && driver.is_present(Locator::SignedInNav).await? {
        info!("✓ logged in ({})", state.title);
        return Ok(());
    }
    if driver.is_present(Locator::TwoFactorChallenge).await? {
        return Err(AppError::Auth(AuthError::Challenge { url: state.url }));
    }
    Err(AppError::Auth(AuthError::Rejected { url: state.url }))
}
