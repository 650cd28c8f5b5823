use crate::config::BrowserSettings;
use crate::error::{AppError, AppResult, BrowserError};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Launch a fresh browser with one blank page
///
/// # Arguments
/// - `settings`: headless flag and optional Chrome executable
pub async fn launch_browser(settings: &BrowserSettings) -> AppResult<(Browser, Page)> {
    info!("🚀 launching browser...");

    let mut builder = BrowserConfig::builder()
        .args(vec![
            "--start-maximized",
            "--ignore-certificate-errors",
            "--no-sandbox",
            "--disable-extensions",
            "--disable-blink-features=AutomationControlled",
        ]);
    if settings.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }
    if let Some(executable) = &settings.executable {
        debug!("browser executable: {}", executable.display());
        builder = builder.chrome_executable(executable);
    }

    let config = builder.build().map_err(|e| {
        error!("browser configuration failed: {}", e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("browser launch failed: {}", e);
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("browser started");

    // drain browser events in the background
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // give the browser a moment to settle
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("failed to create page: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;

    info!("✅ browser ready");
    Ok((browser, page))
}
