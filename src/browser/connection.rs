use crate::error::{AppError, AppResult, BrowserError};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Attach to a browser started with `--remote-debugging-port`
///
/// # Arguments
/// - `port`: the browser's remote debugging port
///
/// # Returns
/// The attached browser and a fresh blank page the bot owns for the run
pub async fn connect_to_browser_and_page(port: u16) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("connecting to browser: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("browser connection failed: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("browser connected");

    // drain browser events in the background
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // give the browser state a moment to sync
    sleep(tokio::time::Duration::from_millis(300)).await;

    let open = browser.pages().await.map(|p| p.len()).unwrap_or_default();
    debug!("{} pages already open, adding one for the bot", open);

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("failed to create page: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;

    Ok((browser, page))
}
