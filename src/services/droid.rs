use std::time::{Duration, Instant};

use thirtyfour::{prelude::*, ChromiumLikeCapabilities};

use crate::configuration::BrowserSettings;

use super::RenderError;

/// A single chromedriver session. `render` consumes it so the browser is
/// quit on every path.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn new(settings: &BrowserSettings) -> Result<Self, RenderError> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.add_arg("--headless=new")?;
        }
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg(&format!("--user-agent={}", settings.user_agent))?;

        log::info!("Starting webdriver session at {}", settings.webdriver_url);
        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps).await?;

        Ok(Droid { driver })
    }

    pub async fn render(self, url: &str, settings: &BrowserSettings) -> Result<String, RenderError> {
        let page_source = self.load_page(url, settings).await;

        if let Err(e) = self.driver.quit().await {
            log::warn!("Failed to quit webdriver session. Error: {:?}", e);
        }

        page_source
    }

    async fn load_page(&self, url: &str, settings: &BrowserSettings) -> Result<String, RenderError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let started = Instant::now();

        self.driver.set_page_load_timeout(timeout).await?;
        self.driver.goto(url).await?;

        let remaining = remaining_budget(timeout, started.elapsed());
        if let Err(source) = self
            .driver
            .query(By::Css(settings.marker_selector.as_str()))
            .wait(remaining, Duration::from_millis(settings.poll_interval_ms))
            .first()
            .await
        {
            return Err(RenderError::MarkerTimeout {
                url: url.to_string(),
                marker: settings.marker_selector.clone(),
                timeout_secs: settings.timeout_secs,
                source,
            });
        }

        log::info!("Render marker {:?} found on {}", settings.marker_selector, url);
        Ok(self.driver.source().await?)
    }
}

/// Page load and marker wait share one `timeout_secs` budget.
fn remaining_budget(timeout: Duration, elapsed: Duration) -> Duration {
    timeout.saturating_sub(elapsed)
}
