//! Chromium implementation of the browser seam (CDP via chromiumoxide).

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, SetUserAgentOverrideParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{BrowserPage, BrowserSession, ObservedResponse, ResponseStream};
use crate::config::BrowserSettings;
use crate::error::CoreError;

/// A launched browser process with an isolated (incognito) context.
///
/// Call [`ChromeSession::shutdown`] when done. Dropping without shutdown stops
/// the CDP handler task; the browser process is killed with it.
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_agent: String,
}

impl ChromeSession {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, CoreError> {
        tracing::info!(headless = settings.headless, "launching browser");

        let mut builder = BrowserConfig::builder()
            .incognito()
            .window_size(1280, 900)
            .arg("--no-sandbox") // Required for containerized environments
            .arg("--disable-dev-shm-usage")
            .arg("--mute-audio")
            .arg("--autoplay-policy=no-user-gesture-required");
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| CoreError::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("cdp handler: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            user_agent: settings.user_agent.clone(),
        })
    }

    /// Close the browser and wait for the process to exit.
    pub async fn shutdown(mut self) -> Result<(), CoreError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("waiting for browser exit: {}", e);
        }
        self.handler.abort();
        closed?;
        tracing::info!("browser session closed");
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, CoreError> {
        let page = self.browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await?;
        page.execute(EnableParams::default()).await?;
        Ok(Box::new(ChromePage { page }))
    }
}

struct ChromePage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), CoreError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn responses(&self) -> Result<ResponseStream, CoreError> {
        let events = self.page.event_listener::<EventResponseReceived>().await?;
        Ok(events
            .map(|ev| ObservedResponse {
                url: ev.response.url.clone(),
                status: u16::try_from(ev.response.status).unwrap_or(0),
                mime_type: ev.response.mime_type.clone(),
            })
            .boxed())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, CoreError> {
        let result = self.page.evaluate(script).await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn click(&self, selector: &str) -> Result<bool, CoreError> {
        match self.page.find_element(selector).await {
            Ok(element) => {
                element.click().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn press_key(&self, key: &str) -> Result<(), CoreError> {
        let body = self.page.find_element("body").await?;
        body.press_key(key).await?;
        Ok(())
    }

    async fn content(&self) -> Result<String, CoreError> {
        Ok(self.page.content().await?)
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.page.close().await?;
        Ok(())
    }
}
