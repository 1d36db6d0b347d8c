//! Chromium-based renderer using chromiumoxide.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::PageRenderer;
use crate::config::{ServiceConfig, Viewport};
use crate::error::RenderError;

/// Find the Chromium binary: explicit config, then environment, then PATH.
pub fn find_chromium(configured: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = configured {
        return Some(PathBuf::from(p));
    }

    if let Ok(p) = std::env::var("CATALOG_SCRAPER_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    ["google-chrome", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Build the consent-dismissal script: click the first button whose text
/// contains one of `labels`, trying labels in order. Returns the label used.
pub fn consent_script(labels: &[String]) -> String {
    let labels = serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
  const labels = {labels};
  const buttons = Array.from(document.querySelectorAll('button'));
  for (const label of labels) {{
    const wanted = label.toLowerCase();
    const button = buttons.find(b => (b.textContent || '').trim().toLowerCase().includes(wanted));
    if (button) {{
      try {{ button.click(); return label; }} catch (e) {{ return null; }}
    }}
  }}
  return null;
}})()"#
    )
}

/// Everything needed to (re)start the browser process.
struct Launcher {
    chrome_path: PathBuf,
    user_agent: String,
    viewport: Viewport,
}

impl Launcher {
    async fn launch(&self) -> Result<Session, RenderError> {
        let browser_config = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", self.user_agent))
            .window_size(self.viewport.width, self.viewport.height)
            .build()
            .map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser event error: {e}");
                }
            }
            debug!("browser connection ended");
        });

        debug!(path = %self.chrome_path.display(), "chromium launched");
        Ok(Session { browser, handler })
    }
}

/// A running browser and the task draining its CDP connection.
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Session {
    fn is_alive(&self) -> bool {
        !self.handler.is_finished()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// A headless Chromium shared by all requests; each render gets its own
/// page. The browser is relaunched when it has died.
pub struct ChromiumRenderer {
    launcher: Launcher,
    session: Mutex<Option<Session>>,
    timeout_ms: u64,
    settle_delay: Duration,
    consent_labels: Vec<String>,
}

impl ChromiumRenderer {
    pub async fn launch(config: &ServiceConfig) -> Result<Self, RenderError> {
        let chrome_path = find_chromium(config.chromium_path.as_deref())
            .ok_or_else(|| RenderError::Launch("Chromium not found".to_string()))?;

        let launcher = Launcher {
            chrome_path,
            user_agent: config.user_agent.clone(),
            viewport: config.viewport,
        };
        let session = launcher.launch().await?;

        Ok(Self {
            launcher,
            session: Mutex::new(Some(session)),
            timeout_ms: config.navigation_timeout_ms,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            consent_labels: config.consent_button_labels.clone(),
        })
    }

    /// Open a blank page, replacing the browser first if it is gone.
    async fn open_page(&self) -> Result<Page, RenderError> {
        let mut session = self.session.lock().await;

        if let Some(current) = session.as_ref() {
            if current.is_alive() {
                match current.browser.new_page("about:blank").await {
                    Ok(page) => return Ok(page),
                    Err(e) => warn!("browser unusable, relaunching: {e}"),
                }
            } else {
                warn!("browser connection closed, relaunching");
            }
        }

        // drop the dead session before starting a new process
        *session = None;
        let fresh = self.launcher.launch().await?;
        let page = fresh
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        *session = Some(fresh);
        Ok(page)
    }

    async fn load(&self, page: &Page, url: &str) -> Result<String, RenderError> {
        match tokio::time::timeout(Duration::from_millis(self.timeout_ms), page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
            Err(_) => return Err(RenderError::Timeout(self.timeout_ms)),
        }

        self.dismiss_consent(page).await;
        tokio::time::sleep(self.settle_delay).await;

        let result = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| RenderError::Content(e.to_string()))?;
        result
            .into_value::<String>()
            .map_err(|e| RenderError::Content(format!("{e:?}")))
    }

    /// Best effort: a banner left in place only hides content visually.
    async fn dismiss_consent(&self, page: &Page) {
        if self.consent_labels.is_empty() {
            return;
        }
        match page.evaluate(consent_script(&self.consent_labels)).await {
            Ok(result) => {
                if let Ok(Some(label)) = result.into_value::<Option<String>>() {
                    debug!(label = %label, "dismissed consent banner");
                }
            }
            Err(e) => debug!("consent dismissal skipped: {e}"),
        }
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let page = self.open_page().await?;

        let html = self.load(&page, url).await;

        if let Err(e) = page.close().await {
            warn!("failed to close page: {e}");
        }
        html
    }
}
