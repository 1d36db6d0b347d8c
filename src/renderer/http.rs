use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect;
use tracing::debug;

use super::PageRenderer;
use crate::config::ServiceConfig;
use crate::error::RenderError;

/// Fetches pages over plain HTTP. Scripts are not run, so lazily loaded
/// product grids come back empty.
pub struct HttpRenderer {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpRenderer {
    pub fn new(config: &ServiceConfig) -> Result<Self, RenderError> {
        let allowed_host = url::Url::parse(config.site.origin())
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));

        let custom_redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > 100 {
                attempt.error("Too many redirects (>100)")
            } else if allowed_host.is_some() && attempt.url().host_str() != allowed_host.as_deref() {
                // never follow a redirect off the catalog site
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        let client = reqwest::Client::builder()
            .redirect(custom_redirect_policy)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.navigation_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            timeout_ms: config.navigation_timeout_ms,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        debug!(url, "fetching page over http");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Navigation(format!("{url} returned {status}")));
        }

        response.text().await.map_err(|e| self.classify(e))
    }
}

impl HttpRenderer {
    fn classify(&self, error: reqwest::Error) -> RenderError {
        if error.is_timeout() {
            RenderError::Timeout(self.timeout_ms)
        } else {
            RenderError::Http(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        assert!(HttpRenderer::new(&ServiceConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_render_error() {
        let mut config = ServiceConfig::default();
        config.navigation_timeout_ms = 2_000;
        let renderer = HttpRenderer::new(&config).unwrap();
        // port 9 (discard) on loopback is closed in test environments
        let result = renderer.render("http://127.0.0.1:9/en/1-x.html").await;
        assert!(result.is_err());
    }
}
