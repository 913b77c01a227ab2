use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::{info, warn};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared blocking HTTP client with a browser-like header set.
pub fn http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,pt-BR;q=0.8"),
    );
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()
        .context("failed to build HTTP client")
}

/// Retrieves page markup, plain or browser-rendered. Holds the browser
/// session for the lifetime of a run; dropping the fetcher tears it down.
pub struct Fetcher {
    client: Client,
    renderer: Option<Renderer>,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            renderer: None,
        }
    }

    /// Like `new`, but also launches a headless browser for
    /// JavaScript-dependent sources. A launch failure is logged once and the
    /// fetcher continues degraded: every rendered fetch will then fail like a
    /// transport error.
    pub fn with_renderer(client: Client) -> Self {
        let renderer = match Renderer::launch() {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("headless browser unavailable, rendered fetches will fail: {e:#}");
                None
            }
        };
        Self { client, renderer }
    }

    pub fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {url}"))?;
        Ok(response.text()?)
    }

    pub fn fetch_rendered(&self, url: &str) -> Result<String> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| anyhow!("no browser session"))?;
        renderer.render(url)
    }

    /// Fetch a page, mapping any failure to a logged `None` so the caller can
    /// skip that URL and move on.
    pub fn fetch_page(&self, url: &str, render: bool) -> Option<String> {
        let result = if render {
            self.fetch_rendered(url)
        } else {
            self.fetch(url)
        };
        match result {
            Ok(html) => Some(html),
            Err(e) => {
                warn!("failed to fetch {url}: {e:#}");
                None
            }
        }
    }
}

struct Renderer {
    browser: Browser,
}

impl Renderer {
    fn launch() -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| anyhow!("browser launch options: {e}"))?;
        let browser = Browser::new(options)?;
        info!("headless browser session started");
        Ok(Self { browser })
    }

    /// Navigate a fresh tab and return the rendered markup once the document
    /// body is present.
    fn render(&self, url: &str) -> Result<String> {
        let tab = self.browser.new_tab()?;
        tab.set_default_timeout(PAGE_LOAD_TIMEOUT);
        tab.set_user_agent(BROWSER_USER_AGENT, None, None)?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        tab.wait_for_element("body")?;
        let html = tab.get_content();
        let _ = tab.close(true);
        html
    }
}
