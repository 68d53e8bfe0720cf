use std::ffi::OsStr;

use headless_chrome::{Browser, LaunchOptions};
use reqwest::Url;
use scraper::Html;
use tracing::debug;

use crate::error::FetchError;

/// Source of parsed pages. Search pages and postings on the target site only
/// fill in their content after scripts run, hence the rendered variant.
pub trait PageFetcher {
    /// Plain GET of the server-delivered markup.
    async fn fetch_static(&self, url: &Url) -> Result<Html, FetchError>;

    /// Markup after client-side rendering in a headless browser.
    async fn fetch_rendered(&self, url: &Url) -> Result<Html, FetchError>;
}

pub struct WebFetcher {
    client: reqwest::Client,
}

impl WebFetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(WebFetcher { client })
    }
}

impl PageFetcher for WebFetcher {
    async fn fetch_static(&self, url: &Url) -> Result<Html, FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(http_err)?;
        Ok(Html::parse_document(&body))
    }

    async fn fetch_rendered(&self, url: &Url) -> Result<Html, FetchError> {
        let target = url.to_string();
        debug!("render {}", target);

        let rendered = tokio::task::spawn_blocking(move || render_page(&target))
            .await
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                source: Box::new(e),
            })?
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                source: e.into(),
            })?;

        Ok(Html::parse_document(&rendered))
    }
}

/// One browser per page: launched here, killed when `browser` drops.
fn render_page(url: &str) -> anyhow::Result<String> {
    let options = LaunchOptions {
        headless: true,
        args: vec![OsStr::new("--disable-gpu")],
        ..Default::default()
    };
    let browser = Browser::new(options)?;
    let tab = browser.new_tab()?;
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;
    let content = tab.get_content()?;
    Ok(content)
}
