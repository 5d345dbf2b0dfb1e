use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::scraping::{JobBoard, ScrapeError};

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

/// Source of posting HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, board: JobBoard) -> Result<String, ScrapeError>;
}

/// Plain HTTP fetcher posing as a desktop browser. LinkedIn requests carry the
/// `li_at` session cookie when one is configured.
pub struct HttpPageFetcher {
    client: Client,
    linkedin_li_at: Option<String>,
}

impl HttpPageFetcher {
    pub fn new(linkedin_li_at: Option<String>) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            linkedin_li_at,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url, board: JobBoard) -> Result<String, ScrapeError> {
        let mut request = self
            .client
            .get(url.clone())
            .header(USER_AGENT, DESKTOP_USER_AGENT)
            .header(ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9,en;q=0.8");

        if board == JobBoard::LinkedIn {
            if let Some(li_at) = &self.linkedin_li_at {
                request = request.header(COOKIE, format!("li_at={li_at}"));
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, html.len());
        Ok(html)
    }
}
