//! Job posting scraper — fetches a posting page and extracts title, company,
//! location and description through an ordered chain of extraction strategies.
//!
//! Supported boards: LinkedIn and Welcome to the Jungle. Failures never surface
//! as HTTP errors; the handler turns them into `{"error": message}` bodies.

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use url::Url;

pub mod extract;
pub mod fetch;
pub mod handlers;
pub mod similar;

use crate::scraping::extract::extract_posting;
use crate::scraping::fetch::PageFetcher;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

/// Body of the scrape endpoint: the posting, or a structured error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScrapeResponse {
    Posting(JobPosting),
    Failed { error: String },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("missing URL")]
    MissingUrl,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported site")]
    UnsupportedSite,

    #[error("page fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page fetch failed with status {0}")]
    Status(u16),

    #[error("page is empty")]
    EmptyPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobBoard {
    LinkedIn,
    WelcomeToTheJungle,
}

impl JobBoard {
    pub fn detect(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        let on = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));
        if on("linkedin.com") {
            Some(JobBoard::LinkedIn)
        } else if on("welcometothejungle.com") {
            Some(JobBoard::WelcomeToTheJungle)
        } else {
            None
        }
    }
}

/// Validates `raw_url`, fetches the page, and extracts a posting from it.
pub async fn scrape_job_posting(
    raw_url: &str,
    fetcher: &dyn PageFetcher,
) -> Result<JobPosting, ScrapeError> {
    let raw_url = raw_url.trim();
    if raw_url.is_empty() {
        return Err(ScrapeError::MissingUrl);
    }

    let url = Url::parse(raw_url)?;
    let board = JobBoard::detect(&url).ok_or(ScrapeError::UnsupportedSite)?;

    let html = fetcher.fetch(&url, board).await?;
    if html.trim().is_empty() {
        return Err(ScrapeError::EmptyPage);
    }

    let posting = extract_posting(&html, board);
    info!(
        "Scraped {:?} posting '{}' ({} description chars)",
        board,
        posting.title,
        posting.description.chars().count()
    );
    Ok(posting)
}
