use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::types::Source;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: '{0}'")]
    Request(#[from] reqwest::Error),
    #[error("Request to '{url}' not successful, status code: {status}")]
    Status { url: String, status: StatusCode },
    #[error("Invalid source url '{url}': {source}")]
    InvalidSourceUrl {
        url: String,
        source: url::ParseError,
    },
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request(_) => true,
            FetchError::Status { status, .. } => matches!(
                *status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::INTERNAL_SERVER_ERROR
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            ),
            FetchError::InvalidSourceUrl { .. } => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub retries: u32,
    /// first retry wait, doubled on every further attempt
    pub retry_backoff: Duration,
    /// pause between two consecutive source pages
    pub delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(18),
            user_agent: format!(
                "jobfinder/{} (entry-level IT support job search)",
                env!("CARGO_PKG_VERSION")
            ),
            retries: 3,
            retry_backoff: Duration::from_millis(500),
            delay: Duration::from_millis(120),
        }
    }
}

/// A fetched search-result page
#[derive(Debug)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

pub struct FetchedPage<'a> {
    pub source: &'a Source,
    pub result: Result<Page>,
}

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch_once(&self, url: &Url) -> Result<String> {
        log::info!("GET {}", url);
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            log::debug!(
                "request not successful, status code: {}, url: {}",
                status,
                url
            );
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp.text().await?)
    }

    /// GET `url` and return the body on a 2xx response.
    /// Transport errors, 429 and 5xx gateway-style statuses are retried
    /// up to `retries` times.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.config.retries && e.is_retryable() => {
                    let wait = self.config.retry_backoff * 2u32.pow(attempt);
                    log::warn!("{}, retrying in {:?}", e, wait);
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Politeness delay between two requests
    pub async fn pause(&self) {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
    }

    /// Fetch the pages of `sources` one after the other, in order.
    /// A failing source yields its error and the stream moves on.
    pub fn fetch_pages<'a, I>(&'a self, sources: I) -> impl Stream<Item = FetchedPage<'a>> + 'a
    where
        I: IntoIterator<Item = &'a Source> + 'a,
    {
        stream! {
            for (index, source) in sources.into_iter().enumerate() {
                if index > 0 {
                    self.pause().await;
                }
                let result = match source.resolve_url() {
                    Ok(url) => match self.fetch(&url).await {
                        Ok(body) => Ok(Page { url, body }),
                        Err(e) => Err(e),
                    },
                    Err(e) => Err(FetchError::InvalidSourceUrl {
                        url: source.url.clone(),
                        source: e,
                    }),
                };
                yield FetchedPage { source, result };
            }
        }
    }
}
