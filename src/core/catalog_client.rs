//! HTTP catalog client
//!
//! Fetches the paginated product catalog from the catalog service and
//! aggregates every page before returning. Each page request is retried
//! with bounded exponential backoff on transient failures; once the
//! attempt budget is spent the fetch fails with `CatalogError::Unavailable`
//! and the run aborts.
//!
//! # Wire Format
//!
//! ```text
//! GET {base_url}/products?limit={page_size}&skip={skip}
//!
//! { "products": [ { "id": .., "title": .., "category": .., "price": .. } ],
//!   "total": 194, "skip": 0, "limit": 100 }
//! ```
//!
//! # Failure Classes
//!
//! - transient: timeouts, connection errors, HTTP 5xx and 429 (retried)
//! - permanent: any other HTTP status, malformed JSON (not retried)

use crate::config::CatalogConfig;
use crate::core::catalog::{
    CatalogBuilder, CatalogPage, CatalogSnapshot, CatalogWarning, ProductPayload,
};
use crate::core::traits::CatalogSource;
use crate::types::CatalogError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::future::Future;
use tracing::{debug, info, warn};

const MAX_ERROR_BODY: usize = 200;

/// Outcome of a single failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Worth retrying
    Transient(String),
    /// Retrying would not help
    Permanent(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() || error.is_request() || error.is_body() {
            FetchFailure::Transient(error.to_string())
        } else {
            FetchFailure::Permanent(error.to_string())
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts
///
/// Every attempt is bounded by `config.request_timeout()`; a timeout counts
/// as a transient failure. Between attempts the task sleeps for
/// `config.backoff_for(attempt)`.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &CatalogConfig,
    what: &str,
    mut op: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchFailure>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let outcome = match tokio::time::timeout(config.request_timeout(), op()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchFailure::Transient(format!(
                "timed out after {:?}",
                config.request_timeout()
            ))),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(FetchFailure::Permanent(message)) => {
                return Err(CatalogError::Unavailable {
                    attempts: attempt,
                    last_error: message,
                })
            }
            Err(FetchFailure::Transient(message)) if attempt >= max_attempts => {
                return Err(CatalogError::Unavailable {
                    attempts: attempt,
                    last_error: message,
                })
            }
            Err(FetchFailure::Transient(message)) => {
                let delay = config.backoff_for(attempt);
                warn!(
                    what,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "transient catalog failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Offset of the next page to request, or `None` when the catalog is complete
///
/// Uses the reported `total` when present; otherwise a short page marks the end.
pub fn next_offset(
    requested_skip: usize,
    page: &CatalogPage,
    page_size: usize,
) -> Option<usize> {
    let received = page.products.len();
    if received == 0 {
        return None;
    }
    let next = page.skip.unwrap_or(requested_skip) + received;
    let done = match page.total {
        Some(total) => next >= total,
        None => received < page_size,
    };
    (!done).then_some(next)
}

/// Catalog source backed by the HTTP catalog service
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    /// Create a client for `config.base_url` (a trailing slash is ignored)
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CatalogError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn page_url(&self, skip: usize) -> String {
        format!(
            "{}/products?limit={}&skip={}",
            self.base_url, self.config.page_size, skip
        )
    }

    async fn request_page(&self, url: &str) -> Result<CatalogPage, FetchFailure> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
            return Err(
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    FetchFailure::Transient(message)
                } else {
                    FetchFailure::Permanent(message)
                },
            );
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchFailure::Permanent(format!("invalid catalog page: {}", e)))
    }

    async fn fetch_page(&self, skip: usize) -> Result<CatalogPage, CatalogError> {
        let url = self.page_url(skip);
        debug!(url = %url, "requesting catalog page");
        retry_with_backoff(&self.config, &url, || self.request_page(&url)).await
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        let mut builder = CatalogBuilder::new();
        let mut skip = 0;

        loop {
            if builder.pages() >= self.config.max_pages {
                builder.warn(CatalogWarning::PageLimitReached {
                    pages: builder.pages(),
                });
                break;
            }

            let page = self.fetch_page(skip).await?;
            let next = next_offset(skip, &page, self.config.page_size);
            builder.add_page(page.products.into_iter().map(ProductPayload::into_entry));

            match next {
                Some(offset) => skip = offset,
                None => break,
            }
        }

        let snapshot = builder.finish();
        info!(
            base_url = %self.base_url,
            products = snapshot.catalog.len(),
            warnings = snapshot.warnings.len(),
            "catalog fetched"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("catalog service {}", self.base_url)
    }
}
