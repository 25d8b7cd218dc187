//! Authenticated HTTP client for the Canvas REST API.
//!
//! One `reqwest::Client` is built per `CanvasClient` with the bearer token
//! and the Canvas string-id accept header installed as default headers.
//! Requests that hit HTTP 429 are retried with exponential backoff; every
//! other non-2xx status fails immediately.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use studyguide_config::CanvasConfig;
use studyguide_core::{HttpError, ResourceItem};
use tracing::{debug, warn};
use url::Url;

use crate::link::next_link;

/// Accept header asking Canvas to return ids as strings.
pub const CANVAS_ACCEPT: &str = "application/json+canvas-string-ids";

/// Paginated, rate-limit aware Canvas client.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

impl CanvasClient {
    /// Build a client from configuration. An empty token is rejected.
    pub fn new(config: &CanvasConfig) -> Result<Self, HttpError> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HttpError::Config("Canvas token is not set".into()))?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| HttpError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| HttpError::Config(format!("invalid Canvas token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(CANVAS_ACCEPT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    /// The API base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; anything else is appended to the base URL.
    pub fn resolve(&self, path_or_url: &str) -> Result<Url, HttpError> {
        let raw = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}{}", self.base_url, path_or_url)
        };
        Url::parse(&raw).map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Build an API URL under the base URL from raw path segments.
    ///
    /// Each segment is percent-encoded, so ids and page slugs containing
    /// `/`, `?` or `#` stay inside their segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(format!("{}: cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments.iter().copied());
        Ok(url)
    }

    /// Resolve a file download URL, which may be relative, against the base URL.
    pub fn resolve_download(&self, download_url: &str) -> Result<Url, HttpError> {
        let base = format!("{}/", self.base_url);
        Url::parse(&base)
            .and_then(|base| base.join(download_url))
            .map_err(|e| HttpError::InvalidUrl(format!("{download_url}: {e}")))
    }

    /// Issue a request, retrying on 429 up to `max_retries` extra attempts.
    pub async fn request(
        &self,
        method: Method,
        path_or_url: &str,
        params: &[(&str, &str)],
    ) -> Result<Response, HttpError> {
        let url = self.resolve(path_or_url)?;
        self.send(method, url, params).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<Response, HttpError> {
        for attempt in 0..=self.max_retries {
            let mut builder = self.client.request(method.clone(), url.clone());
            if !params.is_empty() {
                builder = builder.query(params);
            }
            let response = builder.send().await.map_err(transport_error)?;
            let status = response.status();

            if status != StatusCode::TOO_MANY_REQUESTS {
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(HttpError::Status {
                        status: status.as_u16(),
                        url: url.to_string(),
                        body,
                    });
                }
                debug!(%method, %url, attempt, "Canvas request succeeded");
                return Ok(response);
            }

            if attempt == self.max_retries {
                break;
            }

            let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt));
            warn!(
                %url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Canvas rate limited, backing off"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Err(HttpError::RateLimited {
            url: url.to_string(),
            attempts: self.max_retries + 1,
        })
    }

    /// Fetch every page of a list endpoint, following `rel="next"` links.
    ///
    /// `params` are sent on the first request only; next links already
    /// carry their query. Items keep page order with no deduplication.
    pub async fn fetch_all_pages(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<ResourceItem>, HttpError> {
        let mut items = Vec::new();
        let mut next = Some(self.resolve(path)?);
        let mut params = params;
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let response = self.send(Method::GET, url.clone(), params).await?;
            let following = next_link(response.headers());
            let payload = decode_json(response, &url).await?;

            let Value::Array(elements) = payload else {
                return Err(HttpError::UnexpectedShape {
                    expected: "array",
                    url: url.to_string(),
                });
            };
            for element in elements {
                match element {
                    Value::Object(item) => items.push(item),
                    _ => {
                        return Err(HttpError::UnexpectedShape {
                            expected: "object",
                            url: url.to_string(),
                        });
                    }
                }
            }

            pages += 1;
            next = following.map(|link| self.resolve(&link)).transpose()?;
            params = &[];
        }

        debug!(path, pages, items = items.len(), "Fetched paginated listing");
        Ok(items)
    }

    /// Fetch a single JSON object.
    pub async fn fetch_object(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ResourceItem, HttpError> {
        let url = self.resolve(path)?;
        let response = self.send(Method::GET, url.clone(), params).await?;
        match decode_json(response, &url).await? {
            Value::Object(item) => Ok(item),
            _ => Err(HttpError::UnexpectedShape {
                expected: "object",
                url: url.to_string(),
            }),
        }
    }

    /// Download raw bytes from an absolute URL.
    pub async fn download(&self, url: Url) -> Result<Vec<u8>, HttpError> {
        let response = self.send(Method::GET, url, &[]).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }
}

async fn decode_json(response: Response, url: &Url) -> Result<Value, HttpError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn transport_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout(e.to_string())
    } else {
        HttpError::Network(e.to_string())
    }
}
