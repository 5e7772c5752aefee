//! Bounded media download with per-group candidate fallback.
//!
//! A [`MediaGroup`] lists URLs believed to reference the same image. The
//! fetcher tries them strictly in order: the first 200 response within the
//! size cap wins and the rest of the group is never touched. A candidate
//! that errors or answers non-200 means "try the next one"; the group as a
//! whole fails only when every candidate has been tried.

pub mod error;

use tracing::{debug, warn};

use pictor_resolve::{BROWSER_USER_AGENT, MediaGroup};

pub use error::{FetchError, Result};

/// Largest payload that will be materialized and attached, in bytes.
pub const MAX_FILE_SIZE: usize = 24 * 1024 * 1024;

/// A size-compliant downloaded image.
///
/// Invariant: `bytes.len() <= MAX_FILE_SIZE`. Oversized payloads are
/// reported as [`FetchError::Oversized`] and never constructed.
#[derive(Debug, Clone)]
pub struct DownloadedItem {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DownloadedItem {
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Payload size in MiB, as reported to users (two decimals at the call
/// sites: `len / 1024^2`).
#[must_use]
pub fn mib(size_bytes: usize) -> f64 {
    size_bytes as f64 / (1024.0 * 1024.0)
}

/// Downloader over a shared HTTP client.
pub struct Fetcher {
    http: reqwest::Client,
}

impl Fetcher {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Try each candidate in order; first success wins.
    pub async fn fetch(&self, group: &MediaGroup) -> Result<DownloadedItem> {
        let mut attempts = 0usize;
        let mut last_error = None;

        for candidate in &group.candidates {
            attempts += 1;

            let mut request = self
                .http
                .get(candidate)
                .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT);
            if let Some(referer) = &group.referer {
                request = request.header(reqwest::header::REFERER, referer.as_str());
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!(url = %candidate, error = %e, "candidate request failed");
                    last_error = Some(e.to_string());
                    continue;
                },
            };

            let status = response.status();
            if !status.is_success() {
                debug!(url = %candidate, status = status.as_u16(), "candidate rejected");
                last_error = Some(format!("HTTP {}", status.as_u16()));
                continue;
            }

            // The advertised length lets us refuse an oversized payload
            // without reading it; bodies without one are checked after read.
            if let Some(declared) = response.content_length() {
                if declared as usize > MAX_FILE_SIZE {
                    warn!(url = %candidate, size_bytes = declared, "payload over size cap");
                    return Err(FetchError::Oversized {
                        size_bytes: declared as usize,
                    });
                }
            }

            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(url = %candidate, error = %e, "candidate body read failed");
                    last_error = Some(e.to_string());
                    continue;
                },
            };

            if bytes.len() > MAX_FILE_SIZE {
                warn!(url = %candidate, size_bytes = bytes.len(), "payload over size cap");
                return Err(FetchError::Oversized {
                    size_bytes: bytes.len(),
                });
            }

            debug!(url = %candidate, size_bytes = bytes.len(), "candidate accepted");
            return Ok(DownloadedItem {
                filename: filename_from_url(candidate),
                bytes: bytes.to_vec(),
            });
        }

        Err(FetchError::Exhausted {
            attempts,
            last_error,
        })
    }

    /// Fetch every group, one result per group, in input order. A failure on
    /// one group never aborts processing of the others.
    pub async fn fetch_all(&self, groups: &[MediaGroup]) -> Vec<Result<DownloadedItem>> {
        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            results.push(self.fetch(group).await);
        }
        results
    }
}

/// Attachment filename from the accepted URL's path, query stripped.
fn filename_from_url(candidate: &str) -> String {
    let fallback = "media.bin";
    match url::Url::parse(candidate) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
            .to_string(),
        Err(_) => fallback.to_string(),
    }
}
