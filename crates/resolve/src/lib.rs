//! Provider metadata resolution: turn a recognized link into candidate
//! download URLs.
//!
//! One implementation per provider. Each takes the canonical item id from a
//! [`LinkDescriptor`], calls that provider's metadata API, and returns the
//! post's media as an ordered sequence of [`MediaGroup`]s (page order for
//! multi-image posts).

pub mod error;
mod pixiv;
mod twitter;

use pictor_links::{LinkDescriptor, Provider};

pub use error::{ResolveError, Result};

/// Browser-like user agent sent with every provider request. Both metadata
/// APIs and the pixiv image origin reject clients with a bare default agent.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

const TWITTER_API_BASE: &str = "https://api.vxtwitter.com";
const PIXIV_API_BASE: &str = "https://www.phixiv.net";

/// Candidate URLs hypothesized to reference one logical image, tried in
/// order by the downloader until one succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaGroup {
    pub candidates: Vec<String>,
    /// Referer header required by the hosting origin, when it enforces
    /// hot-link protection.
    pub referer: Option<String>,
}

impl MediaGroup {
    /// A group with a single, fully-qualified URL and no special headers.
    #[must_use]
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            candidates: vec![url.into()],
            referer: None,
        }
    }
}

/// Metadata resolver over a shared HTTP client.
pub struct Resolver {
    http: reqwest::Client,
    twitter_api: String,
    pixiv_api: String,
}

impl Resolver {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_bases(http, TWITTER_API_BASE, PIXIV_API_BASE)
    }

    /// Resolver with overridden API origins, for tests and self-hosted
    /// mirrors of the metadata frontends.
    #[must_use]
    pub fn with_bases(
        http: reqwest::Client,
        twitter_api: impl Into<String>,
        pixiv_api: impl Into<String>,
    ) -> Self {
        Self {
            http,
            twitter_api: twitter_api.into(),
            pixiv_api: pixiv_api.into(),
        }
    }

    /// Resolve a link to its media groups, in page order.
    pub async fn resolve(&self, link: &LinkDescriptor) -> Result<Vec<MediaGroup>> {
        match link.provider {
            Provider::Twitter => twitter::resolve(&self.http, &self.twitter_api, link).await,
            Provider::Pixiv => pixiv::resolve(&self.http, &self.pixiv_api, link).await,
        }
    }
}
