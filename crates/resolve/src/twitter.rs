//! Twitter/X status resolution via the vxtwitter metadata frontend.
//!
//! `GET {base}/{user}/status/{id}` returns a JSON document whose `mediaURLs`
//! array already carries fully-qualified CDN URLs, so every entry becomes a
//! singleton media group.

use {
    serde::Deserialize,
    tracing::{debug, warn},
};

use pictor_links::LinkDescriptor;

use crate::{BROWSER_USER_AGENT, MediaGroup, ResolveError, Result};

#[derive(Debug, Deserialize)]
struct StatusMetadata {
    #[serde(default, rename = "mediaURLs")]
    media_urls: Vec<String>,
}

pub(crate) async fn resolve(
    http: &reqwest::Client,
    base: &str,
    link: &LinkDescriptor,
) -> Result<Vec<MediaGroup>> {
    let endpoint = format!("{base}/{}", link.item_id);
    debug!(url = %endpoint, "fetching status metadata");

    let response = http
        .get(&endpoint)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %endpoint, status = status.as_u16(), "status metadata request failed");
        return Err(ResolveError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    let metadata: StatusMetadata = serde_json::from_str(&body)?;

    if metadata.media_urls.is_empty() {
        return Err(ResolveError::NoMedia);
    }

    debug!(
        item_id = %link.item_id,
        media_count = metadata.media_urls.len(),
        "resolved status media"
    );
    Ok(metadata.media_urls.into_iter().map(MediaGroup::direct).collect())
}
