//! pixiv artwork resolution via the phixiv metadata frontend.
//!
//! `GET {base}/api/info?id={artwork}` returns proxy image URLs carrying the
//! original `/img-original/img/YYYY/MM/DD/hh/mm/ss/{id}_p{page}.{ext}` path.
//! The proxy host is swapped for the canonical `i.pximg.net` origin, and
//! because the hosted extension reported by the proxy is not reliable, each
//! page becomes a candidate set over the extensions pixiv actually serves.
//! Downloads from `i.pximg.net` must carry a pixiv referer or the origin
//! answers 403.

use {
    serde::Deserialize,
    tracing::{debug, warn},
};

use pictor_links::LinkDescriptor;

use crate::{BROWSER_USER_AGENT, MediaGroup, ResolveError, Result};

/// Canonical image origin behind the proxy URLs.
const IMAGE_ORIGIN: &str = "https://i.pximg.net";

/// Referer accepted by the image origin's hot-link protection.
pub(crate) const PIXIV_REFERER: &str = "https://www.pixiv.net/";

/// Extensions tried per page, in order of how often pixiv serves them.
const CANDIDATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "gif"];

#[derive(Debug, Deserialize)]
struct ArtworkInfo {
    #[serde(default)]
    image_proxy_urls: Vec<String>,
}

pub(crate) async fn resolve(
    http: &reqwest::Client,
    base: &str,
    link: &LinkDescriptor,
) -> Result<Vec<MediaGroup>> {
    let endpoint = format!("{base}/api/info?id={}", link.item_id);
    debug!(url = %endpoint, "fetching artwork metadata");

    let response = http
        .get(&endpoint)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %endpoint, status = status.as_u16(), "artwork metadata request failed");
        return Err(ResolveError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    let info: ArtworkInfo = serde_json::from_str(&body)?;

    if info.image_proxy_urls.is_empty() {
        return Err(ResolveError::NoMedia);
    }

    debug!(
        item_id = %link.item_id,
        pages = info.image_proxy_urls.len(),
        "resolved artwork pages"
    );
    Ok(info
        .image_proxy_urls
        .iter()
        .map(|proxy| MediaGroup {
            candidates: extension_candidates(&canonicalize(proxy)),
            referer: Some(PIXIV_REFERER.to_string()),
        })
        .collect())
}

/// Swap the proxy host for the canonical image origin, keeping the date
/// path. A proxy URL that does not parse is passed through untouched so the
/// downloader can still try it.
fn canonicalize(proxy_url: &str) -> String {
    match url::Url::parse(proxy_url) {
        Ok(parsed) => format!("{IMAGE_ORIGIN}{}", parsed.path()),
        Err(_) => proxy_url.to_string(),
    }
}

/// Expand one canonical URL into the candidate set over known extensions.
/// A URL with no extension stays a singleton.
fn extension_candidates(canonical: &str) -> Vec<String> {
    let Some((dir, file)) = canonical.rsplit_once('/') else {
        return vec![canonical.to_string()];
    };
    let Some((stem, _)) = file.rsplit_once('.') else {
        return vec![canonical.to_string()];
    };
    CANDIDATE_EXTENSIONS
        .iter()
        .map(|ext| format!("{dir}/{stem}.{ext}"))
        .collect()
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use pictor_links::{LinkDescriptor, Provider};

    use super::*;

    fn artwork_link(id: &str) -> LinkDescriptor {
        LinkDescriptor {
            provider: Provider::Pixiv,
            item_id: id.to_string(),
            original_url: format!("https://www.pixiv.net/artworks/{id}"),
        }
    }

    #[test]
    fn proxy_urls_map_to_the_canonical_origin() {
        let canonical = canonicalize(
            "https://proxy.example.net/img-original/img/2024/03/01/00/05/57/116001717_p0.png",
        );
        assert_eq!(
            canonical,
            "https://i.pximg.net/img-original/img/2024/03/01/00/05/57/116001717_p0.png"
        );
    }

    #[test]
    fn candidates_cover_every_known_extension() {
        let candidates = extension_candidates(
            "https://i.pximg.net/img-original/img/2024/03/01/00/05/57/116001717_p0.png",
        );
        assert_eq!(
            candidates,
            vec![
                "https://i.pximg.net/img-original/img/2024/03/01/00/05/57/116001717_p0.png",
                "https://i.pximg.net/img-original/img/2024/03/01/00/05/57/116001717_p0.jpg",
                "https://i.pximg.net/img-original/img/2024/03/01/00/05/57/116001717_p0.gif",
            ]
        );
    }

    #[test]
    fn url_without_extension_stays_singleton() {
        let candidates = extension_candidates("https://i.pximg.net/img/file");
        assert_eq!(candidates, vec!["https://i.pximg.net/img/file"]);
    }

    #[tokio::test]
    async fn one_group_per_page_in_page_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/info?id=116001717")
            .with_status(200)
            .with_body(format!(
                r#"{{"image_proxy_urls":[
                    "{0}/img-original/img/2024/03/01/00/05/57/116001717_p0.png",
                    "{0}/img-original/img/2024/03/01/00/05/57/116001717_p1.png"
                ]}}"#,
                server.url()
            ))
            .create_async()
            .await;

        let groups = resolve(
            &reqwest::Client::new(),
            &server.url(),
            &artwork_link("116001717"),
        )
        .await
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert!(groups[0].candidates[0].ends_with("116001717_p0.png"));
        assert!(groups[1].candidates[0].ends_with("116001717_p1.png"));
        for group in &groups {
            assert_eq!(group.candidates.len(), 3);
            assert!(group.candidates[0].starts_with("https://i.pximg.net/"));
            assert_eq!(group.referer.as_deref(), Some(PIXIV_REFERER));
        }
    }

    #[tokio::test]
    async fn missing_artwork_is_no_media() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/info?id=1")
            .with_status(200)
            .with_body(r#"{"image_proxy_urls":[]}"#)
            .create_async()
            .await;

        let err = resolve(&reqwest::Client::new(), &server.url(), &artwork_link("1"))
            .await
            .unwrap_err();
        assert!(err.is_no_media());
    }

    #[tokio::test]
    async fn upstream_error_status_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/info?id=2")
            .with_status(404)
            .create_async()
            .await;

        let err = resolve(&reqwest::Client::new(), &server.url(), &artwork_link("2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Status { status: 404 }));
    }
}
