//! Link recognition for supported media providers.
//!
//! Pure pattern matching over raw message text, no I/O. A message yields at
//! most one [`LinkDescriptor`]; provider patterns are mutually exclusive by
//! URL shape and are checked in a fixed order.

use {once_cell::sync::Lazy, regex::Regex};

static TWITTER_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?(?:x\.com|twitter\.com|vxtwitter\.com|fxtwitter\.com)/([A-Za-z0-9_]{1,15})/status/(\d+)",
    )
    .unwrap_or_else(|e| panic!("invalid twitter pattern: {e}"))
});

static PIXIV_ARTWORK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?pixiv\.net/(?:en/)?artworks/(\d+)")
        .unwrap_or_else(|e| panic!("invalid pixiv pattern: {e}"))
});

/// A media-hosting service whose links the bot recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Twitter,
    Pixiv,
}

/// A recognized media link, scoped to one pipeline run.
///
/// `item_id` is the provider-canonical identifier: the `user/status/id` path
/// for Twitter, the numeric artwork id for pixiv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    pub provider: Provider,
    pub item_id: String,
    pub original_url: String,
}

/// Match message text against the known provider URL shapes.
///
/// Returns the first recognized link, or `None` when the message carries no
/// supported link (not an error; the caller simply does nothing).
pub fn extract(text: &str) -> Option<LinkDescriptor> {
    if let Some(caps) = TWITTER_STATUS.captures(text) {
        let user = caps.get(1)?.as_str();
        let status = caps.get(2)?.as_str();
        return Some(LinkDescriptor {
            provider: Provider::Twitter,
            item_id: format!("{user}/status/{status}"),
            original_url: caps.get(0)?.as_str().to_string(),
        });
    }

    if let Some(caps) = PIXIV_ARTWORK.captures(text) {
        return Some(LinkDescriptor {
            provider: Provider::Pixiv,
            item_id: caps.get(1)?.as_str().to_string(),
            original_url: caps.get(0)?.as_str().to_string(),
        });
    }

    None
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_twitter_status_link() {
        let link = extract("look at this https://x.com/someartist/status/1234567890123 wow")
            .unwrap();
        assert_eq!(link.provider, Provider::Twitter);
        assert_eq!(link.item_id, "someartist/status/1234567890123");
        assert_eq!(link.original_url, "https://x.com/someartist/status/1234567890123");
    }

    #[test]
    fn extracts_legacy_twitter_domain() {
        let link = extract("https://twitter.com/a_b/status/42").unwrap();
        assert_eq!(link.provider, Provider::Twitter);
        assert_eq!(link.item_id, "a_b/status/42");
    }

    #[test]
    fn mirror_hosts_keep_their_own_original_url() {
        let link = extract("https://vxtwitter.com/user/status/7").unwrap();
        assert_eq!(link.item_id, "user/status/7");
        assert_eq!(link.original_url, "https://vxtwitter.com/user/status/7");
    }

    #[test]
    fn extracts_pixiv_artwork_link() {
        let link = extract("https://www.pixiv.net/artworks/98765432").unwrap();
        assert_eq!(link.provider, Provider::Pixiv);
        assert_eq!(link.item_id, "98765432");
    }

    #[test]
    fn extracts_pixiv_english_locale_path() {
        let link = extract("https://www.pixiv.net/en/artworks/555").unwrap();
        assert_eq!(link.provider, Provider::Pixiv);
        assert_eq!(link.item_id, "555");
    }

    #[test]
    fn query_parameters_do_not_break_the_match() {
        let link = extract("https://x.com/user/status/99?s=20&t=abc").unwrap();
        assert_eq!(link.item_id, "user/status/99");
    }

    #[test]
    fn first_match_wins_when_both_providers_present() {
        let link = extract(
            "https://x.com/user/status/1 and https://www.pixiv.net/artworks/2",
        )
        .unwrap();
        assert_eq!(link.provider, Provider::Twitter);
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert!(extract("no links here, just chatter").is_none());
        assert!(extract("https://example.com/artworks/123").is_none());
    }

    #[test]
    fn profile_links_are_not_status_links() {
        assert!(extract("https://x.com/someartist").is_none());
    }
}
