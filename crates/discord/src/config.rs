use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Configuration for the Discord bot account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Cap on concurrently running media pipelines. Each inbound link or
    /// watched reaction takes one slot for its whole resolve/download/deliver
    /// run; excess events wait.
    pub max_concurrent_pipelines: usize,

    /// Per-HTTP-call timeout for metadata and download requests. A call that
    /// times out is treated as a failed candidate, not a stuck pipeline.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("max_concurrent_pipelines", &self.max_concurrent_pipelines)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            max_concurrent_pipelines: 4,
            request_timeout_secs: 30,
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = DiscordConfig::default();
        assert_eq!(cfg.max_concurrent_pipelines, 4);
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn deserialize_from_json() {
        let json = r#"{
            "token": "bot-token",
            "max_concurrent_pipelines": 2
        }"#;
        let cfg: DiscordConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.token.expose_secret(), "bot-token");
        assert_eq!(cfg.max_concurrent_pipelines, 2);
        // defaults for unspecified fields
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn debug_redacts_the_token() {
        let cfg = DiscordConfig {
            token: Secret::new("very-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("very-secret"));
    }
}
