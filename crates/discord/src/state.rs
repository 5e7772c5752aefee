use std::{sync::Arc, time::Duration};

use tokio::sync::Semaphore;

use {
    pictor_autoreply::RuleTable, pictor_fetch::Fetcher, pictor_prefs::PreferenceStore,
    pictor_resolve::Resolver,
};

use crate::config::DiscordConfig;

/// State shared by every event handler invocation.
///
/// Pipeline tasks hold an `Arc` of this for their whole run; the preference
/// store is the only member they mutate (and only via the toggle command).
pub struct BotState {
    pub config: DiscordConfig,
    pub resolver: Resolver,
    pub fetcher: Fetcher,
    pub prefs: Arc<dyn PreferenceStore>,
    pub rules: RuleTable,
    /// Bounds concurrent in-flight pipelines (and with them, downstream HTTP
    /// sessions) under burst load.
    pub pipelines: Semaphore,
}

impl BotState {
    pub fn new(
        config: DiscordConfig,
        prefs: Arc<dyn PreferenceStore>,
        rules: RuleTable,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            resolver: Resolver::new(http.clone()),
            fetcher: Fetcher::new(http),
            pipelines: Semaphore::new(config.max_concurrent_pipelines),
            config,
            prefs,
            rules,
        })
    }
}
