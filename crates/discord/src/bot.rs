use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    serenity::all::Client,
    tracing::info,
};

use {pictor_autoreply::RuleTable, pictor_prefs::PreferenceStore};

use crate::{config::DiscordConfig, handler::Handler, state::BotState};

/// Connect and run the bot until the gateway connection ends.
pub async fn start(
    config: DiscordConfig,
    prefs: Arc<dyn PreferenceStore>,
    rules: RuleTable,
) -> anyhow::Result<()> {
    let token = config.token.expose_secret().clone();
    let state = Arc::new(BotState::new(config, prefs, rules)?);

    info!(
        max_concurrent_pipelines = state.config.max_concurrent_pipelines,
        rules = state.rules.rules.len(),
        "starting discord gateway client"
    );

    let mut client = Client::builder(&token, Handler::intents())
        .event_handler(Handler::new(state))
        .await?;

    client.start().await?;
    Ok(())
}
