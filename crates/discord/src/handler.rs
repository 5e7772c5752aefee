//! Discord event handler.
//!
//! Implements the serenity `EventHandler`: inbound messages are checked for
//! the preference toggle command, then for provider links (each match spawns
//! a pipeline task), then against the canned-reply rule table. Reaction
//! events go to the replay adapter.

use std::sync::Arc;

use {
    serenity::{
        all::{Context, EventHandler, GatewayIntents, Message, Reaction, Ready},
        async_trait,
    },
    tracing::{debug, info, warn},
};

use pictor_prefs::DeliveryPreference;

use crate::{
    pipeline::{self, MediaSource, PipelineOrigin},
    reactions,
    state::BotState,
};

/// Message command flipping the sender's delivery preference.
const TOGGLE_COMMAND: &str = "!dm";

/// Handler for Discord gateway events.
pub struct Handler {
    state: Arc<BotState>,
}

impl Handler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::DIRECT_MESSAGE_REACTIONS
    }

    async fn handle_toggle(&self, ctx: &Context, msg: &Message) {
        let confirmation = match self.state.prefs.toggle(msg.author.id.get()).await {
            Ok(DeliveryPreference::DirectMessage) => "Got it, images go to your DMs now.",
            Ok(DeliveryPreference::Channel) => "Got it, images go to the channel now.",
            Err(e) => {
                warn!(error = %e, user_id = msg.author.id.get(), "preference toggle failed");
                "Couldn't update your delivery preference, try again later."
            },
        };
        if let Err(e) = msg.channel_id.say(&ctx.http, confirmation).await {
            warn!(error = %e, "failed to confirm preference toggle");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Skip bot messages to prevent loops
        if msg.author.bot {
            return;
        }

        if msg.content.trim() == TOGGLE_COMMAND {
            self.handle_toggle(&ctx, &msg).await;
            return;
        }

        if let Some(link) = pictor_links::extract(&msg.content) {
            debug!(
                user_id = msg.author.id.get(),
                url = %link.original_url,
                "spawning media pipeline"
            );
            let origin = PipelineOrigin {
                channel_id: msg.channel_id,
                message_id: msg.id,
                requester: msg.author.id,
            };
            tokio::spawn(pipeline::run(
                Arc::clone(&self.state),
                Arc::clone(&ctx.http),
                origin,
                MediaSource::Link(link),
            ));
            return;
        }

        if self.state.rules.is_empty() {
            return;
        }
        let bot_id = ctx.cache.current_user().id;
        let mentioned = msg.mentions_user_id(bot_id);
        // Scoped so the thread rng never crosses an await point.
        let reply = {
            let mut rng = rand::rng();
            self.state
                .rules
                .respond(&msg.content, mentioned, &mut rng)
                .map(str::to_string)
        };
        if let Some(reply) = reply {
            if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
                warn!(error = %e, "failed to send canned reply");
            }
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        reactions::handle(Arc::clone(&self.state), ctx, reaction).await;
    }
}
