//! Reaction-triggered replay.
//!
//! Adding one of the watched emojis to a message re-extracts its media (from
//! the text, or from embeds when the message carries no recognized link) and
//! runs the pipeline on behalf of the reacting user. Re-triggering re-runs
//! the pipeline; the bot's own mirrored copy of the trigger emoji is added
//! at most once so the marker never visibly duplicates.

use std::sync::Arc;

use {
    serenity::all::{Context, Message, Reaction, ReactionType},
    tracing::warn,
};

use pictor_resolve::MediaGroup;

use crate::{
    pipeline::{self, MediaSource, PipelineOrigin},
    state::BotState,
};

/// Emojis that trigger a replay when added to any message.
pub(crate) const WATCHED_REACTIONS: [&str; 2] = ["📥", "⬇️"];

fn is_watched(emoji: &ReactionType) -> bool {
    matches!(emoji, ReactionType::Unicode(name) if WATCHED_REACTIONS.contains(&name.as_str()))
}

pub(crate) async fn handle(state: Arc<BotState>, ctx: Context, reaction: Reaction) {
    if !is_watched(&reaction.emoji) {
        return;
    }

    let user = match reaction.user(&ctx.http).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "failed to look up reacting user");
            return;
        },
    };
    if user.bot {
        return;
    }

    let message = match reaction.message(&ctx.http).await {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, message_id = reaction.message_id.get(), "failed to fetch reacted message");
            return;
        },
    };

    let Some(source) = media_source(&message) else {
        return;
    };

    let already_marked = message
        .reactions
        .iter()
        .any(|r| r.me && r.reaction_type == reaction.emoji);
    if !already_marked {
        if let Err(e) = message.react(&ctx.http, reaction.emoji.clone()).await {
            warn!(error = %e, "failed to mirror trigger reaction");
        }
    }

    let origin = PipelineOrigin {
        channel_id: message.channel_id,
        message_id: message.id,
        requester: user.id,
    };
    tokio::spawn(pipeline::run(state, Arc::clone(&ctx.http), origin, source));
}

/// Media the same way a live message would carry it: a provider link in the
/// text, or embedded images when no link is recognized.
fn media_source(message: &Message) -> Option<MediaSource> {
    if let Some(link) = pictor_links::extract(&message.content) {
        return Some(MediaSource::Link(link));
    }

    let groups: Vec<MediaGroup> = message
        .embeds
        .iter()
        .filter_map(|embed| {
            embed
                .image
                .as_ref()
                .map(|image| image.url.clone())
                .or_else(|| embed.thumbnail.as_ref().map(|thumb| thumb.url.clone()))
        })
        .map(MediaGroup::direct)
        .collect();

    if groups.is_empty() {
        None
    } else {
        Some(MediaSource::Embedded(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_emojis_match() {
        assert!(is_watched(&ReactionType::Unicode("📥".to_string())));
        assert!(is_watched(&ReactionType::Unicode("⬇️".to_string())));
    }

    #[test]
    fn other_emojis_do_not_match() {
        assert!(!is_watched(&ReactionType::Unicode("👍".to_string())));
        assert!(!is_watched(&ReactionType::Custom {
            animated: false,
            id: serenity::all::EmojiId::new(1),
            name: Some("inbox".to_string()),
        }));
    }
}
