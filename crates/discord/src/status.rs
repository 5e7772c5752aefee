//! Progress markers on the originating message.
//!
//! All marker operations are best-effort: a missing-permission failure is
//! logged and never escalated into the pipeline's own outcome.

use {
    serenity::all::{ChannelId, Http, MessageId, ReactionType},
    tracing::warn,
};

pub(crate) const PROCESSING_MARKER: &str = "⏳";
pub(crate) const SUCCESS_MARKER: &str = "✅";
pub(crate) const ERROR_MARKER: &str = "❌";

fn marker(emoji: &str) -> ReactionType {
    ReactionType::Unicode(emoji.to_string())
}

/// Mark the message as being worked on.
pub(crate) async fn processing(http: &Http, channel_id: ChannelId, message_id: MessageId) {
    if let Err(e) = http
        .create_reaction(channel_id, message_id, &marker(PROCESSING_MARKER))
        .await
    {
        warn!(error = %e, message_id = message_id.get(), "failed to add processing marker");
    }
}

/// Swap the processing marker for exactly one terminal marker.
pub(crate) async fn finish(http: &Http, channel_id: ChannelId, message_id: MessageId, ok: bool) {
    if let Err(e) = http
        .delete_reaction_me(channel_id, message_id, &marker(PROCESSING_MARKER))
        .await
    {
        warn!(error = %e, message_id = message_id.get(), "failed to remove processing marker");
    }

    let terminal = if ok { SUCCESS_MARKER } else { ERROR_MARKER };
    if let Err(e) = http
        .create_reaction(channel_id, message_id, &marker(terminal))
        .await
    {
        warn!(error = %e, message_id = message_id.get(), "failed to add terminal marker");
    }
}
