//! One pipeline run: resolve → download → deliver, with status markers.
//!
//! Every qualifying message or reaction spawns one of these as an
//! independent task. Failures are handled at the narrowest scope that can
//! still make progress; nothing here is fatal to the process. Every
//! failure ends in a user-visible message or marker.

use std::sync::Arc;

use {
    serenity::all::{ChannelId, Http, MessageId, UserId},
    tracing::{info, warn},
};

use {
    pictor_links::LinkDescriptor,
    pictor_resolve::MediaGroup,
};

use crate::{outbound, state::BotState, status};

/// Where the media came from.
pub(crate) enum MediaSource {
    /// A recognized provider link, still to be resolved.
    Link(LinkDescriptor),
    /// Already-known URLs (message embeds), resolver skipped.
    Embedded(Vec<MediaGroup>),
}

/// The message a pipeline run was started from.
pub(crate) struct PipelineOrigin {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    /// Preference key and mention/DM target.
    pub requester: UserId,
}

/// Run the full pipeline to completion, bounded by the shared semaphore.
pub(crate) async fn run(
    state: Arc<BotState>,
    http: Arc<Http>,
    origin: PipelineOrigin,
    source: MediaSource,
) {
    // The semaphore is never closed, so acquire only fails on shutdown.
    let Ok(_permit) = state.pipelines.acquire().await else {
        return;
    };

    status::processing(&http, origin.channel_id, origin.message_id).await;
    let ok = execute(&state, &http, &origin, source).await;
    status::finish(&http, origin.channel_id, origin.message_id, ok).await;
}

async fn execute(
    state: &BotState,
    http: &Http,
    origin: &PipelineOrigin,
    source: MediaSource,
) -> bool {
    let groups = match source {
        MediaSource::Link(link) => {
            info!(
                provider = ?link.provider,
                url = %link.original_url,
                user_id = origin.requester.get(),
                "resolving media link"
            );
            match state.resolver.resolve(&link).await {
                Ok(groups) => groups,
                Err(e) => {
                    warn!(url = %link.original_url, error = %e, "metadata resolution failed");
                    let text = if e.is_no_media() {
                        "No media found behind that link.".to_string()
                    } else {
                        format!("The media service is not answering right now ({e}).")
                    };
                    say(http, origin.channel_id, &text).await;
                    return false;
                },
            }
        },
        MediaSource::Embedded(groups) => groups,
    };

    let results = state.fetcher.fetch_all(&groups).await;
    let total = results.len();

    let mut items = Vec::new();
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(item) => items.push(item),
            Err(e) => failures.push((index, e)),
        }
    }

    // Per-item failure report; sibling groups still get delivered. An
    // oversized image counts as found, its size line is the outcome.
    if !failures.is_empty() {
        let lines: Vec<String> = failures
            .iter()
            .map(|(index, e)| format!("image {}/{total}: {e}", index + 1))
            .collect();
        say(http, origin.channel_id, &lines.join("\n")).await;
    }

    if items.is_empty() {
        return false;
    }

    let preference = state.prefs.get(origin.requester.get()).await;
    match outbound::deliver(http, preference, items, origin.channel_id, origin.requester).await {
        Ok(report) => {
            info!(
                delivered = report.delivered,
                failed = report.failed,
                total,
                user_id = origin.requester.get(),
                "delivery finished"
            );
            report.failed == 0 && report.delivered > 0
        },
        Err(e) => {
            warn!(error = %e, "delivery failed");
            say(http, origin.channel_id, "Couldn't deliver the images.").await;
            false
        },
    }
}

async fn say(http: &Http, channel: ChannelId, text: &str) {
    if let Err(e) = channel.say(http, text).await {
        warn!(error = %e, channel_id = channel.get(), "failed to send diagnostic message");
    }
}
