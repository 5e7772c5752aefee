//! Delivery routing: batch downloaded images and send them where the
//! requesting user wants them.
//!
//! Discord accepts at most [`ATTACHMENT_BATCH_SIZE`] attachments per
//! message, so items are partitioned into fixed-size batches preserving
//! page order. A DM destination that turns out to be blocked by privacy
//! settings falls back to the originating channel with a mention notice;
//! items already delivered to the DM are never re-sent.

use {
    serenity::{
        all::{ChannelId, CreateAttachment, CreateMessage, Http, Mentionable, UserId},
        http::HttpError,
    },
    tracing::{info, warn},
};

use {pictor_fetch::DownloadedItem, pictor_prefs::DeliveryPreference};

use crate::error::Result;

/// Platform ceiling on attachments per outgoing message.
pub const ATTACHMENT_BATCH_SIZE: usize = 10;

/// Discord JSON error code for "Cannot send messages to this user".
const CANNOT_MESSAGE_USER: isize = 50007;

/// Counts handed to status feedback and test assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Send `items` according to `preference`, batching under the attachment
/// ceiling and falling back to `origin` when private delivery is blocked.
pub async fn deliver(
    http: &Http,
    preference: DeliveryPreference,
    items: Vec<DownloadedItem>,
    origin: ChannelId,
    requester: UserId,
) -> Result<DeliveryReport> {
    if items.is_empty() {
        return Ok(DeliveryReport::default());
    }
    let batches = partition(items);

    match preference {
        DeliveryPreference::Channel => Ok(send_batches(http, origin, &batches).await),
        DeliveryPreference::DirectMessage => {
            let dm = match requester.create_dm_channel(http).await {
                Ok(dm) => dm.id,
                Err(e) if is_dm_blocked(&e) => {
                    info!(user_id = requester.get(), "dm channel unavailable, falling back");
                    return Ok(fall_back(http, origin, requester, &batches, DeliveryReport::default()).await);
                },
                Err(e) => return Err(e.into()),
            };

            let mut report = DeliveryReport::default();
            for (index, batch) in batches.iter().enumerate() {
                match send_batch(http, dm, batch).await {
                    Ok(()) => report.delivered += batch.len(),
                    Err(e) if is_dm_blocked(&e) => {
                        info!(user_id = requester.get(), "private delivery blocked, falling back");
                        return Ok(fall_back(http, origin, requester, &batches[index..], report).await);
                    },
                    Err(e) => {
                        warn!(error = %e, user_id = requester.get(), "dm batch send failed");
                        report.failed += batch.len();
                    },
                }
            }
            Ok(report)
        },
    }
}

/// Deliver the still-undelivered batches to the originating channel, with a
/// notice so the user knows why their DM preference was not honored.
async fn fall_back(
    http: &Http,
    origin: ChannelId,
    requester: UserId,
    remaining: &[Vec<DownloadedItem>],
    mut report: DeliveryReport,
) -> DeliveryReport {
    let notice = format!(
        "{} couldn't DM you (privacy settings), posting here instead.",
        requester.mention()
    );
    if let Err(e) = origin.say(http, notice).await {
        warn!(error = %e, "failed to send dm fallback notice");
    }

    let channel_report = send_batches(http, origin, remaining).await;
    report.delivered += channel_report.delivered;
    report.failed += channel_report.failed;
    report
}

async fn send_batches(
    http: &Http,
    channel: ChannelId,
    batches: &[Vec<DownloadedItem>],
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for batch in batches {
        match send_batch(http, channel, batch).await {
            Ok(()) => report.delivered += batch.len(),
            Err(e) => {
                warn!(error = %e, channel_id = channel.get(), "batch send failed");
                report.failed += batch.len();
            },
        }
    }
    report
}

async fn send_batch(
    http: &Http,
    channel: ChannelId,
    batch: &[DownloadedItem],
) -> serenity::Result<()> {
    let files = batch
        .iter()
        .map(|item| CreateAttachment::bytes(item.bytes.clone(), item.filename.clone()));
    channel
        .send_message(http, CreateMessage::new().add_files(files))
        .await?;
    Ok(())
}

/// Fixed-size batches preserving original item order.
fn partition(items: Vec<DownloadedItem>) -> Vec<Vec<DownloadedItem>> {
    let mut batches = Vec::new();
    let mut current = Vec::with_capacity(ATTACHMENT_BATCH_SIZE);
    for item in items {
        current.push(item);
        if current.len() == ATTACHMENT_BATCH_SIZE {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

fn is_dm_blocked(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            response.error.code == CANNOT_MESSAGE_USER || response.status_code.as_u16() == 403
        },
        _ => false,
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn items(count: usize) -> Vec<DownloadedItem> {
        (0..count)
            .map(|i| DownloadedItem {
                filename: format!("img_{i}.png"),
                bytes: vec![i as u8],
            })
            .collect()
    }

    #[test]
    fn twenty_three_items_make_three_batches() {
        let batches = partition(items(23));
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
    }

    #[test]
    fn order_is_preserved_across_batches() {
        let batches = partition(items(23));
        let flattened: Vec<String> = batches
            .into_iter()
            .flatten()
            .map(|item| item.filename)
            .collect();
        let expected: Vec<String> = (0..23).map(|i| format!("img_{i}.png")).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn small_sets_stay_a_single_batch() {
        assert_eq!(partition(items(1)).len(), 1);
        assert_eq!(partition(items(10)).len(), 1);
        assert_eq!(partition(items(11)).len(), 2);
    }

    #[test]
    fn empty_input_makes_no_batches() {
        assert!(partition(Vec::new()).is_empty());
    }
}
