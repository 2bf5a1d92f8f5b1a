// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message relay between the two platforms.
//!
//! Outbound-to-user delivery is two-tier: rich formatting first, one plain
//! retry when the transport reports a formatting-class rejection. Outbound-
//! to-mirror delivery resolves the ticket's channel, falling back to the
//! configured default channel when the linked one is gone.

use tracing::{debug, warn};

use relaydesk_core::traits::{MirrorTransport, NewChannelSpec, OriginTransport, TextFormat, UserAction};
use relaydesk_core::types::{ChannelId, Ticket, UserId};
use relaydesk_core::{BridgeError, naming};
use relaydesk_store::TicketStore;

/// Which tier a user-bound message was delivered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTier {
    Rich,
    Plain,
}

/// Where a mirror-bound message landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    TicketChannel,
    DefaultChannel,
}

/// Sends `text` to a user, retrying once in plain formatting when the rich
/// attempt is rejected for formatting reasons. Actions are preserved across
/// the retry. Transport-class failures are not retried.
pub async fn deliver_to_user(
    origin: &dyn OriginTransport,
    user_id: &UserId,
    text: &str,
    actions: &[UserAction],
) -> Result<DeliveryTier, BridgeError> {
    match origin.send_message(user_id, text, TextFormat::Rich, actions).await {
        Ok(()) => Ok(DeliveryTier::Rich),
        Err(err) if err.is_formatting() => {
            warn!(user_id = %user_id, error = %err, "rich delivery rejected, retrying plain");
            origin
                .send_message(user_id, text, TextFormat::Plain, actions)
                .await?;
            Ok(DeliveryTier::Plain)
        }
        Err(err) => Err(err),
    }
}

/// Creates the mirror channel for a freshly created ticket and records the
/// link in the store. The transport posts the initial full-context message
/// as part of creation.
pub async fn open_mirror_channel(
    mirror: &dyn MirrorTransport,
    tickets: &mut TicketStore,
    ticket: &Ticket,
) -> Result<ChannelId, BridgeError> {
    let spec = NewChannelSpec {
        name: naming::channel_name(ticket),
        topic: naming::channel_topic(ticket),
    };
    let channel = mirror.create_ticket_channel(ticket, &spec).await?;
    tickets.assign_mirror_channel(&ticket.id, channel.clone());
    debug!(ticket_id = %ticket.id, channel_id = %channel, "mirror channel created");
    Ok(channel)
}

/// Relays a follow-up user message into the mirror side.
///
/// Resolution order: the ticket's linked channel when it still exists, then
/// the configured default channel, then [`BridgeError::NoChannelAvailable`].
/// Messages landing in the default channel carry a context header because
/// the channel itself identifies nothing.
pub async fn relay_user_message(
    mirror: &dyn MirrorTransport,
    ticket: &Ticket,
    text: &str,
) -> Result<RelayOutcome, BridgeError> {
    if let Some(channel) = &ticket.mirror_channel_id {
        match mirror.channel_exists(channel).await {
            Ok(true) => {
                mirror.post_reply(channel, ticket, text).await?;
                return Ok(RelayOutcome::TicketChannel);
            }
            Ok(false) => {
                warn!(
                    ticket_id = %ticket.id,
                    channel_id = %channel,
                    "linked mirror channel is gone, falling back"
                );
            }
            Err(err) => {
                warn!(ticket_id = %ticket.id, error = %err, "channel existence check failed");
            }
        }
    }

    let Some(fallback) = mirror.default_channel() else {
        return Err(BridgeError::NoChannelAvailable);
    };
    let headed = format!(
        "[Ticket #{} | {}] {}",
        ticket.id, ticket.username, text
    );
    mirror.post_reply(&fallback, ticket, &headed).await?;
    Ok(RelayOutcome::DefaultChannel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relaydesk_core::types::{TicketId, TicketStatus};
    use relaydesk_store::JsonFile;
    use relaydesk_test_utils::{MockMirror, MockOrigin};

    fn ticket(channel: Option<&str>) -> Ticket {
        Ticket {
            id: TicketId("100_1".into()),
            user_id: UserId("100".into()),
            username: "alice".into(),
            display_name: "Alice".into(),
            subject: "Login issue".into(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            mirror_channel_id: channel.map(|c| ChannelId(c.into())),
            messages: vec![],
        }
    }

    #[tokio::test]
    async fn rich_delivery_succeeds_first_try() {
        let origin = MockOrigin::new();
        let tier = deliver_to_user(&origin, &UserId("1".into()), "hi", &[])
            .await
            .unwrap();
        assert_eq!(tier, DeliveryTier::Rich);
        assert_eq!(origin.sent_count().await, 1);
    }

    #[tokio::test]
    async fn formatting_rejection_degrades_to_plain() {
        let origin = MockOrigin::new();
        origin.fail_rich_sends();
        let actions = [UserAction::new("Close Ticket", "direct_close_1_1")];
        let tier = deliver_to_user(&origin, &UserId("1".into()), "hi *there*", &actions)
            .await
            .unwrap();
        assert_eq!(tier, DeliveryTier::Plain);

        let sent = origin.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].format, TextFormat::Plain);
        assert_eq!(sent[0].action_labels, vec!["Close Ticket"]);
    }

    #[tokio::test]
    async fn transport_failure_is_not_retried() {
        let origin = MockOrigin::new();
        origin.fail_all_sends();
        let err = deliver_to_user(&origin, &UserId("1".into()), "hi", &[])
            .await
            .unwrap_err();
        assert!(!err.is_formatting());
        assert_eq!(origin.sent_count().await, 0);
    }

    #[tokio::test]
    async fn relay_prefers_linked_channel() {
        let mirror = MockMirror::with_default_channel(ChannelId("default".into()));
        mirror.add_existing("chan-1").await;

        let outcome = relay_user_message(&mirror, &ticket(Some("chan-1")), "follow-up")
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::TicketChannel);

        let replies = mirror.posted_replies().await;
        assert_eq!(replies[0].0.0, "chan-1");
        assert_eq!(replies[0].1, "follow-up");
    }

    #[tokio::test]
    async fn relay_falls_back_to_default_with_context_header() {
        let mirror = MockMirror::with_default_channel(ChannelId("default".into()));
        // linked channel was deleted manually
        let outcome = relay_user_message(&mirror, &ticket(Some("gone")), "still broken")
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::DefaultChannel);

        let replies = mirror.posted_replies().await;
        assert_eq!(replies[0].0.0, "default");
        assert!(replies[0].1.contains("Ticket #100_1"));
        assert!(replies[0].1.contains("alice"));
        assert!(replies[0].1.contains("still broken"));
    }

    #[tokio::test]
    async fn relay_errors_when_nothing_resolves() {
        let mirror = MockMirror::new();
        let err = relay_user_message(&mirror, &ticket(None), "text")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NoChannelAvailable));
    }

    #[tokio::test]
    async fn open_channel_links_ticket() {
        let mirror = MockMirror::new();
        let dir = tempfile::tempdir().unwrap();
        let mut store = TicketStore::open(JsonFile::new(dir.path().join("t.json"))).unwrap();
        let profile = relaydesk_core::types::UserProfile {
            id: UserId("100".into()),
            username: Some("alice".into()),
            display_name: "Alice".into(),
        };
        let ticket = store.create(&profile, "Login issue", "description here").unwrap();

        let channel = open_mirror_channel(&mirror, &mut store, &ticket).await.unwrap();
        let linked = store.find_by_mirror_channel(&channel).unwrap();
        assert_eq!(linked.id, ticket.id);

        let created = mirror.created_channels().await;
        assert_eq!(created[0].spec.name, "ticket-100_1-login-issue");
        assert!(created[0].spec.topic.contains("Origin ID: 100"));
    }
}
