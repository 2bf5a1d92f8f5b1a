// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup channel synchronization.
//!
//! Runs once when the mirror connection comes up. Reconciles the stored
//! open-ticket set against the channels that actually exist: orphaned
//! channels become recovered tickets, stale links are repointed, and open
//! tickets whose channel vanished get a fresh one. The pass is idempotent;
//! running it twice produces no further changes.
//!
//! Channels and tickets younger than the grace window are skipped so the
//! pass never races an in-flight creation.

use chrono::{TimeDelta, Utc};
use tracing::{info, warn};

use relaydesk_core::traits::{MirrorTransport, NewChannelSpec};
use relaydesk_core::types::{Sender, Ticket, TicketMessage, TicketStatus};
use relaydesk_core::{BridgeError, naming};
use relaydesk_store::TicketStore;

/// Channels and tickets younger than this are assumed to be mid-creation.
const GRACE_SECONDS: i64 = 30;

/// Message seeded into a reconstructed ticket's log.
const RECOVERY_NOTE: &str = "Ticket recovered from its mirror channel during startup synchronization; earlier messages live in the channel history.";

/// What one synchronization pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub channels_scanned: usize,
    pub tickets_recovered: usize,
    pub channels_relinked: usize,
    pub channels_created: usize,
    pub skipped_recent: usize,
    pub skipped_unparseable: usize,
}

/// Reconciles the ticket store with the mirror's channel list, persisting
/// once at the end.
pub async fn synchronize(
    mirror: &dyn MirrorTransport,
    tickets: &mut TicketStore,
) -> Result<SyncReport, BridgeError> {
    let now = Utc::now();
    let grace = TimeDelta::seconds(GRACE_SECONDS);
    let mut report = SyncReport::default();

    let channels = mirror.list_ticket_channels().await?;
    let live_ids: Vec<&str> = channels.iter().map(|c| c.id.0.as_str()).collect();

    for channel in &channels {
        if !naming::is_active_ticket_channel(&channel.name) {
            continue;
        }
        report.channels_scanned += 1;

        let Some(topic) = channel.topic.as_deref() else {
            warn!(channel = %channel.name, "ticket channel without topic, skipping");
            report.skipped_unparseable += 1;
            continue;
        };
        let Some((ticket_id, user_id)) = naming::parse_topic(topic) else {
            warn!(channel = %channel.name, "ticket channel topic lacks metadata, skipping");
            report.skipped_unparseable += 1;
            continue;
        };

        let known = tickets
            .open_tickets()
            .find(|t| t.id == ticket_id)
            .map(|t| (t.id.clone(), t.created_at, t.mirror_channel_id.clone()));

        match known {
            Some((id, created_at, linked)) => {
                // A ticket this young may still be mid channel assignment.
                if now - created_at < grace {
                    report.skipped_recent += 1;
                    continue;
                }
                if linked.as_ref() != Some(&channel.id) {
                    tickets.relink_mirror_channel(&id, channel.id.clone());
                    report.channels_relinked += 1;
                    info!(ticket_id = %id, channel_id = %channel.id, "relinked mirror channel");
                }
            }
            None => {
                // A channel this young may belong to an in-flight creation
                // whose ticket has not been persisted yet.
                if now - channel.created_at < grace {
                    report.skipped_recent += 1;
                    continue;
                }
                let subject = naming::subject_from_name(&channel.name)
                    .unwrap_or_else(|| "(recovered)".to_string());
                let username = naming::parse_topic_username(topic)
                    .unwrap_or_else(|| "unknown".to_string());
                let ticket = Ticket {
                    id: ticket_id.clone(),
                    user_id,
                    display_name: username.clone(),
                    username,
                    subject,
                    status: TicketStatus::Open,
                    created_at: channel.created_at,
                    mirror_channel_id: Some(channel.id.clone()),
                    messages: vec![TicketMessage::new(Sender::System, RECOVERY_NOTE)],
                };
                info!(ticket_id = %ticket.id, channel_id = %channel.id, "recovered ticket from channel");
                tickets.recover_ticket(ticket);
                report.tickets_recovered += 1;
            }
        }
    }

    // Open tickets whose channel no longer exists get a fresh one.
    let orphaned: Vec<Ticket> = tickets
        .open_tickets()
        .filter(|t| now - t.created_at >= grace)
        .filter(|t| match &t.mirror_channel_id {
            Some(channel) => !live_ids.contains(&channel.0.as_str()),
            None => true,
        })
        .cloned()
        .collect();

    for ticket in orphaned {
        let spec = NewChannelSpec {
            name: naming::channel_name(&ticket),
            topic: naming::channel_topic(&ticket),
        };
        match mirror.create_ticket_channel(&ticket, &spec).await {
            Ok(channel) => {
                tickets.relink_mirror_channel(&ticket.id, channel.clone());
                report.channels_created += 1;
                info!(ticket_id = %ticket.id, channel_id = %channel, "recreated missing mirror channel");
            }
            Err(err) => {
                warn!(ticket_id = %ticket.id, error = %err, "failed to recreate mirror channel");
            }
        }
    }

    tickets.persist()?;
    info!(
        scanned = report.channels_scanned,
        recovered = report.tickets_recovered,
        relinked = report.channels_relinked,
        created = report.channels_created,
        skipped_recent = report.skipped_recent,
        skipped_unparseable = report.skipped_unparseable,
        "channel synchronization complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use relaydesk_core::types::{ChannelId, ChannelInfo, TicketId, UserId, UserProfile};
    use relaydesk_store::JsonFile;
    use relaydesk_test_utils::MockMirror;

    fn old_channel(id: &str, name: &str, topic: &str) -> ChannelInfo {
        ChannelInfo {
            id: ChannelId(id.into()),
            name: name.into(),
            topic: Some(topic.into()),
            created_at: Utc::now() - Duration::minutes(10),
        }
    }

    fn store() -> (TicketStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("tickets.json"));
        (TicketStore::open(file).unwrap(), dir)
    }

    #[tokio::test]
    async fn orphaned_channel_becomes_recovered_ticket() {
        let mirror = MockMirror::new();
        mirror
            .seed_channel(old_channel(
                "chan-9",
                "ticket-555_2-printer-jam",
                "Ticket #555_2 | User: bob | Origin ID: 555",
            ))
            .await;
        let (mut tickets, _dir) = store();

        let report = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(report.tickets_recovered, 1);

        let ticket = tickets.find_open_by_user(&UserId("555".into())).unwrap();
        assert_eq!(ticket.id, TicketId("555_2".into()));
        assert_eq!(ticket.subject, "printer jam");
        assert_eq!(ticket.username, "bob");
        assert_eq!(ticket.mirror_channel_id.as_ref().unwrap().0, "chan-9");
        assert_eq!(ticket.messages[0].sender, Sender::System);

        // Counter advanced past the recovered sequence.
        tickets.close(&TicketId("555_2".into())).unwrap();
        let profile = UserProfile {
            id: UserId("555".into()),
            username: Some("bob".into()),
            display_name: "Bob".into(),
        };
        let next = tickets.create(&profile, "New", "description").unwrap();
        assert_eq!(next.id.0, "555_3");
    }

    #[tokio::test]
    async fn recent_channels_are_left_alone() {
        let mirror = MockMirror::new();
        mirror
            .seed_channel(ChannelInfo {
                id: ChannelId("chan-new".into()),
                name: "ticket-1_1-fresh".into(),
                topic: Some("Ticket #1_1 | User: a | Origin ID: 1".into()),
                created_at: Utc::now(),
            })
            .await;
        let (mut tickets, _dir) = store();

        let report = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(report.skipped_recent, 1);
        assert_eq!(report.tickets_recovered, 0);
    }

    #[tokio::test]
    async fn young_ticket_is_neither_relinked_nor_given_a_channel() {
        let mirror = MockMirror::new();
        mirror
            .seed_channel(old_channel(
                "chan-current",
                "ticket-100_1-login-issue",
                "Ticket #100_1 | User: alice | Origin ID: 100",
            ))
            .await;
        let (mut tickets, _dir) = store();
        let profile = UserProfile {
            id: UserId("100".into()),
            username: Some("alice".into()),
            display_name: "Alice".into(),
        };
        // Created just now, so the grace window still covers it.
        let ticket = tickets.create(&profile, "Login issue", "description").unwrap();
        tickets.assign_mirror_channel(&ticket.id, ChannelId("chan-stale".into()));

        let report = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(report.skipped_recent, 1);
        assert_eq!(report.channels_relinked, 0);
        assert_eq!(report.channels_created, 0);
        let ticket = tickets.find_open_by_user(&UserId("100".into())).unwrap();
        assert_eq!(ticket.mirror_channel_id.as_ref().unwrap().0, "chan-stale");
    }

    #[tokio::test]
    async fn topicless_channels_are_skipped() {
        let mirror = MockMirror::new();
        mirror
            .seed_channel(ChannelInfo {
                id: ChannelId("chan-x".into()),
                name: "ticket-2_1-mystery".into(),
                topic: None,
                created_at: Utc::now() - Duration::minutes(5),
            })
            .await;
        let (mut tickets, _dir) = store();

        let report = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(report.skipped_unparseable, 1);
        assert_eq!(report.tickets_recovered, 0);
    }

    #[tokio::test]
    async fn stale_link_is_repointed() {
        let mirror = MockMirror::new();
        mirror
            .seed_channel(old_channel(
                "chan-current",
                "ticket-100_1-login-issue",
                "Ticket #100_1 | User: alice | Origin ID: 100",
            ))
            .await;
        let (mut tickets, _dir) = store();
        let profile = UserProfile {
            id: UserId("100".into()),
            username: Some("alice".into()),
            display_name: "Alice".into(),
        };
        let ticket = tickets.create(&profile, "Login issue", "description").unwrap();
        tickets.assign_mirror_channel(&ticket.id, ChannelId("chan-stale".into()));

        let report = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(report.channels_relinked, 1);
        assert_eq!(report.channels_created, 0);
        let linked = tickets.find_by_mirror_channel(&ChannelId("chan-current".into()));
        assert!(linked.is_some());
    }

    #[tokio::test]
    async fn ticket_without_channel_gets_one() {
        let mirror = MockMirror::new();
        let (mut tickets, _dir) = store();
        let mut ticket = Ticket {
            id: TicketId("7_1".into()),
            user_id: UserId("7".into()),
            username: "carol".into(),
            display_name: "Carol".into(),
            subject: "Broken export".into(),
            status: TicketStatus::Open,
            created_at: Utc::now() - Duration::minutes(10),
            mirror_channel_id: None,
            messages: vec![],
        };
        ticket.messages.push(TicketMessage::new(Sender::User, "details"));
        tickets.recover_ticket(ticket);

        let report = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(report.channels_created, 1);

        let created = mirror.created_channels().await;
        assert_eq!(created[0].spec.name, "ticket-7_1-broken-export");
        let ticket = tickets.find_open_by_user(&UserId("7".into())).unwrap();
        assert_eq!(ticket.mirror_channel_id.as_ref(), Some(&created[0].id));
    }

    #[tokio::test]
    async fn pass_is_idempotent() {
        let mirror = MockMirror::new();
        mirror
            .seed_channel(old_channel(
                "chan-9",
                "ticket-555_2-printer-jam",
                "Ticket #555_2 | User: bob | Origin ID: 555",
            ))
            .await;
        let (mut tickets, _dir) = store();

        synchronize(&mirror, &mut tickets).await.unwrap();
        let second = synchronize(&mirror, &mut tickets).await.unwrap();
        assert_eq!(second.tickets_recovered, 0);
        assert_eq!(second.channels_relinked, 0);
        assert_eq!(second.channels_created, 0);
    }
}
