// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Relaydesk workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Origin-platform user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ticket identifier in the form `{user_id}_{sequence}`.
///
/// The sequence is monotonic per user and never reused, even after closure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub String);

impl TicketId {
    /// Separator between the owner's user id and the per-user sequence.
    pub const SEPARATOR: char = '_';

    /// Builds a ticket id from its parts.
    pub fn from_parts(user_id: &UserId, sequence: u64) -> Self {
        TicketId(format!("{}{}{sequence}", user_id.0, Self::SEPARATOR))
    }

    /// Splits the id into `(user_id, sequence)` when well-formed. The owner
    /// id is everything before the first separator, matching how channel
    /// topics are parsed back.
    pub fn split(&self) -> Option<(UserId, u64)> {
        let (user, seq) = self.0.split_once(Self::SEPARATOR)?;
        let seq = seq.parse::<u64>().ok()?;
        Some((UserId(user.to_string()), seq))
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mirror-platform channel identity (opaque string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of the bridge authored a ticket message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Support,
    System,
}

/// Ticket lifecycle state. Tickets transition `Open -> Closed` exactly once;
/// closed tickets are removed from the active set rather than retained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// One entry in a ticket's append-only message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Mirror-side author id, recorded for support messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_user_id: Option<String>,
    /// Mirror-side author name, recorded for support messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_username: Option<String>,
}

impl TicketMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            timestamp: Utc::now(),
            source_user_id: None,
            source_username: None,
        }
    }
}

/// A tracked support conversation between one origin-platform user and the
/// support team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub user_id: UserId,
    /// Snapshot of the creator's username, taken at creation and never re-synced.
    pub username: String,
    /// Snapshot of the creator's display name.
    pub display_name: String,
    pub subject: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    /// Back-reference to the mirror channel, set once one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_channel_id: Option<ChannelId>,
    pub messages: Vec<TicketMessage>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }

    /// Age of the ticket relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::TimeDelta {
        now - self.created_at
    }
}

/// Identity of the origin-platform user attached to an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Option<String>,
    pub display_name: String,
}

impl UserProfile {
    /// Username with display-name fallback, used for channel naming.
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.display_name)
    }
}

/// A mirror channel as observed by `MirrorTransport::list_ticket_channels`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mirror-side message author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorAuthor {
    pub id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_id_round_trip() {
        let id = TicketId::from_parts(&UserId("12345".into()), 7);
        assert_eq!(id.0, "12345_7");
        let (user, seq) = id.split().unwrap();
        assert_eq!(user.0, "12345");
        assert_eq!(seq, 7);
    }

    #[test]
    fn ticket_id_split_rejects_malformed() {
        assert!(TicketId("no-separator".into()).split().is_none());
        assert!(TicketId("123_abc".into()).split().is_none());
    }

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Support).unwrap(), "\"support\"");
        assert_eq!(Sender::System.to_string(), "system");
    }

    #[test]
    fn profile_handle_falls_back_to_display_name() {
        let with_username = UserProfile {
            id: UserId("1".into()),
            username: Some("alice".into()),
            display_name: "Alice".into(),
        };
        assert_eq!(with_username.handle(), "alice");

        let without = UserProfile {
            id: UserId("2".into()),
            username: None,
            display_name: "Bob".into(),
        };
        assert_eq!(without.handle(), "Bob");
    }

    #[test]
    fn ticket_json_omits_absent_channel() {
        let ticket = Ticket {
            id: TicketId("1_1".into()),
            user_id: UserId("1".into()),
            username: "alice".into(),
            display_name: "Alice".into(),
            subject: "Login issue".into(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            mirror_channel_id: None,
            messages: vec![TicketMessage::new(Sender::User, "details")],
        };
        let json = serde_json::to_string(&ticket).unwrap();
        assert!(!json.contains("mirror_channel_id"));

        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ticket);
    }
}
