// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mirror-channel naming conventions and topic metadata.
//!
//! The channel topic is the only durable link between a mirror channel and
//! its ticket: it carries the ticket id and the origin user id in a fixed
//! pattern that the channel synchronizer parses back at startup. Channel
//! names carry the active/closed prefix convention plus a subject slug.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{Ticket, TicketId, UserId};

/// Name prefix for channels mirroring an open ticket.
pub const ACTIVE_PREFIX: &str = "ticket-";

/// Name prefix for archived channels of closed tickets.
pub const CLOSED_PREFIX: &str = "closed-";

/// Maximum slug length appended to channel names.
const MAX_SLUG_LEN: usize = 40;

fn topic_ticket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Ticket #([A-Za-z0-9_]+)").expect("static regex"))
}

fn topic_user_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Origin ID: (\w+)").expect("static regex"))
}

fn topic_username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"User: ([^|]+?) \|").expect("static regex"))
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ticket-([A-Za-z0-9_]+)-(.+)$").expect("static regex"))
}

/// Lowercases and strips a string down to `[a-z0-9-]`, collapsing runs of
/// other characters into single hyphens.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_SLUG_LEN));
    let mut last_hyphen = true; // suppress leading hyphen
    for ch in text.chars() {
        if out.len() >= MAX_SLUG_LEN {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Channel name for an active ticket: `ticket-{id}-{subject slug}`.
pub fn channel_name(ticket: &Ticket) -> String {
    let s = slug(&ticket.subject);
    if s.is_empty() {
        format!("{ACTIVE_PREFIX}{}", ticket.id)
    } else {
        format!("{ACTIVE_PREFIX}{}-{s}", ticket.id)
    }
}

/// Archived channel name: `closed-{id without separators}`.
pub fn archived_name(id: &TicketId) -> String {
    format!("{CLOSED_PREFIX}{}", id.0.replace(TicketId::SEPARATOR, ""))
}

/// True for channel names following the active-ticket convention and not
/// the closed convention.
pub fn is_active_ticket_channel(name: &str) -> bool {
    name.starts_with(ACTIVE_PREFIX) && !name.starts_with(CLOSED_PREFIX)
}

/// Topic metadata written on channel creation and parsed back by the
/// synchronizer.
pub fn channel_topic(ticket: &Ticket) -> String {
    format!(
        "Ticket #{} | User: {} | Origin ID: {}",
        ticket.id, ticket.username, ticket.user_id
    )
}

/// Extracts `(ticket_id, user_id)` from a channel topic. Returns `None`
/// when either field is absent, in which case the channel is skipped.
pub fn parse_topic(topic: &str) -> Option<(TicketId, UserId)> {
    let ticket = topic_ticket_re().captures(topic)?.get(1)?.as_str();
    let user = topic_user_re().captures(topic)?.get(1)?.as_str();
    Some((TicketId(ticket.to_string()), UserId(user.to_string())))
}

/// Extracts just the ticket id from a topic, used by mirror-side message
/// handling where the user id is not needed.
pub fn parse_topic_ticket_id(topic: &str) -> Option<TicketId> {
    let ticket = topic_ticket_re().captures(topic)?.get(1)?.as_str();
    Some(TicketId(ticket.to_string()))
}

/// Extracts the snapshotted username from a channel topic, used when a
/// ticket is reconstructed from an orphaned channel.
pub fn parse_topic_username(topic: &str) -> Option<String> {
    let name = topic_username_re().captures(topic)?.get(1)?.as_str();
    Some(name.to_string())
}

/// Recovers a human-readable subject from an active channel name's slug.
pub fn subject_from_name(name: &str) -> Option<String> {
    let caps = name_re().captures(name)?;
    Some(caps.get(2)?.as_str().replace('-', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sender, TicketMessage, TicketStatus};
    use chrono::Utc;

    fn ticket() -> Ticket {
        Ticket {
            id: TicketId("12345_1".into()),
            user_id: UserId("12345".into()),
            username: "alice".into(),
            display_name: "Alice".into(),
            subject: "Login Issue!".into(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            mirror_channel_id: None,
            messages: vec![TicketMessage::new(Sender::User, "cannot log in")],
        }
    }

    #[test]
    fn slug_strips_and_collapses() {
        assert_eq!(slug("Login Issue!"), "login-issue");
        assert_eq!(slug("  weird___chars  "), "weird-chars");
        assert_eq!(slug("!!!"), "");
    }

    #[test]
    fn slug_truncates() {
        let long = "a".repeat(100);
        assert_eq!(slug(&long).len(), 40);
    }

    #[test]
    fn channel_name_uses_subject_slug() {
        assert_eq!(channel_name(&ticket()), "ticket-12345_1-login-issue");
    }

    #[test]
    fn archived_name_drops_separator() {
        assert_eq!(archived_name(&TicketId("12345_1".into())), "closed-123451");
    }

    #[test]
    fn active_convention_excludes_closed() {
        assert!(is_active_ticket_channel("ticket-12345_1-login-issue"));
        assert!(!is_active_ticket_channel("closed-123451"));
        assert!(!is_active_ticket_channel("general"));
    }

    #[test]
    fn topic_round_trip() {
        let t = ticket();
        let topic = channel_topic(&t);
        let (tid, uid) = parse_topic(&topic).unwrap();
        assert_eq!(tid, t.id);
        assert_eq!(uid, t.user_id);
        assert_eq!(parse_topic_username(&topic).as_deref(), Some("alice"));
    }

    #[test]
    fn parse_topic_rejects_incomplete_metadata() {
        assert!(parse_topic("Ticket #12345_1 only").is_none());
        assert!(parse_topic("random topic").is_none());
        assert!(parse_topic_ticket_id("Ticket #12345_1 only").is_some());
    }

    #[test]
    fn subject_recovered_from_slug() {
        assert_eq!(
            subject_from_name("ticket-12345_1-login-issue").as_deref(),
            Some("login issue")
        );
        assert!(subject_from_name("general").is_none());
    }
}
