// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The authoritative in-memory ticket set with write-through persistence.
//!
//! Every mutating operation rewrites the backing file. Persist failures are
//! logged and do not fail the operation; the in-memory state remains the
//! source of truth for the running session.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use relaydesk_core::types::{
    ChannelId, Sender, Ticket, TicketId, TicketMessage, TicketStatus, UserId, UserProfile,
};

use crate::persist::JsonFile;

/// On-disk shape of the ticket file. Counters live next to the tickets so a
/// restart never reissues a previously used per-user sequence number.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TicketsRecord {
    pub tickets: Vec<Ticket>,
    pub counters: HashMap<String, u64>,
}

/// Why a ticket could not be created.
#[derive(Debug, thiserror::Error)]
pub enum CreateTicketError {
    /// One open ticket per user; the existing one is returned so the caller
    /// can re-point the user at it.
    #[error("user already has open ticket {}", .0.id)]
    AlreadyOpen(Ticket),
}

/// Which lookup tier resolved a ticket id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTier {
    Exact,
    Prefix,
    OwnerFallback,
}

impl std::fmt::Display for LookupTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LookupTier::Exact => "exact",
            LookupTier::Prefix => "prefix",
            LookupTier::OwnerFallback => "owner-fallback",
        })
    }
}

/// Open-ticket store. Closed tickets leave the set; their sequence numbers
/// survive in `counters`.
#[derive(Debug)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
    counters: HashMap<String, u64>,
    file: JsonFile,
}

impl TicketStore {
    /// Loads the store from `file`, starting empty when it does not exist.
    pub fn open(file: JsonFile) -> Result<Self, relaydesk_core::BridgeError> {
        let record: TicketsRecord = file.load()?;
        info!(
            tickets = record.tickets.len(),
            path = %file.path().display(),
            "loaded ticket store"
        );
        Ok(Self {
            tickets: record.tickets,
            counters: record.counters,
            file,
        })
    }

    fn flush(&self) {
        let record = TicketsRecord {
            tickets: self.tickets.clone(),
            counters: self.counters.clone(),
        };
        self.file.save_logged(&record);
    }

    /// Writes the current state to disk, propagating failures. Used at the
    /// end of startup synchronization where silent loss would be compounding.
    pub fn persist(&self) -> Result<(), relaydesk_core::BridgeError> {
        let record = TicketsRecord {
            tickets: self.tickets.clone(),
            counters: self.counters.clone(),
        };
        self.file.save(&record)
    }

    /// Creates an open ticket for `profile`, seeding the message log with the
    /// user's description. Enforces the one-open-ticket-per-user rule.
    pub fn create(
        &mut self,
        profile: &UserProfile,
        subject: &str,
        description: &str,
    ) -> Result<Ticket, CreateTicketError> {
        if let Some(existing) = self.find_open_by_user(&profile.id) {
            return Err(CreateTicketError::AlreadyOpen(existing.clone()));
        }

        let seq = self.next_sequence(&profile.id);
        let ticket = Ticket {
            id: TicketId::from_parts(&profile.id, seq),
            user_id: profile.id.clone(),
            username: profile.handle().to_string(),
            display_name: profile.display_name.clone(),
            subject: subject.to_string(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            mirror_channel_id: None,
            messages: vec![TicketMessage::new(Sender::User, description)],
        };
        self.tickets.push(ticket.clone());
        self.flush();
        info!(ticket_id = %ticket.id, user_id = %profile.id, "ticket created");
        Ok(ticket)
    }

    fn next_sequence(&mut self, user_id: &UserId) -> u64 {
        let counter = self.counters.entry(user_id.0.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Raises the stored counter for a user so it is at least `sequence`.
    /// Called when synchronization recovers a ticket whose sequence the
    /// counter file never saw.
    pub fn bump_counter(&mut self, user_id: &UserId, sequence: u64) {
        let counter = self.counters.entry(user_id.0.clone()).or_insert(0);
        if sequence > *counter {
            *counter = sequence;
        }
    }

    pub fn find_open_by_user(&self, user_id: &UserId) -> Option<&Ticket> {
        self.tickets
            .iter()
            .find(|t| t.is_open() && &t.user_id == user_id)
    }

    pub fn find_by_mirror_channel(&self, channel: &ChannelId) -> Option<&Ticket> {
        self.tickets
            .iter()
            .find(|t| t.mirror_channel_id.as_ref() == Some(channel))
    }

    /// Resolves a ticket id through three tiers: exact match, prefix match
    /// (ids recovered from truncated channel names), then falling back to the
    /// owner's open ticket when the id splits into a known user. The tier
    /// used is logged so drift between channels and stored ids is visible.
    pub fn find_by_id(&self, id: &TicketId) -> Option<(&Ticket, LookupTier)> {
        if let Some(ticket) = self.tickets.iter().find(|t| t.is_open() && t.id == *id) {
            return Some((ticket, LookupTier::Exact));
        }
        if let Some(ticket) = self
            .tickets
            .iter()
            .find(|t| t.is_open() && t.id.0.starts_with(&id.0))
        {
            debug!(ticket_id = %id, resolved = %ticket.id, tier = %LookupTier::Prefix, "ticket lookup");
            return Some((ticket, LookupTier::Prefix));
        }
        if let Some((owner, _)) = id.split() {
            if let Some(ticket) = self.find_open_by_user(&owner) {
                warn!(
                    ticket_id = %id,
                    resolved = %ticket.id,
                    tier = %LookupTier::OwnerFallback,
                    "ticket lookup fell back to owner's open ticket"
                );
                return Some((ticket, LookupTier::OwnerFallback));
            }
        }
        None
    }

    pub fn open_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(|t| t.is_open())
    }

    /// Appends a message to a ticket's log and flushes.
    pub fn append_message(&mut self, id: &TicketId, message: TicketMessage) -> bool {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == *id) else {
            return false;
        };
        ticket.messages.push(message);
        self.flush();
        true
    }

    /// Records the mirror channel backing a ticket and flushes.
    pub fn assign_mirror_channel(&mut self, id: &TicketId, channel: ChannelId) -> bool {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == *id) else {
            return false;
        };
        ticket.mirror_channel_id = Some(channel);
        self.flush();
        true
    }

    /// Closes a ticket and removes it from the active set, returning the
    /// final state for archival. Sequence counters are untouched, so the id
    /// is never reissued.
    pub fn close(&mut self, id: &TicketId) -> Option<Ticket> {
        let pos = self.tickets.iter().position(|t| t.id == *id)?;
        let mut ticket = self.tickets.remove(pos);
        ticket.status = TicketStatus::Closed;
        self.flush();
        info!(ticket_id = %ticket.id, "ticket closed");
        Some(ticket)
    }

    /// Inserts a ticket reconstructed during synchronization without
    /// flushing. The caller batches recoveries and calls [`persist`].
    ///
    /// [`persist`]: TicketStore::persist
    pub fn recover_ticket(&mut self, ticket: Ticket) {
        if let Some((owner, seq)) = ticket.id.split() {
            self.bump_counter(&owner, seq);
        }
        self.tickets.push(ticket);
    }

    /// Re-points a ticket at a different mirror channel without flushing.
    pub fn relink_mirror_channel(&mut self, id: &TicketId, channel: ChannelId) -> bool {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == *id) else {
            return false;
        };
        ticket.mirror_channel_id = Some(channel);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, username: &str) -> UserProfile {
        UserProfile {
            id: UserId(id.into()),
            username: Some(username.into()),
            display_name: username.to_uppercase(),
        }
    }

    fn store() -> (TicketStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("tickets.json"));
        (TicketStore::open(file).unwrap(), dir)
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let (mut store, _dir) = store();
        let alice = profile("100", "alice");

        let first = store.create(&alice, "Login issue", "cannot log in").unwrap();
        assert_eq!(first.id.0, "100_1");
        assert_eq!(first.messages.len(), 1);

        store.close(&first.id).unwrap();
        let second = store.create(&alice, "Billing", "wrong invoice").unwrap();
        assert_eq!(second.id.0, "100_2");
    }

    #[test]
    fn one_open_ticket_per_user() {
        let (mut store, _dir) = store();
        let alice = profile("100", "alice");
        let first = store.create(&alice, "A", "description").unwrap();

        match store.create(&alice, "B", "another") {
            Err(CreateTicketError::AlreadyOpen(existing)) => assert_eq!(existing.id, first.id),
            other => panic!("expected AlreadyOpen, got {other:?}"),
        }
    }

    #[test]
    fn counters_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.json");
        let alice = profile("100", "alice");

        {
            let mut store = TicketStore::open(JsonFile::new(&path)).unwrap();
            let t = store.create(&alice, "A", "description").unwrap();
            store.close(&t.id).unwrap();
        }

        let mut store = TicketStore::open(JsonFile::new(&path)).unwrap();
        let t = store.create(&alice, "B", "description").unwrap();
        assert_eq!(t.id.0, "100_2");
    }

    #[test]
    fn tiered_lookup() {
        let (mut store, _dir) = store();
        let alice = profile("100", "alice");
        let ticket = store.create(&alice, "A", "description").unwrap();

        let (found, tier) = store.find_by_id(&ticket.id).unwrap();
        assert_eq!(found.id, ticket.id);
        assert_eq!(tier, LookupTier::Exact);

        // Truncated id resolves by prefix.
        let (found, tier) = store.find_by_id(&TicketId("100_".into())).unwrap();
        assert_eq!(found.id, ticket.id);
        assert_eq!(tier, LookupTier::Prefix);

        // A stale sequence still reaches the owner's open ticket.
        let (found, tier) = store.find_by_id(&TicketId("100_99".into())).unwrap();
        assert_eq!(found.id, ticket.id);
        assert_eq!(tier, LookupTier::OwnerFallback);

        assert!(store.find_by_id(&TicketId("999_1".into())).is_none());
    }

    #[test]
    fn close_removes_from_active_set() {
        let (mut store, _dir) = store();
        let alice = profile("100", "alice");
        let ticket = store.create(&alice, "A", "description").unwrap();

        let closed = store.close(&ticket.id).unwrap();
        assert_eq!(closed.status, TicketStatus::Closed);
        assert!(store.find_open_by_user(&alice.id).is_none());
        assert!(store.close(&ticket.id).is_none());
    }

    #[test]
    fn recover_bumps_counter_past_recovered_sequence() {
        let (mut store, _dir) = store();
        let alice = profile("100", "alice");

        let mut recovered = Ticket {
            id: TicketId("100_5".into()),
            user_id: alice.id.clone(),
            username: "alice".into(),
            display_name: "ALICE".into(),
            subject: "Recovered".into(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            mirror_channel_id: Some(ChannelId("chan-1".into())),
            messages: vec![],
        };
        recovered
            .messages
            .push(TicketMessage::new(Sender::System, "recovered"));
        store.recover_ticket(recovered);
        store.persist().unwrap();

        store.close(&TicketId("100_5".into())).unwrap();
        let next = store.create(&alice, "New", "description").unwrap();
        assert_eq!(next.id.0, "100_6");
    }

    #[test]
    fn mirror_channel_assignment_and_lookup() {
        let (mut store, _dir) = store();
        let alice = profile("100", "alice");
        let ticket = store.create(&alice, "A", "description").unwrap();
        let channel = ChannelId("chan-7".into());

        assert!(store.assign_mirror_channel(&ticket.id, channel.clone()));
        let found = store.find_by_mirror_channel(&channel).unwrap();
        assert_eq!(found.id, ticket.id);
    }
}
