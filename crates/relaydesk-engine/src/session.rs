// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversational session state.
//!
//! Sessions are in-memory only: a restart drops everyone back to the
//! stateless default, where free text routes to their open ticket if one
//! exists.

use std::collections::HashMap;

use relaydesk_core::types::{TicketId, UserId};

/// Where a user is in the ticket-creation conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `/newticket` was issued; the next text message is the subject.
    AwaitingSubject,
    /// Subject accepted; the next text message is the description.
    AwaitingDescription { subject: String },
    /// Free text appends to this ticket.
    Replying { ticket_id: TicketId },
}

/// The session table. Only the engine task touches it, so no locking.
#[derive(Debug, Default)]
pub struct SessionTable {
    states: HashMap<String, SessionState>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &UserId) -> Option<&SessionState> {
        self.states.get(&user_id.0)
    }

    pub fn set(&mut self, user_id: &UserId, state: SessionState) {
        self.states.insert(user_id.0.clone(), state);
    }

    pub fn clear(&mut self, user_id: &UserId) {
        self.states.remove(&user_id.0);
    }

    /// Drops any session pointing at `ticket_id`. Called on closure so a
    /// stale `Replying` state cannot target a closed ticket.
    pub fn clear_ticket(&mut self, ticket_id: &TicketId) {
        self.states.retain(|_, state| {
            !matches!(state, SessionState::Replying { ticket_id: t } if t == ticket_id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let mut table = SessionTable::new();
        let user = UserId("1".into());
        assert!(table.get(&user).is_none());

        table.set(&user, SessionState::AwaitingSubject);
        assert_eq!(table.get(&user), Some(&SessionState::AwaitingSubject));

        table.clear(&user);
        assert!(table.get(&user).is_none());
    }

    #[test]
    fn clear_ticket_only_drops_matching_replying_states() {
        let mut table = SessionTable::new();
        let alice = UserId("1".into());
        let bob = UserId("2".into());
        let carol = UserId("3".into());
        let ticket = TicketId("1_1".into());

        table.set(&alice, SessionState::Replying { ticket_id: ticket.clone() });
        table.set(&bob, SessionState::Replying { ticket_id: TicketId("2_1".into()) });
        table.set(&carol, SessionState::AwaitingSubject);

        table.clear_ticket(&ticket);
        assert!(table.get(&alice).is_none());
        assert!(table.get(&bob).is_some());
        assert!(table.get(&carol).is_some());
    }
}
