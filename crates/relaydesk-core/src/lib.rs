// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relaydesk ticket bridge.
//!
//! Provides the domain types (tickets, message log entries, channel
//! references), the error taxonomy, the platform-agnostic event model, the
//! mirror-channel naming conventions, and the two transport traits that the
//! engine consumes. Platform adapters implement the traits defined here.

pub mod error;
pub mod event;
pub mod naming;
pub mod traits;
pub mod types;

pub use error::BridgeError;
pub use event::{BridgeEvent, OriginCommand};
pub use traits::{MirrorTransport, NewChannelSpec, OriginTransport, TextFormat, UserAction};
pub use types::{
    ChannelId, ChannelInfo, MirrorAuthor, Sender, Ticket, TicketId, TicketMessage, TicketStatus,
    UserId, UserProfile,
};
