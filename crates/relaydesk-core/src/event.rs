// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-agnostic inbound events.
//!
//! Both transports translate their native updates into [`BridgeEvent`]s and
//! push them into a single mpsc queue. The engine services one event at a
//! time to completion, which is what makes the store mutation model safe
//! without locks.

use tokio::sync::oneshot;

use crate::error::BridgeError;
use crate::types::{ChannelInfo, MirrorAuthor, UserId, UserProfile};

/// Commands the origin platform dispatches from user intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginCommand {
    Start,
    Help,
    NewTicket,
    MyTickets,
    Language,
}

/// An inbound event from either platform, or from the test gateway.
#[derive(Debug)]
pub enum BridgeEvent {
    /// The mirror connection is established and a server context is
    /// available; triggers the one-shot channel synchronizer.
    MirrorReady,

    /// A recognized command from the origin platform.
    OriginCommand {
        user: UserProfile,
        command: OriginCommand,
    },

    /// Free text from the origin platform (never a command).
    OriginText { user: UserProfile, text: String },

    /// An inline action callback from the origin platform. The payload is
    /// opaque to the transport: `direct_close_<id>`, `confirm_close_<id>`,
    /// `cancel_close_<id>`, or `lang_<code>`.
    OriginAction { user: UserProfile, payload: String },

    /// A message posted in a mirror channel following the active-ticket
    /// naming convention.
    MirrorMessage {
        channel: ChannelInfo,
        author: MirrorAuthor,
        message_id: String,
        content: String,
    },

    /// A button interaction from the mirror platform. Payload: `close_<id>`.
    MirrorAction { channel: ChannelInfo, payload: String },

    /// Manual relay probe from the HTTP test surface.
    RelayProbe {
        user_id: UserId,
        text: String,
        reply: oneshot::Sender<Result<(), BridgeError>>,
    },
}

impl BridgeEvent {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeEvent::MirrorReady => "mirror_ready",
            BridgeEvent::OriginCommand { .. } => "origin_command",
            BridgeEvent::OriginText { .. } => "origin_text",
            BridgeEvent::OriginAction { .. } => "origin_action",
            BridgeEvent::MirrorMessage { .. } => "mirror_message",
            BridgeEvent::MirrorAction { .. } => "mirror_action",
            BridgeEvent::RelayProbe { .. } => "relay_probe",
        }
    }
}
