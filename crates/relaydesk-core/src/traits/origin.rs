// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Origin-platform transport trait (the side the end user talks to).

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::UserId;

/// Rendering requested for an outbound user message.
///
/// The relay engine owns the two-tier delivery policy: it attempts `Rich`
/// first and retries once with `Plain` when the transport reports a
/// formatting-class rejection. Transports must not fall back internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Platform-native rich formatting (e.g. Markdown).
    Rich,
    /// Unformatted rendering of the same payload.
    Plain,
}

/// An inline action affordance attached to a user message. The payload is
/// echoed back verbatim in the action callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAction {
    pub label: String,
    pub payload: String,
}

impl UserAction {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Message delivery towards the origin-platform user.
///
/// Implementations report formatting-class rejections as
/// [`BridgeError::Formatting`] so the relay engine can degrade to `Plain`;
/// everything else is [`BridgeError::Transport`].
#[async_trait]
pub trait OriginTransport: Send + Sync {
    async fn send_message(
        &self,
        user_id: &UserId,
        text: &str,
        format: TextFormat,
        actions: &[UserAction],
    ) -> Result<(), BridgeError>;
}
