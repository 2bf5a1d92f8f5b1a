// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mirror-platform transport trait (the side the support team works in).

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::types::{ChannelId, ChannelInfo, Ticket};

/// Everything needed to create a mirror channel for a ticket. The engine
/// prepares name and topic from the naming conventions so transports stay
/// ignorant of the ticket-to-channel link format.
#[derive(Debug, Clone)]
pub struct NewChannelSpec {
    pub name: String,
    pub topic: String,
}

/// Channel management and message delivery on the mirror platform.
#[async_trait]
pub trait MirrorTransport: Send + Sync {
    /// True when the channel id still resolves to a reachable channel.
    async fn channel_exists(&self, channel: &ChannelId) -> Result<bool, BridgeError>;

    /// Creates a dedicated channel for a ticket, restricted to the support
    /// role, and posts the initial full-context message into it.
    async fn create_ticket_channel(
        &self,
        ticket: &Ticket,
        spec: &NewChannelSpec,
    ) -> Result<ChannelId, BridgeError>;

    /// Posts a lightweight reply envelope for a follow-up user message.
    async fn post_reply(
        &self,
        channel: &ChannelId,
        ticket: &Ticket,
        text: &str,
    ) -> Result<(), BridgeError>;

    /// Posts a free-standing notice (e.g. a closure announcement).
    async fn post_notice(
        &self,
        channel: &ChannelId,
        title: &str,
        body: &str,
    ) -> Result<(), BridgeError>;

    /// Archives a channel: rename to `archived_name`, relocate to the
    /// archive grouping if configured, and revoke write permission for
    /// default viewers and the configured moderator role.
    async fn archive_channel(
        &self,
        channel: &ChannelId,
        archived_name: &str,
    ) -> Result<(), BridgeError>;

    /// Lists channels following the active-ticket naming convention.
    async fn list_ticket_channels(&self) -> Result<Vec<ChannelInfo>, BridgeError>;

    /// Marks a mirror message as delivered (or not) to the origin user, so
    /// the operator sees a success/failure acknowledgement.
    async fn acknowledge(
        &self,
        channel: &ChannelId,
        message_id: &str,
        delivered: bool,
    ) -> Result<(), BridgeError>;

    /// Configured fallback channel used when a ticket channel cannot be
    /// resolved or created.
    fn default_channel(&self) -> Option<ChannelId>;
}
