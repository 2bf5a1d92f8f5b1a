// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mirror transport for deterministic testing.
//!
//! `MockMirror` implements `MirrorTransport` over in-memory channel state.
//! Tests seed channels (for synchronization scenarios) and inspect every
//! captured call.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaydesk_core::BridgeError;
use relaydesk_core::traits::{MirrorTransport, NewChannelSpec};
use relaydesk_core::types::{ChannelId, ChannelInfo, Ticket};

/// One captured channel creation.
#[derive(Debug, Clone)]
pub struct CreatedChannel {
    pub id: ChannelId,
    pub spec: NewChannelSpec,
    pub ticket_id: String,
}

/// A mock mirror platform for testing.
pub struct MockMirror {
    existing: Arc<Mutex<HashSet<String>>>,
    listed: Arc<Mutex<Vec<ChannelInfo>>>,
    created: Arc<Mutex<Vec<CreatedChannel>>>,
    replies: Arc<Mutex<Vec<(ChannelId, String)>>>,
    notices: Arc<Mutex<Vec<(ChannelId, String, String)>>>,
    archived: Arc<Mutex<Vec<(ChannelId, String)>>>,
    acks: Arc<Mutex<Vec<(ChannelId, String, bool)>>>,
    default_channel: Option<ChannelId>,
    fail_create: AtomicBool,
    next_id: AtomicU64,
}

impl MockMirror {
    pub fn new() -> Self {
        Self {
            existing: Arc::new(Mutex::new(HashSet::new())),
            listed: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(Vec::new())),
            notices: Arc::new(Mutex::new(Vec::new())),
            archived: Arc::new(Mutex::new(Vec::new())),
            acks: Arc::new(Mutex::new(Vec::new())),
            default_channel: None,
            fail_create: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_default_channel(channel: ChannelId) -> Self {
        let mut mirror = Self::new();
        mirror.default_channel = Some(channel);
        mirror
    }

    /// Registers an existing channel id so `channel_exists` reports it.
    pub async fn add_existing(&self, id: &str) {
        self.existing.lock().await.insert(id.to_string());
    }

    /// Removes a channel so `channel_exists` reports it gone, simulating a
    /// manual deletion on the mirror platform.
    pub async fn remove_existing(&self, id: &str) {
        self.existing.lock().await.remove(id);
    }

    /// Seeds a channel into the `list_ticket_channels` result.
    pub async fn seed_channel(&self, info: ChannelInfo) {
        self.existing.lock().await.insert(info.id.0.clone());
        self.listed.lock().await.push(info);
    }

    /// Make the next channel creations fail with a transport error.
    pub fn fail_creates(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub async fn created_channels(&self) -> Vec<CreatedChannel> {
        self.created.lock().await.clone()
    }

    pub async fn posted_replies(&self) -> Vec<(ChannelId, String)> {
        self.replies.lock().await.clone()
    }

    pub async fn posted_notices(&self) -> Vec<(ChannelId, String, String)> {
        self.notices.lock().await.clone()
    }

    pub async fn archived_channels(&self) -> Vec<(ChannelId, String)> {
        self.archived.lock().await.clone()
    }

    pub async fn acknowledgements(&self) -> Vec<(ChannelId, String, bool)> {
        self.acks.lock().await.clone()
    }
}

impl Default for MockMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MirrorTransport for MockMirror {
    async fn channel_exists(&self, channel: &ChannelId) -> Result<bool, BridgeError> {
        Ok(self.existing.lock().await.contains(&channel.0))
    }

    async fn create_ticket_channel(
        &self,
        ticket: &Ticket,
        spec: &NewChannelSpec,
    ) -> Result<ChannelId, BridgeError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport {
                message: "mock mirror refused channel creation".to_string(),
                source: None,
            });
        }
        let id = ChannelId(format!("mock-chan-{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.existing.lock().await.insert(id.0.clone());
        self.created.lock().await.push(CreatedChannel {
            id: id.clone(),
            spec: spec.clone(),
            ticket_id: ticket.id.0.clone(),
        });
        Ok(id)
    }

    async fn post_reply(
        &self,
        channel: &ChannelId,
        _ticket: &Ticket,
        text: &str,
    ) -> Result<(), BridgeError> {
        self.replies
            .lock()
            .await
            .push((channel.clone(), text.to_string()));
        Ok(())
    }

    async fn post_notice(
        &self,
        channel: &ChannelId,
        title: &str,
        body: &str,
    ) -> Result<(), BridgeError> {
        self.notices
            .lock()
            .await
            .push((channel.clone(), title.to_string(), body.to_string()));
        Ok(())
    }

    async fn archive_channel(
        &self,
        channel: &ChannelId,
        archived_name: &str,
    ) -> Result<(), BridgeError> {
        self.archived
            .lock()
            .await
            .push((channel.clone(), archived_name.to_string()));
        Ok(())
    }

    async fn list_ticket_channels(&self) -> Result<Vec<ChannelInfo>, BridgeError> {
        Ok(self.listed.lock().await.clone())
    }

    async fn acknowledge(
        &self,
        channel: &ChannelId,
        message_id: &str,
        delivered: bool,
    ) -> Result<(), BridgeError> {
        self.acks
            .lock()
            .await
            .push((channel.clone(), message_id.to_string(), delivered));
        Ok(())
    }

    fn default_channel(&self) -> Option<ChannelId> {
        self.default_channel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relaydesk_core::types::{TicketId, TicketStatus, UserId};

    fn ticket() -> Ticket {
        Ticket {
            id: TicketId("1_1".into()),
            user_id: UserId("1".into()),
            username: "alice".into(),
            display_name: "Alice".into(),
            subject: "Login".into(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
            mirror_channel_id: None,
            messages: vec![],
        }
    }

    #[tokio::test]
    async fn created_channels_exist_afterwards() {
        let mirror = MockMirror::new();
        let spec = NewChannelSpec {
            name: "ticket-1_1-login".into(),
            topic: "Ticket #1_1".into(),
        };
        let id = mirror.create_ticket_channel(&ticket(), &spec).await.unwrap();
        assert!(mirror.channel_exists(&id).await.unwrap());
        assert_eq!(mirror.created_channels().await.len(), 1);
    }

    #[tokio::test]
    async fn scripted_create_failure() {
        let mirror = MockMirror::new();
        mirror.fail_creates();
        let spec = NewChannelSpec {
            name: "x".into(),
            topic: "y".into(),
        };
        let err = mirror
            .create_ticket_channel(&ticket(), &spec)
            .await
            .unwrap_err();
        assert!(!err.is_formatting());
    }
}
