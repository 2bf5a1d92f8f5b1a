// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock origin transport for deterministic testing.
//!
//! `MockOrigin` implements `OriginTransport`, capturing every outbound user
//! message for assertion. Rich-format delivery can be scripted to fail so
//! tests can exercise the plain-text retry path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaydesk_core::BridgeError;
use relaydesk_core::traits::{OriginTransport, TextFormat, UserAction};
use relaydesk_core::types::UserId;

/// One captured call to `send_message`.
#[derive(Debug, Clone)]
pub struct SentUserMessage {
    pub user_id: UserId,
    pub text: String,
    pub format: TextFormat,
    pub action_labels: Vec<String>,
}

/// A mock origin platform for testing.
pub struct MockOrigin {
    sent: Arc<Mutex<Vec<SentUserMessage>>>,
    fail_rich: AtomicBool,
    fail_all: AtomicBool,
}

impl MockOrigin {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_rich: AtomicBool::new(false),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Make rich-format sends fail with a formatting error. Plain sends
    /// still succeed, so two-tier delivery recovers.
    pub fn fail_rich_sends(&self) {
        self.fail_rich.store(true, Ordering::SeqCst);
    }

    /// Make every send fail with a transport error.
    pub fn fail_all_sends(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<SentUserMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// The last message delivered to `user_id`, if any.
    pub async fn last_for(&self, user_id: &UserId) -> Option<SentUserMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| &m.user_id == user_id)
            .cloned()
    }
}

impl Default for MockOrigin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OriginTransport for MockOrigin {
    async fn send_message(
        &self,
        user_id: &UserId,
        text: &str,
        format: TextFormat,
        actions: &[UserAction],
    ) -> Result<(), BridgeError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport {
                message: "mock origin unreachable".to_string(),
                source: None,
            });
        }
        if format == TextFormat::Rich && self.fail_rich.load(Ordering::SeqCst) {
            return Err(BridgeError::Formatting {
                message: "mock can't parse entities".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push(SentUserMessage {
            user_id: user_id.clone(),
            text: text.to_string(),
            format,
            action_labels: actions.iter().map(|a| a.label.clone()).collect(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_sends() {
        let origin = MockOrigin::new();
        let user = UserId("1".into());
        origin
            .send_message(&user, "hello", TextFormat::Rich, &[])
            .await
            .unwrap();
        assert_eq!(origin.sent_count().await, 1);
        let last = origin.last_for(&user).await.unwrap();
        assert_eq!(last.text, "hello");
        assert_eq!(last.format, TextFormat::Rich);
    }

    #[tokio::test]
    async fn scripted_rich_failure_spares_plain() {
        let origin = MockOrigin::new();
        origin.fail_rich_sends();
        let user = UserId("1".into());

        let err = origin
            .send_message(&user, "x", TextFormat::Rich, &[])
            .await
            .unwrap_err();
        assert!(err.is_formatting());

        origin
            .send_message(&user, "x", TextFormat::Plain, &[])
            .await
            .unwrap();
        assert_eq!(origin.sent_count().await, 1);
    }
}
