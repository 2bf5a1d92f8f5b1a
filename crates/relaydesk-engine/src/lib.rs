// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bridge engine: a single task that owns all mutable state.
//!
//! Both transports feed [`BridgeEvent`]s into one mpsc queue; the engine
//! services them strictly one at a time, which keeps the ticket store, the
//! language store, and the session table free of locks. A failing event is
//! logged and never takes the loop down.

pub mod handlers;
pub mod lifecycle;
pub mod relay;
pub mod session;
pub mod shutdown;
pub mod sync;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use relaydesk_core::traits::{MirrorTransport, OriginTransport};
use relaydesk_core::{BridgeError, BridgeEvent};
use relaydesk_store::{LanguageStore, TicketStore};

use crate::session::SessionTable;

/// Queue depth for inbound events. Transports await on a full queue, which
/// back-pressures the platform long-poll loops.
pub const EVENT_QUEUE_DEPTH: usize = 256;

/// Owns all state and services the event queue.
pub struct BridgeEngine {
    pub(crate) tickets: TicketStore,
    pub(crate) languages: LanguageStore,
    pub(crate) sessions: SessionTable,
    pub(crate) origin: Arc<dyn OriginTransport>,
    pub(crate) mirror: Arc<dyn MirrorTransport>,
    events: mpsc::Receiver<BridgeEvent>,
}

impl BridgeEngine {
    pub fn new(
        tickets: TicketStore,
        languages: LanguageStore,
        origin: Arc<dyn OriginTransport>,
        mirror: Arc<dyn MirrorTransport>,
        events: mpsc::Receiver<BridgeEvent>,
    ) -> Self {
        Self {
            tickets,
            languages,
            sessions: SessionTable::new(),
            origin,
            mirror,
            events,
        }
    }

    /// Runs until the queue closes or `shutdown` fires.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("bridge engine started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    self.service(event).await;
                }
            }
        }
        info!("bridge engine stopped");
    }

    /// Drains and services every event currently queued, then returns. Test
    /// entry point; production uses [`run`](BridgeEngine::run).
    pub async fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.service(event).await;
        }
    }

    async fn service(&mut self, event: BridgeEvent) {
        let kind = event.kind();
        debug!(event = kind, "servicing event");
        if let Err(err) = self.handle(event).await {
            error!(event = kind, error = %err, "event handling failed");
        }
    }

    async fn handle(&mut self, event: BridgeEvent) -> Result<(), BridgeError> {
        match event {
            BridgeEvent::MirrorReady => self.handle_mirror_ready().await,
            BridgeEvent::OriginCommand { user, command } => {
                self.handle_origin_command(&user, command).await
            }
            BridgeEvent::OriginText { user, text } => self.handle_origin_text(&user, &text).await,
            BridgeEvent::OriginAction { user, payload } => {
                self.handle_origin_action(&user, &payload).await
            }
            BridgeEvent::MirrorMessage {
                channel,
                author,
                message_id,
                content,
            } => {
                self.handle_mirror_message(&channel, &author, &message_id, &content)
                    .await
            }
            BridgeEvent::MirrorAction { channel, payload } => {
                self.handle_mirror_action(&channel, &payload).await
            }
            BridgeEvent::RelayProbe {
                user_id,
                text,
                reply,
            } => {
                let result = relay::deliver_to_user(&*self.origin, &user_id, &text, &[])
                    .await
                    .map(|_| ());
                // The probe caller may have timed out; nothing to do then.
                let _ = reply.send(result);
                Ok(())
            }
        }
    }
}
