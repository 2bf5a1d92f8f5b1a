// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket closure and mirror-channel archival.
//!
//! Closure is a one-way transition driven from either side. The store
//! mutation is the commit point; notification and archival failures after it
//! are logged and never roll the closure back.

use tracing::{info, warn};

use relaydesk_core::traits::{MirrorTransport, OriginTransport};
use relaydesk_core::types::{Ticket, TicketId};
use relaydesk_core::{BridgeError, naming};
use relaydesk_i18n::{MsgKey, render};
use relaydesk_store::{LanguageStore, TicketStore};

use crate::relay::deliver_to_user;
use crate::session::SessionTable;

/// Which side requested the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseInitiator {
    User,
    Support,
}

/// Closes a ticket: removes it from the store, notifies both sides, drops
/// any session pointing at it, and archives the mirror channel.
///
/// The id goes through the tiered lookup, so a stale id from an old button
/// or a truncated channel name still resolves.
pub async fn close_ticket(
    origin: &dyn OriginTransport,
    mirror: &dyn MirrorTransport,
    tickets: &mut TicketStore,
    languages: &LanguageStore,
    sessions: &mut SessionTable,
    id: &TicketId,
    initiator: CloseInitiator,
) -> Result<Ticket, BridgeError> {
    let resolved = tickets
        .find_by_id(id)
        .map(|(t, _)| t.id.clone())
        .ok_or_else(|| BridgeError::NotFound(format!("ticket {id}")))?;

    let ticket = tickets
        .close(&resolved)
        .ok_or_else(|| BridgeError::NotFound(format!("ticket {resolved}")))?;
    sessions.clear_ticket(&ticket.id);
    info!(ticket_id = %ticket.id, initiator = ?initiator, "closing ticket");

    let lang = languages.get(&ticket.user_id);
    let user_text = match initiator {
        CloseInitiator::User => {
            render(MsgKey::TicketClosed, lang, &[&ticket.id.0, &ticket.subject])
        }
        CloseInitiator::Support => render(
            MsgKey::TicketClosedBySupport,
            lang,
            &[&ticket.id.0, &ticket.subject],
        ),
    };
    if let Err(err) = deliver_to_user(origin, &ticket.user_id, &user_text, &[]).await {
        warn!(ticket_id = %ticket.id, error = %err, "failed to notify user of closure");
    }

    archive_mirror_channel(mirror, &ticket, initiator).await;

    Ok(ticket)
}

/// Posts the closure notice into the ticket's channel and archives it.
/// Both steps are best-effort.
async fn archive_mirror_channel(
    mirror: &dyn MirrorTransport,
    ticket: &Ticket,
    initiator: CloseInitiator,
) {
    let Some(channel) = &ticket.mirror_channel_id else {
        return;
    };
    match mirror.channel_exists(channel).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(ticket_id = %ticket.id, channel_id = %channel, "mirror channel already gone");
            return;
        }
        Err(err) => {
            warn!(ticket_id = %ticket.id, error = %err, "channel existence check failed");
            return;
        }
    }

    let by = match initiator {
        CloseInitiator::User => "the user",
        CloseInitiator::Support => "the support team",
    };
    let body = format!("Ticket #{} \"{}\" was closed by {by}.", ticket.id, ticket.subject);
    if let Err(err) = mirror.post_notice(channel, "🔒 Ticket Closed", &body).await {
        warn!(ticket_id = %ticket.id, error = %err, "failed to post closure notice");
    }

    let archived = naming::archived_name(&ticket.id);
    if let Err(err) = mirror.archive_channel(channel, &archived).await {
        warn!(ticket_id = %ticket.id, error = %err, "failed to archive mirror channel");
    }
}
