// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event handling: origin commands and text, action callbacks from both
//! platforms, mirror messages, and the startup synchronization trigger.

use tracing::{info, warn};

use relaydesk_core::traits::UserAction;
use relaydesk_core::types::{
    ChannelInfo, MirrorAuthor, Sender, TicketId, TicketMessage, UserProfile,
};
use relaydesk_core::{BridgeError, OriginCommand, naming};
use relaydesk_i18n::{Lang, MsgKey, detect, render, text};
use relaydesk_store::CreateTicketError;

use crate::lifecycle::{self, CloseInitiator};
use crate::relay;
use crate::session::SessionState;
use crate::BridgeEngine;

/// Inline-action payload prefixes on the origin side.
pub const ACTION_DIRECT_CLOSE: &str = "direct_close_";
pub const ACTION_CONFIRM_CLOSE: &str = "confirm_close_";
pub const ACTION_CANCEL_CLOSE: &str = "cancel_close_";
pub const ACTION_LANG: &str = "lang_";

/// Button payload prefix on the mirror side.
pub const MIRROR_ACTION_CLOSE: &str = "close_";

const SUBJECT_MIN: usize = 3;
const SUBJECT_MAX: usize = 100;
const DESCRIPTION_MIN: usize = 10;

impl BridgeEngine {
    pub(crate) async fn handle_mirror_ready(&mut self) -> Result<(), BridgeError> {
        let report = crate::sync::synchronize(&*self.mirror, &mut self.tickets).await?;
        info!(
            recovered = report.tickets_recovered,
            relinked = report.channels_relinked,
            created = report.channels_created,
            "mirror ready, synchronization finished"
        );
        Ok(())
    }

    pub(crate) async fn handle_origin_command(
        &mut self,
        user: &UserProfile,
        command: OriginCommand,
    ) -> Result<(), BridgeError> {
        let lang = self.languages.get(&user.id);
        match command {
            OriginCommand::Start => {
                // First contact: guess the language from the display name;
                // /language and free-text detection can refine it later.
                if !self.languages.has(&user.id) {
                    let detected = detect::detect(&user.display_name);
                    self.languages.set(&user.id, detected);
                    info!(user_id = %user.id, lang = %detected, "language detected from display name");
                }
                let lang = self.languages.get(&user.id);
                let welcome = render(MsgKey::Welcome, lang, &[&user.display_name]);
                relay::deliver_to_user(&*self.origin, &user.id, &welcome, &[]).await?;
            }
            OriginCommand::Help => {
                relay::deliver_to_user(&*self.origin, &user.id, text(MsgKey::Help, lang), &[])
                    .await?;
            }
            OriginCommand::NewTicket => {
                if let Some(existing) = self.tickets.find_open_by_user(&user.id) {
                    let id = existing.id.clone();
                    self.sessions
                        .set(&user.id, SessionState::Replying { ticket_id: id });
                    relay::deliver_to_user(
                        &*self.origin,
                        &user.id,
                        text(MsgKey::AlreadyHasTicket, lang),
                        &[],
                    )
                    .await?;
                } else {
                    self.sessions.set(&user.id, SessionState::AwaitingSubject);
                    relay::deliver_to_user(
                        &*self.origin,
                        &user.id,
                        text(MsgKey::NewTicketPrompt, lang),
                        &[],
                    )
                    .await?;
                }
            }
            OriginCommand::MyTickets => match self.tickets.find_open_by_user(&user.id) {
                Some(ticket) => {
                    let summary = format!(
                        "{}*Ticket #{}*\n*Subject:* {}\n*Status:* {}\n*Created:* {}",
                        text(MsgKey::YourTickets, lang),
                        ticket.id,
                        ticket.subject,
                        ticket.status,
                        ticket.created_at.to_rfc3339(),
                    );
                    let close = UserAction::new(
                        text(MsgKey::CloseTicketButton, lang),
                        format!("{ACTION_DIRECT_CLOSE}{}", ticket.id),
                    );
                    relay::deliver_to_user(&*self.origin, &user.id, &summary, &[close]).await?;
                }
                None => {
                    relay::deliver_to_user(
                        &*self.origin,
                        &user.id,
                        text(MsgKey::NoTickets, lang),
                        &[],
                    )
                    .await?;
                }
            },
            OriginCommand::Language => {
                let actions = [
                    UserAction::new("🇬🇧 English", format!("{ACTION_LANG}en")),
                    UserAction::new("🇧🇷 Português", format!("{ACTION_LANG}pt")),
                    UserAction::new("🇪🇸 Español", format!("{ACTION_LANG}es")),
                ];
                relay::deliver_to_user(
                    &*self.origin,
                    &user.id,
                    text(MsgKey::SelectLanguage, lang),
                    &actions,
                )
                .await?;
            }
        }
        Ok(())
    }

    pub(crate) async fn handle_origin_text(
        &mut self,
        user: &UserProfile,
        raw: &str,
    ) -> Result<(), BridgeError> {
        // First message from an unknown user sets their language by
        // detection; /language can override it later.
        if !self.languages.has(&user.id) {
            let detected = detect::detect(raw);
            self.languages.set(&user.id, detected);
            info!(user_id = %user.id, lang = %detected, "language detected");
        }
        let lang = self.languages.get(&user.id);
        let message = raw.trim();

        match self.sessions.get(&user.id).cloned() {
            Some(SessionState::AwaitingSubject) => {
                let len = message.chars().count();
                if !(SUBJECT_MIN..=SUBJECT_MAX).contains(&len) {
                    relay::deliver_to_user(
                        &*self.origin,
                        &user.id,
                        text(MsgKey::SubjectTooShort, lang),
                        &[],
                    )
                    .await?;
                    return Ok(());
                }
                self.sessions.set(
                    &user.id,
                    SessionState::AwaitingDescription {
                        subject: message.to_string(),
                    },
                );
                relay::deliver_to_user(
                    &*self.origin,
                    &user.id,
                    text(MsgKey::EnterDescription, lang),
                    &[],
                )
                .await?;
            }
            Some(SessionState::AwaitingDescription { subject }) => {
                if message.chars().count() < DESCRIPTION_MIN {
                    relay::deliver_to_user(
                        &*self.origin,
                        &user.id,
                        text(MsgKey::DescriptionTooShort, lang),
                        &[],
                    )
                    .await?;
                    return Ok(());
                }
                self.create_ticket(user, &subject, message, lang).await?;
            }
            Some(SessionState::Replying { ticket_id }) => {
                self.append_and_relay(user, &ticket_id, message, lang).await?;
            }
            None => {
                // Stateless default: free text goes to the open ticket when
                // one exists, otherwise the user is pointed at /newticket.
                match self.tickets.find_open_by_user(&user.id).map(|t| t.id.clone()) {
                    Some(ticket_id) => {
                        self.sessions.set(
                            &user.id,
                            SessionState::Replying {
                                ticket_id: ticket_id.clone(),
                            },
                        );
                        self.append_and_relay(user, &ticket_id, message, lang).await?;
                    }
                    None => {
                        relay::deliver_to_user(
                            &*self.origin,
                            &user.id,
                            text(MsgKey::UseNewTicket, lang),
                            &[],
                        )
                        .await?;
                    }
                }
            }
        }
        Ok(())
    }

    async fn create_ticket(
        &mut self,
        user: &UserProfile,
        subject: &str,
        description: &str,
        lang: Lang,
    ) -> Result<(), BridgeError> {
        match self.tickets.create(user, subject, description) {
            Ok(ticket) => {
                self.sessions.set(
                    &user.id,
                    SessionState::Replying {
                        ticket_id: ticket.id.clone(),
                    },
                );
                if let Err(err) =
                    relay::open_mirror_channel(&*self.mirror, &mut self.tickets, &ticket).await
                {
                    // The ticket is durable; synchronization recreates the
                    // channel on the next startup.
                    warn!(ticket_id = %ticket.id, error = %err, "mirror channel creation failed");
                }
                let confirmation =
                    render(MsgKey::TicketCreated, lang, &[&ticket.id.0, &ticket.subject]);
                let close = UserAction::new(
                    text(MsgKey::CloseTicketButton, lang),
                    format!("{ACTION_DIRECT_CLOSE}{}", ticket.id),
                );
                relay::deliver_to_user(&*self.origin, &user.id, &confirmation, &[close]).await?;
            }
            Err(CreateTicketError::AlreadyOpen(existing)) => {
                self.sessions.set(
                    &user.id,
                    SessionState::Replying {
                        ticket_id: existing.id,
                    },
                );
                relay::deliver_to_user(
                    &*self.origin,
                    &user.id,
                    text(MsgKey::AlreadyHasTicket, lang),
                    &[],
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn append_and_relay(
        &mut self,
        user: &UserProfile,
        ticket_id: &TicketId,
        message: &str,
        lang: Lang,
    ) -> Result<(), BridgeError> {
        let Some(ticket) = self.tickets.find_by_id(ticket_id).map(|(t, _)| t.clone()) else {
            // The session pointed at a ticket that has since closed.
            self.sessions.clear(&user.id);
            relay::deliver_to_user(
                &*self.origin,
                &user.id,
                text(MsgKey::UseNewTicket, lang),
                &[],
            )
            .await?;
            return Ok(());
        };

        self.tickets
            .append_message(&ticket.id, TicketMessage::new(Sender::User, message));
        match relay::relay_user_message(&*self.mirror, &ticket, message).await {
            Ok(_) => {}
            Err(err) => {
                // The message is in the durable log either way; the support
                // side catches up via channel history or synchronization.
                warn!(ticket_id = %ticket.id, error = %err, "mirror relay failed");
            }
        }
        relay::deliver_to_user(&*self.origin, &user.id, text(MsgKey::MessageSent, lang), &[])
            .await?;
        Ok(())
    }

    pub(crate) async fn handle_origin_action(
        &mut self,
        user: &UserProfile,
        payload: &str,
    ) -> Result<(), BridgeError> {
        let lang = self.languages.get(&user.id);

        if let Some(code) = payload.strip_prefix(ACTION_LANG) {
            let Ok(chosen) = code.parse::<Lang>() else {
                warn!(user_id = %user.id, payload, "unknown language code");
                return Ok(());
            };
            self.languages.set(&user.id, chosen);
            relay::deliver_to_user(
                &*self.origin,
                &user.id,
                text(MsgKey::LanguageChanged, chosen),
                &[],
            )
            .await?;
            return Ok(());
        }

        if let Some(id) = payload.strip_prefix(ACTION_DIRECT_CLOSE) {
            let id = TicketId(id.to_string());
            if self.tickets.find_by_id(&id).is_none() {
                relay::deliver_to_user(
                    &*self.origin,
                    &user.id,
                    text(MsgKey::TicketNotFound, lang),
                    &[],
                )
                .await?;
                return Ok(());
            }
            let actions = [
                UserAction::new(
                    text(MsgKey::ConfirmButton, lang),
                    format!("{ACTION_CONFIRM_CLOSE}{id}"),
                ),
                UserAction::new(
                    text(MsgKey::CancelButton, lang),
                    format!("{ACTION_CANCEL_CLOSE}{id}"),
                ),
            ];
            relay::deliver_to_user(
                &*self.origin,
                &user.id,
                text(MsgKey::ConfirmCloseTicket, lang),
                &actions,
            )
            .await?;
            return Ok(());
        }

        if let Some(id) = payload.strip_prefix(ACTION_CONFIRM_CLOSE) {
            let id = TicketId(id.to_string());
            match lifecycle::close_ticket(
                &*self.origin,
                &*self.mirror,
                &mut self.tickets,
                &self.languages,
                &mut self.sessions,
                &id,
                CloseInitiator::User,
            )
            .await
            {
                Ok(_) => {}
                Err(BridgeError::NotFound(_)) => {
                    relay::deliver_to_user(
                        &*self.origin,
                        &user.id,
                        text(MsgKey::TicketNotFound, lang),
                        &[],
                    )
                    .await?;
                }
                Err(err) => return Err(err),
            }
            return Ok(());
        }

        if payload.strip_prefix(ACTION_CANCEL_CLOSE).is_some() {
            relay::deliver_to_user(
                &*self.origin,
                &user.id,
                text(MsgKey::CloseCancelled, lang),
                &[],
            )
            .await?;
            return Ok(());
        }

        warn!(user_id = %user.id, payload, "unrecognized origin action");
        Ok(())
    }

    pub(crate) async fn handle_mirror_message(
        &mut self,
        channel: &ChannelInfo,
        author: &MirrorAuthor,
        message_id: &str,
        content: &str,
    ) -> Result<(), BridgeError> {
        let resolved = self
            .tickets
            .find_by_mirror_channel(&channel.id)
            .map(|t| t.clone())
            .or_else(|| {
                let topic = channel.topic.as_deref()?;
                let id = naming::parse_topic_ticket_id(topic)?;
                self.tickets.find_by_id(&id).map(|(t, _)| t.clone())
            });

        let Some(ticket) = resolved else {
            self.mirror.acknowledge(&channel.id, message_id, false).await?;
            self.mirror
                .post_notice(
                    &channel.id,
                    "⚠️ Ticket Not Found",
                    "No open ticket matches this channel; it may already be closed.",
                )
                .await?;
            return Ok(());
        };

        let mut entry = TicketMessage::new(Sender::Support, content);
        entry.source_user_id = Some(author.id.clone());
        entry.source_username = Some(author.username.clone());
        self.tickets.append_message(&ticket.id, entry);

        let lang = self.languages.get(&ticket.user_id);
        let reply = render(MsgKey::SupportReply, lang, &[&ticket.id.0, content]);
        let close = UserAction::new(
            text(MsgKey::CloseTicketButton, lang),
            format!("{ACTION_DIRECT_CLOSE}{}", ticket.id),
        );
        let delivered =
            relay::deliver_to_user(&*self.origin, &ticket.user_id, &reply, &[close]).await;
        if let Err(err) = &delivered {
            warn!(ticket_id = %ticket.id, error = %err, "support reply delivery failed");
        }
        self.mirror
            .acknowledge(&channel.id, message_id, delivered.is_ok())
            .await?;
        Ok(())
    }

    pub(crate) async fn handle_mirror_action(
        &mut self,
        channel: &ChannelInfo,
        payload: &str,
    ) -> Result<(), BridgeError> {
        let Some(id) = payload.strip_prefix(MIRROR_ACTION_CLOSE) else {
            warn!(channel = %channel.id, payload, "unrecognized mirror action");
            return Ok(());
        };
        let id = TicketId(id.to_string());
        match lifecycle::close_ticket(
            &*self.origin,
            &*self.mirror,
            &mut self.tickets,
            &self.languages,
            &mut self.sessions,
            &id,
            CloseInitiator::Support,
        )
        .await
        {
            Ok(_) => Ok(()),
            Err(BridgeError::NotFound(_)) => {
                self.mirror
                    .post_notice(
                        &channel.id,
                        "⚠️ Ticket Not Found",
                        "No open ticket matches this id; it may already be closed.",
                    )
                    .await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
