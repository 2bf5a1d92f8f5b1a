// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram origin transport for the Relaydesk ticket bridge.
//!
//! Implements [`OriginTransport`] for the Telegram Bot API via teloxide.
//! Inbound updates are long-polled, translated into [`BridgeEvent`]s, and
//! pushed into the engine's queue. Outbound rich messages use Markdown
//! parse mode; entity-parse rejections surface as formatting errors so the
//! engine can retry plain.

pub mod commands;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatKind, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, Recipient, User,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use relaydesk_config::model::TelegramConfig;
use relaydesk_core::traits::{OriginTransport, TextFormat, UserAction};
use relaydesk_core::types::{UserId, UserProfile};
use relaydesk_core::{BridgeError, BridgeEvent};

/// Telegram origin transport implementing [`OriginTransport`].
pub struct TelegramOrigin {
    bot: Bot,
}

impl TelegramOrigin {
    pub fn new(config: &TelegramConfig) -> Result<Self, BridgeError> {
        if config.bot_token.is_empty() {
            return Err(BridgeError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }
        Ok(Self {
            bot: Bot::new(&config.bot_token),
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Starts the long-polling dispatcher, translating messages and callback
    /// queries into [`BridgeEvent`]s on `events`.
    pub fn spawn_polling(&self, events: mpsc::Sender<BridgeEvent>) -> JoinHandle<()> {
        let bot = self.bot.clone();
        info!("starting Telegram long polling");

        tokio::spawn(async move {
            let message_tx = events.clone();
            let callback_tx = events;

            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = message_tx.clone();
                    async move {
                        if let Some(event) = message_to_event(&msg) {
                            if tx.send(event).await.is_err() {
                                warn!("event queue closed, dropping Telegram message");
                            }
                        }
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(
                    move |bot: Bot, query: CallbackQuery| {
                        let tx = callback_tx.clone();
                        async move {
                            // Stop the client-side spinner before handing off.
                            if let Err(err) = bot.answer_callback_query(query.id.clone()).await {
                                debug!(error = %err, "failed to answer callback query");
                            }
                            if let Some(event) = callback_to_event(&query) {
                                if tx.send(event).await.is_err() {
                                    warn!("event queue closed, dropping Telegram callback");
                                }
                            }
                            respond(())
                        }
                    },
                ));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // ignore other update kinds
                .build()
                .dispatch()
                .await;
        })
    }
}

/// Translates a Telegram message into a bridge event. Group messages,
/// senderless posts, non-text payloads, and unknown commands are dropped.
fn message_to_event(msg: &Message) -> Option<BridgeEvent> {
    if !matches!(msg.chat.kind, ChatKind::Private(_)) {
        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
        return None;
    }
    let user = profile(msg.from.as_ref()?);
    let text = msg.text()?;

    if commands::is_command(text) {
        return match commands::parse_command(text) {
            Some(command) => Some(BridgeEvent::OriginCommand { user, command }),
            None => {
                debug!(user_id = %user.id, "ignoring unknown command");
                None
            }
        };
    }
    Some(BridgeEvent::OriginText {
        user,
        text: text.to_string(),
    })
}

/// Translates a callback query into an action event.
fn callback_to_event(query: &CallbackQuery) -> Option<BridgeEvent> {
    let payload = query.data.clone()?;
    Some(BridgeEvent::OriginAction {
        user: profile(&query.from),
        payload,
    })
}

fn profile(user: &User) -> UserProfile {
    UserProfile {
        id: UserId(user.id.0.to_string()),
        username: user.username.clone(),
        display_name: user.full_name(),
    }
}

fn keyboard(actions: &[UserAction]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        actions
            .iter()
            .map(|a| vec![InlineKeyboardButton::callback(&a.label, &a.payload)]),
    )
}

/// Classifies a Telegram API error: entity-parse rejections are formatting
/// errors the engine retries plain, everything else is transport.
fn classify_send_error(err: teloxide::RequestError) -> BridgeError {
    let text = err.to_string();
    if text.contains("can't parse entities") {
        BridgeError::Formatting {
            message: text,
            source: Some(Box::new(err)),
        }
    } else {
        BridgeError::Transport {
            message: format!("telegram send failed: {text}"),
            source: Some(Box::new(err)),
        }
    }
}

#[async_trait]
impl OriginTransport for TelegramOrigin {
    async fn send_message(
        &self,
        user_id: &UserId,
        text: &str,
        format: TextFormat,
        actions: &[UserAction],
    ) -> Result<(), BridgeError> {
        let chat_id = user_id
            .0
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| BridgeError::Transport {
                message: format!("invalid Telegram chat id `{user_id}`"),
                source: None,
            })?;

        let mut request = self.bot.send_message(Recipient::Id(chat_id), text);
        if format == TextFormat::Rich {
            request = request.parse_mode(ParseMode::Markdown);
        }
        if !actions.is_empty() {
            request = request.reply_markup(keyboard(actions));
        }
        request.await.map_err(classify_send_error)?;
        Ok(())
    }
}
