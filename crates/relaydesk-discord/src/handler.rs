// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord gateway handler.
//!
//! Listens for the ready signal, operator messages in ticket channels, and
//! close-button interactions, translating each into a [`BridgeEvent`].

use async_trait::async_trait;
use serenity::builder::CreateInteractionResponse;
use serenity::client::{Context, EventHandler};
use serenity::model::application::Interaction;
use serenity::model::channel::{Channel, Message};
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::GuildId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use relaydesk_config::model::DiscordConfig;
use relaydesk_core::types::{ChannelInfo, MirrorAuthor};
use relaydesk_core::{BridgeError, BridgeEvent, naming};

/// Gateway event handler feeding the engine queue.
pub struct BridgeHandler {
    guild_id: GuildId,
    events: mpsc::Sender<BridgeEvent>,
}

impl BridgeHandler {
    pub fn new(guild_id: GuildId, events: mpsc::Sender<BridgeEvent>) -> Self {
        Self { guild_id, events }
    }

    async fn ticket_channel_info(&self, ctx: &Context, id: serenity::model::id::ChannelId) -> Option<ChannelInfo> {
        let channel = match id.to_channel(ctx).await {
            Ok(Channel::Guild(channel)) => channel,
            Ok(_) => return None,
            Err(err) => {
                warn!(channel_id = id.get(), error = %err, "failed to resolve channel");
                return None;
            }
        };
        if channel.guild_id != self.guild_id {
            return None;
        }
        if !naming::is_active_ticket_channel(&channel.name) {
            return None;
        }
        Some(super::to_channel_info(&channel))
    }

    async fn push(&self, event: BridgeEvent) {
        if self.events.send(event).await.is_err() {
            warn!("event queue closed, dropping Discord event");
        }
    }
}

#[async_trait]
impl EventHandler for BridgeHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(bot = %ready.user.name, "Discord gateway connected");
        self.push(BridgeEvent::MirrorReady).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || msg.content.is_empty() {
            return;
        }
        let Some(channel) = self.ticket_channel_info(&ctx, msg.channel_id).await else {
            return;
        };
        self.push(BridgeEvent::MirrorMessage {
            channel,
            author: MirrorAuthor {
                id: msg.author.id.get().to_string(),
                username: msg.author.name.clone(),
            },
            message_id: msg.id.get().to_string(),
            content: msg.content.clone(),
        })
        .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };
        if !component.data.custom_id.starts_with("close_") {
            debug!(custom_id = %component.data.custom_id, "ignoring unrecognized component");
            return;
        }
        // Acknowledge immediately so the button stops spinning; the outcome
        // is posted as a channel notice by the engine.
        if let Err(err) = component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await
        {
            warn!(error = %err, "failed to acknowledge component interaction");
        }
        let Some(channel) = self.ticket_channel_info(&ctx, component.channel_id).await else {
            return;
        };
        self.push(BridgeEvent::MirrorAction {
            channel,
            payload: component.data.custom_id.clone(),
        })
        .await;
    }
}

/// Builds the gateway client with the intents the bridge needs. The caller
/// owns the run loop (`client.start()`) and may share `client.http` with
/// [`DiscordMirror`](super::DiscordMirror).
pub async fn build_client(
    config: &DiscordConfig,
    events: mpsc::Sender<BridgeEvent>,
) -> Result<serenity::Client, BridgeError> {
    if config.bot_token.is_empty() {
        return Err(BridgeError::Config("discord.bot_token cannot be empty".into()));
    }
    let guild_id = config
        .guild_id
        .parse::<u64>()
        .map(GuildId::new)
        .map_err(|_| {
            BridgeError::Config(format!(
                "discord.guild_id must be a numeric snowflake, got `{}`",
                config.guild_id
            ))
        })?;

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    serenity::Client::builder(&config.bot_token, intents)
        .event_handler(BridgeHandler::new(guild_id, events))
        .await
        .map_err(|err| BridgeError::Transport {
            message: format!("failed to build Discord client: {err}"),
            source: Some(Box::new(err)),
        })
}
