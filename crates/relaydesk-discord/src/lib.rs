// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord mirror transport for the Relaydesk ticket bridge.
//!
//! Implements [`MirrorTransport`] over the Discord REST API: dedicated text
//! channels per ticket (visible to the moderator role only), embeds for the
//! initial context and relayed messages, reaction acknowledgements, and
//! rename-plus-lockdown archival. The gateway side lives in [`handler`].

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateChannel, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EditChannel,
};
use serenity::http::Http;
use serenity::model::channel::{
    ChannelType, PermissionOverwrite, PermissionOverwriteType, ReactionType,
};
use serenity::model::colour::Colour;
use serenity::model::id::{ChannelId as DiscordChannelId, GuildId, MessageId, RoleId};
use serenity::model::permissions::Permissions;
use tracing::{debug, warn};

use relaydesk_config::model::DiscordConfig;
use relaydesk_core::traits::{MirrorTransport, NewChannelSpec};
use relaydesk_core::types::{ChannelId, ChannelInfo, Ticket};
use relaydesk_core::{BridgeError, naming};

const EMBED_TICKET: Colour = Colour::new(0x0057_8AFF);
const EMBED_NOTICE: Colour = Colour::new(0x00ED_4245);

/// Discord mirror transport implementing [`MirrorTransport`].
pub struct DiscordMirror {
    http: Arc<Http>,
    guild_id: GuildId,
    default_channel: Option<DiscordChannelId>,
    category: Option<DiscordChannelId>,
    archive_category: Option<DiscordChannelId>,
    mod_role: Option<RoleId>,
}

impl DiscordMirror {
    pub fn new(http: Arc<Http>, config: &DiscordConfig) -> Result<Self, BridgeError> {
        let guild_id = GuildId::new(parse_snowflake("discord.guild_id", &config.guild_id)?);
        let default_channel = config
            .default_channel_id
            .as_deref()
            .map(|v| parse_snowflake("discord.default_channel_id", v))
            .transpose()?
            .map(DiscordChannelId::new);
        let category = config
            .category_id
            .as_deref()
            .map(|v| parse_snowflake("discord.category_id", v))
            .transpose()?
            .map(DiscordChannelId::new);
        let archive_category = config
            .archive_category_id
            .as_deref()
            .map(|v| parse_snowflake("discord.archive_category_id", v))
            .transpose()?
            .map(DiscordChannelId::new);
        let mod_role = config
            .mod_role_id
            .as_deref()
            .map(|v| parse_snowflake("discord.mod_role_id", v))
            .transpose()?
            .map(RoleId::new);

        Ok(Self {
            http,
            guild_id,
            default_channel,
            category,
            archive_category,
            mod_role,
        })
    }

    /// The implicit @everyone role shares its id with the guild.
    fn everyone(&self) -> RoleId {
        RoleId::new(self.guild_id.get())
    }

    /// Overwrites for an active ticket channel: hidden from the guild at
    /// large, fully usable by the moderator role.
    fn active_permissions(&self) -> Vec<PermissionOverwrite> {
        let mut overwrites = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(self.everyone()),
        }];
        if let Some(role) = self.mod_role {
            overwrites.push(PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(role),
            });
        }
        overwrites
    }

    /// Overwrites for an archived channel: readable by moderators, writable
    /// by nobody.
    fn archived_permissions(&self) -> Vec<PermissionOverwrite> {
        let mut overwrites = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
            kind: PermissionOverwriteType::Role(self.everyone()),
        }];
        if let Some(role) = self.mod_role {
            overwrites.push(PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
                deny: Permissions::SEND_MESSAGES,
                kind: PermissionOverwriteType::Role(role),
            });
        }
        overwrites
    }

    fn channel(&self, id: &ChannelId) -> Result<DiscordChannelId, BridgeError> {
        parse_snowflake("channel id", &id.0).map(DiscordChannelId::new)
    }

    /// Initial message posted into a fresh ticket channel: full context plus
    /// a close button and operator instructions.
    fn opening_message(ticket: &Ticket) -> CreateMessage {
        let description = ticket
            .messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let embed = CreateEmbed::new()
            .title(format!("🎫 New Ticket: {}", ticket.subject))
            .description(description)
            .field("User", format!("@{}", ticket.username), true)
            .field("Origin ID", ticket.user_id.0.clone(), true)
            .field("Created", ticket.created_at.to_rfc3339(), true)
            .footer(CreateEmbedFooter::new(format!("Ticket #{}", ticket.id)))
            .colour(EMBED_TICKET);
        let instructions = CreateEmbed::new()
            .description(
                "Messages posted in this channel are relayed to the user. \
                 Use the button below to close the ticket.",
            )
            .colour(Colour::LIGHT_GREY);
        let close = CreateButton::new(format!("close_{}", ticket.id))
            .label("Close Ticket")
            .style(serenity::model::application::ButtonStyle::Danger);
        CreateMessage::new()
            .embed(embed)
            .add_embed(instructions)
            .components(vec![CreateActionRow::Buttons(vec![close])])
    }
}

fn parse_snowflake(key: &str, value: &str) -> Result<u64, BridgeError> {
    value
        .parse::<u64>()
        .map_err(|_| BridgeError::Config(format!("{key} must be a numeric snowflake, got `{value}`")))
}

fn transport_err(context: &str, err: serenity::Error) -> BridgeError {
    BridgeError::Transport {
        message: format!("{context}: {err}"),
        source: Some(Box::new(err)),
    }
}

fn is_unknown_channel(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(resp)) => {
            resp.status_code == serenity::http::StatusCode::NOT_FOUND
        }
        _ => false,
    }
}

pub(crate) fn to_channel_info(channel: &serenity::model::channel::GuildChannel) -> ChannelInfo {
    let created_at = chrono::DateTime::from_timestamp(channel.id.created_at().unix_timestamp(), 0)
        .unwrap_or_else(chrono::Utc::now);
    ChannelInfo {
        id: ChannelId(channel.id.get().to_string()),
        name: channel.name.clone(),
        topic: channel.topic.clone(),
        created_at,
    }
}

#[async_trait]
impl MirrorTransport for DiscordMirror {
    async fn channel_exists(&self, channel: &ChannelId) -> Result<bool, BridgeError> {
        let id = self.channel(channel)?;
        match self.http.get_channel(id).await {
            Ok(_) => Ok(true),
            Err(err) if is_unknown_channel(&err) => Ok(false),
            Err(err) => Err(transport_err("channel lookup failed", err)),
        }
    }

    async fn create_ticket_channel(
        &self,
        ticket: &Ticket,
        spec: &NewChannelSpec,
    ) -> Result<ChannelId, BridgeError> {
        let mut builder = CreateChannel::new(&spec.name)
            .kind(ChannelType::Text)
            .topic(&spec.topic)
            .permissions(self.active_permissions());
        if let Some(category) = self.category {
            builder = builder.category(category);
        }
        let channel = self
            .guild_id
            .create_channel(&self.http, builder)
            .await
            .map_err(|err| transport_err("channel creation failed", err))?;
        debug!(channel_id = channel.id.get(), name = %spec.name, "created ticket channel");

        channel
            .id
            .send_message(&self.http, Self::opening_message(ticket))
            .await
            .map_err(|err| transport_err("failed to post opening message", err))?;

        Ok(ChannelId(channel.id.get().to_string()))
    }

    async fn post_reply(
        &self,
        channel: &ChannelId,
        ticket: &Ticket,
        text: &str,
    ) -> Result<(), BridgeError> {
        let id = self.channel(channel)?;
        let embed = CreateEmbed::new()
            .description(text.to_string())
            .footer(CreateEmbedFooter::new(format!(
                "Ticket #{} | @{}",
                ticket.id, ticket.username
            )))
            .colour(EMBED_TICKET);
        id.send_message(&self.http, CreateMessage::new().embed(embed))
            .await
            .map_err(|err| transport_err("failed to post reply", err))?;
        Ok(())
    }

    async fn post_notice(
        &self,
        channel: &ChannelId,
        title: &str,
        body: &str,
    ) -> Result<(), BridgeError> {
        let id = self.channel(channel)?;
        let embed = CreateEmbed::new()
            .title(title.to_string())
            .description(body.to_string())
            .colour(EMBED_NOTICE);
        id.send_message(&self.http, CreateMessage::new().embed(embed))
            .await
            .map_err(|err| transport_err("failed to post notice", err))?;
        Ok(())
    }

    async fn archive_channel(
        &self,
        channel: &ChannelId,
        archived_name: &str,
    ) -> Result<(), BridgeError> {
        let id = self.channel(channel)?;
        let mut edit = EditChannel::new()
            .name(archived_name)
            .permissions(self.archived_permissions());
        if let Some(archive) = self.archive_category {
            edit = edit.category(Some(archive));
        }
        id.edit(&self.http, edit)
            .await
            .map_err(|err| transport_err("failed to archive channel", err))?;
        Ok(())
    }

    async fn list_ticket_channels(&self) -> Result<Vec<ChannelInfo>, BridgeError> {
        let channels = self
            .guild_id
            .channels(&self.http)
            .await
            .map_err(|err| transport_err("failed to list channels", err))?;
        Ok(channels
            .values()
            .filter(|c| c.kind == ChannelType::Text)
            .filter(|c| naming::is_active_ticket_channel(&c.name))
            .map(to_channel_info)
            .collect())
    }

    async fn acknowledge(
        &self,
        channel: &ChannelId,
        message_id: &str,
        delivered: bool,
    ) -> Result<(), BridgeError> {
        let id = self.channel(channel)?;
        let message = message_id
            .parse::<u64>()
            .map(MessageId::new)
            .map_err(|_| BridgeError::Transport {
                message: format!("invalid message id `{message_id}`"),
                source: None,
            })?;
        let emoji = if delivered { "✅" } else { "❌" };
        if let Err(err) = self
            .http
            .create_reaction(id, message, &ReactionType::Unicode(emoji.to_string()))
            .await
        {
            // Acknowledgement is cosmetic; the relay already happened.
            warn!(channel_id = %channel, error = %err, "failed to add acknowledgement reaction");
        }
        Ok(())
    }

    fn default_channel(&self) -> Option<ChannelId> {
        self.default_channel
            .map(|id| ChannelId(id.get().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiscordConfig {
        DiscordConfig {
            bot_token: "token".into(),
            guild_id: "1000".into(),
            default_channel_id: Some("2000".into()),
            category_id: None,
            archive_category_id: None,
            mod_role_id: Some("3000".into()),
        }
    }

    fn mirror() -> DiscordMirror {
        DiscordMirror::new(Arc::new(Http::new("token")), &config()).unwrap()
    }

    #[test]
    fn rejects_malformed_snowflakes() {
        let mut bad = config();
        bad.guild_id = "general".into();
        assert!(DiscordMirror::new(Arc::new(Http::new("token")), &bad).is_err());
    }

    #[test]
    fn everyone_role_matches_guild_id() {
        assert_eq!(mirror().everyone().get(), 1000);
    }

    #[test]
    fn active_permissions_hide_channel_from_everyone() {
        let overwrites = mirror().active_permissions();
        assert_eq!(overwrites.len(), 2);
        assert!(overwrites[0].deny.contains(Permissions::VIEW_CHANNEL));
        assert!(overwrites[1].allow.contains(Permissions::SEND_MESSAGES));
    }

    #[test]
    fn archived_permissions_revoke_writes_everywhere() {
        let overwrites = mirror().archived_permissions();
        for o in &overwrites {
            assert!(
                o.deny.contains(Permissions::SEND_MESSAGES),
                "every overwrite must deny sends"
            );
        }
    }

    #[test]
    fn default_channel_comes_from_config() {
        assert_eq!(mirror().default_channel().unwrap().0, "2000");
    }
}
