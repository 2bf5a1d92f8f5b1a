// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relaydesk bridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Relaydesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. Tokens have no defaults and must be provided.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaydeskConfig {
    /// Bridge identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram (origin platform) settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Discord (mirror platform) settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Data directory for the JSON state files.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Optional HTTP relay gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Bridge identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in mirror-side embeds.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "relaydesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot configuration. The bot owns the origin side of the bridge.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather.
    #[serde(default)]
    pub bot_token: String,
}

/// Discord bot configuration. The bot owns the mirror side of the bridge.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(default)]
    pub bot_token: String,

    /// Guild (server) the ticket channels live in.
    #[serde(default)]
    pub guild_id: String,

    /// Fallback channel for messages whose ticket channel cannot be
    /// resolved or created.
    #[serde(default)]
    pub default_channel_id: Option<String>,

    /// Category new ticket channels are created under.
    #[serde(default)]
    pub category_id: Option<String>,

    /// Category archived channels are moved to. Falls back to renaming in
    /// place when unset.
    #[serde(default)]
    pub archive_category_id: Option<String>,

    /// Moderator role granted access to ticket channels.
    #[serde(default)]
    pub mod_role_id: Option<String>,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding `tickets.json` and `user_languages.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

/// HTTP relay gateway configuration. Disabled by default.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}
