// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./relaydesk.toml` > `~/.config/relaydesk/relaydesk.toml`
//! > `/etc/relaydesk/relaydesk.toml` with environment variable overrides via
//! the `RELAYDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RelaydeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/relaydesk/relaydesk.toml` (system-wide)
/// 3. `~/.config/relaydesk/relaydesk.toml` (user XDG config)
/// 4. `./relaydesk.toml` (local directory)
/// 5. `RELAYDESK_*` environment variables
pub fn load_config() -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::file("/etc/relaydesk/relaydesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("relaydesk/relaydesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("relaydesk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelaydeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaydeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `RELAYDESK_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("RELAYDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("discord_", "discord.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [agent]
            log_level = "debug"

            [telegram]
            bot_token = "tg-token"

            [discord]
            bot_token = "dc-token"
            guild_id = "123"
            default_channel_id = "456"
            "#,
        )
        .unwrap();

        assert_eq!(config.agent.log_level, "debug");
        assert_eq!(config.agent.name, "relaydesk");
        assert_eq!(config.telegram.bot_token, "tg-token");
        assert_eq!(config.discord.guild_id, "123");
        assert_eq!(config.discord.default_channel_id.as_deref(), Some("456"));
    }

    #[test]
    fn env_vars_override_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "relaydesk.toml",
                r#"
                [telegram]
                bot_token = "from-file"
                "#,
            )?;
            jail.set_env("RELAYDESK_TELEGRAM_BOT_TOKEN", "from-env");
            jail.set_env("RELAYDESK_GATEWAY_PORT", "9090");

            let config = load_config().expect("config should load");
            assert_eq!(config.telegram.bot_token, "from-env");
            assert_eq!(config.gateway.port, 9090);
            Ok(())
        });
    }

    #[test]
    fn unknown_section_key_fails_extraction() {
        let result = load_config_from_str(
            r#"
            [agent]
            naem = "typo"
            "#,
        );
        assert!(result.is_err());
    }
}
