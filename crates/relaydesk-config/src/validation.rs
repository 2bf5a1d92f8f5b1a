// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as required tokens and valid bind addresses.

use crate::diagnostic::ConfigError;
use crate::model::RelaydeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all validation errors rather than failing fast.
pub fn validate_config(config: &RelaydeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.telegram.bot_token.trim().is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }

    if config.discord.bot_token.trim().is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "discord.bot_token".to_string(),
        });
    }

    if config.discord.guild_id.trim().is_empty() {
        errors.push(ConfigError::MissingKey {
            key: "discord.guild_id".to_string(),
        });
    }

    // Snowflake ids are numeric; catch pasted channel names early.
    for (key, value) in [
        ("discord.guild_id", Some(&config.discord.guild_id)),
        ("discord.default_channel_id", config.discord.default_channel_id.as_ref()),
        ("discord.category_id", config.discord.category_id.as_ref()),
        (
            "discord.archive_category_id",
            config.discord.archive_category_id.as_ref(),
        ),
        ("discord.mod_role_id", config.discord.mod_role_id.as_ref()),
    ] {
        if let Some(value) = value
            && !value.trim().is_empty()
            && value.parse::<u64>().is_err()
        {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be a numeric snowflake id, got `{value}`"),
            });
        }
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    if config.gateway.enabled {
        let host = config.gateway.host.trim();
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
        if config.gateway.port == 0 {
            errors.push(ConfigError::Validation {
                message: "gateway.port must be non-zero when the gateway is enabled".to_string(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
