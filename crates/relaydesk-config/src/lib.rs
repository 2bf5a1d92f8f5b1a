// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Relaydesk ticket bridge.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and miette diagnostics with typo suggestions.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::RelaydeskConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors are converted to diagnostics with typo suggestions; a
/// successfully parsed config is then checked for semantic errors, all of
/// which are collected before returning.
pub fn load_and_validate() -> Result<RelaydeskConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<RelaydeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_load_and_validate() {
        let config = load_and_validate_str(
            r#"
            [telegram]
            bot_token = "tg"

            [discord]
            bot_token = "dc"
            guild_id = "99887766"
            mod_role_id = "1122"
            "#,
        )
        .unwrap();
        assert_eq!(config.discord.mod_role_id.as_deref(), Some("1122"));
    }

    #[test]
    fn typo_produces_suggestion() {
        let errors = load_and_validate_str(
            r#"
            [telegram]
            bot_tokn = "tg"
            "#,
        )
        .unwrap_err();
        let has_suggestion = errors.iter().any(|e| match e {
            ConfigError::UnknownKey { suggestion, .. } => {
                suggestion.as_deref() == Some("bot_token")
            }
            _ => false,
        });
        assert!(has_suggestion, "expected bot_token suggestion: {errors:?}");
    }
}
