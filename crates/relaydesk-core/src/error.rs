// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relaydesk ticket bridge.

use thiserror::Error;

/// The primary error type used across transports, stores, and the engine.
///
/// Domain conditions that callers are expected to recover from (a user who
/// already owns an open ticket, an out-of-range subject length) are modelled
/// as typed results on the operations that produce them, not as variants here.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence errors (serialization, file I/O on the durable records).
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A send was rejected because of its rich formatting. The relay engine
    /// retries these once with a plain rendering before giving up.
    #[error("formatting rejected: {message}")]
    Formatting {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport-level failure on either platform (API error, network).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A ticket, channel, or role could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// No mirror channel could be resolved for an outbound relay: the ticket
    /// has no linked channel, channel creation failed or was not applicable,
    /// and no default channel is configured.
    #[error("no mirror channel available")]
    NoChannelAvailable,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// True when a retry with plain formatting may succeed.
    pub fn is_formatting(&self) -> bool {
        matches!(self, BridgeError::Formatting { .. })
    }
}
