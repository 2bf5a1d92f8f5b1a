// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for Relaydesk.
//!
//! All state lives in JSON files rewritten wholesale on every mutation:
//! `tickets.json` holds the open-ticket set and the per-user sequence
//! counters, `user_languages.json` the language preferences. Writes go
//! through a same-directory temp file so readers never observe a partial
//! file.

pub mod languages;
pub mod persist;
pub mod tickets;

pub use languages::LanguageStore;
pub use persist::JsonFile;
pub use tickets::{CreateTicketError, LookupTier, TicketStore, TicketsRecord};

/// File name of the ticket record inside the data directory.
pub const TICKETS_FILE: &str = "tickets.json";

/// File name of the language preference map inside the data directory.
pub const LANGUAGES_FILE: &str = "user_languages.json";
