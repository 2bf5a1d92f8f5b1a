// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport traits consumed by the engine.

pub mod mirror;
pub mod origin;

pub use mirror::{MirrorTransport, NewChannelSpec};
pub use origin::{OriginTransport, TextFormat, UserAction};
