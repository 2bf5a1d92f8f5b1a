// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Relaydesk workspace.
//!
//! Mock implementations of the transport traits with injectable failures
//! and captured calls for assertion.

pub mod mock_mirror;
pub mod mock_origin;

pub use mock_mirror::{CreatedChannel, MockMirror};
pub use mock_origin::{MockOrigin, SentUserMessage};
