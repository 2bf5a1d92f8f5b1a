// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing with multilingual aliases.
//!
//! Users interact in their own language, so each command accepts its
//! English, Portuguese, and Spanish spellings. The alias table mirrors the
//! command lists shown by the localized help texts.

use relaydesk_core::OriginCommand;

/// Parses a slash command, tolerating a `@botname` suffix. Returns `None`
/// for non-commands and unrecognized commands.
pub fn parse_command(text: &str) -> Option<OriginCommand> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix('/')?;
    let name = body.split_whitespace().next()?;
    let name = name.split('@').next()?.to_ascii_lowercase();

    match name.as_str() {
        "start" => Some(OriginCommand::Start),
        "help" | "ajuda" | "ayuda" => Some(OriginCommand::Help),
        "newticket" | "novoticket" | "nuevoticket" => Some(OriginCommand::NewTicket),
        "mytickets" | "meustickets" | "mistickets" => Some(OriginCommand::MyTickets),
        "language" | "idioma" => Some(OriginCommand::Language),
        _ => None,
    }
}

/// True when the text is shaped like a command, recognized or not. Unknown
/// commands are dropped rather than treated as ticket text.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_commands() {
        assert_eq!(parse_command("/start"), Some(OriginCommand::Start));
        assert_eq!(parse_command("/newticket"), Some(OriginCommand::NewTicket));
        assert_eq!(parse_command("/mytickets"), Some(OriginCommand::MyTickets));
        assert_eq!(parse_command("/help"), Some(OriginCommand::Help));
        assert_eq!(parse_command("/language"), Some(OriginCommand::Language));
    }

    #[test]
    fn localized_aliases() {
        assert_eq!(parse_command("/novoticket"), Some(OriginCommand::NewTicket));
        assert_eq!(parse_command("/nuevoticket"), Some(OriginCommand::NewTicket));
        assert_eq!(parse_command("/meustickets"), Some(OriginCommand::MyTickets));
        assert_eq!(parse_command("/mistickets"), Some(OriginCommand::MyTickets));
        assert_eq!(parse_command("/ajuda"), Some(OriginCommand::Help));
        assert_eq!(parse_command("/ayuda"), Some(OriginCommand::Help));
        assert_eq!(parse_command("/idioma"), Some(OriginCommand::Language));
    }

    #[test]
    fn bot_suffix_and_case_are_tolerated() {
        assert_eq!(
            parse_command("/NewTicket@relaydesk_bot"),
            Some(OriginCommand::NewTicket)
        );
    }

    #[test]
    fn non_commands_and_unknown_commands() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/frobnicate"), None);
        assert!(is_command("/frobnicate"));
        assert!(!is_command("plain text"));
    }
}
