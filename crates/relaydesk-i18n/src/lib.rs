// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static translation tables and language detection.
//!
//! Pure functions over a compiled-in string table: `(key, language, args)`
//! resolves to a localized string with `%s` placeholders substituted in
//! order. Missing translations fall back to English.

pub mod detect;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported user languages.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Pt,
    Es,
}

/// Keys into the translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgKey {
    Welcome,
    Help,
    NewTicketPrompt,
    NoTickets,
    YourTickets,
    TicketCreated,
    MessageSent,
    TicketNotFound,
    TicketClosed,
    TicketClosedBySupport,
    SubjectTooShort,
    DescriptionTooShort,
    EnterDescription,
    ReplyToMessage,
    SupportReply,
    UseNewTicket,
    ErrorCreatingTicket,
    SelectLanguage,
    LanguageChanged,
    CloseTicketButton,
    ConfirmCloseTicket,
    ConfirmButton,
    CancelButton,
    CloseCancelled,
    AlreadyHasTicket,
}

/// Resolves a key for a language, falling back to English when the
/// localized entry is missing.
pub fn text(key: MsgKey, lang: Lang) -> &'static str {
    localized(key, lang).unwrap_or_else(|| localized(key, Lang::En).unwrap_or(""))
}

/// Resolves a key and substitutes `%s` placeholders with `args` in order.
/// Surplus placeholders are replaced with the empty string. Only the
/// template is scanned for placeholders; a `%s` inside an argument is
/// carried through literally.
pub fn render(key: MsgKey, lang: Lang, args: &[&str]) -> String {
    let template = text(key, lang);
    let mut parts = template.split("%s");
    let mut out = String::with_capacity(template.len());
    if let Some(head) = parts.next() {
        out.push_str(head);
    }
    let mut args = args.iter();
    for part in parts {
        if let Some(arg) = args.next() {
            out.push_str(arg);
        }
        out.push_str(part);
    }
    out
}

fn localized(key: MsgKey, lang: Lang) -> Option<&'static str> {
    use MsgKey::*;
    match lang {
        Lang::En => Some(match key {
            Welcome => "👋 Hello, %s!\n\nWelcome to the support bot. You can create a new ticket at any time using the /newticket command.",
            Help => "📚 *Available commands:*\n\n• /start - Start the bot\n• /newticket - Create a new support ticket\n• /mytickets - View your active ticket\n• /help - Show this help message\n• /language - Change your preferred language",
            NewTicketPrompt => "📝 Let's create a new support ticket.\n\nPlease enter the subject of your ticket:",
            NoTickets => "You don't have any open tickets at the moment.",
            YourTickets => "🎫 *Your active ticket:*\n\n",
            TicketCreated => "✅ Your ticket has been created successfully!\n\n*Ticket #%s*\n*Subject:* %s\n\nA member of our support team will respond shortly. You will receive a notification here when there is a response.\n\nYou can simply reply to this chat to add more information to your ticket.",
            MessageSent => "✅ Your message has been sent successfully!",
            TicketNotFound => "❌ Ticket not found or already closed.",
            TicketClosed => "✅ Ticket #%s \"%s\" has been closed successfully.",
            TicketClosedBySupport => "🔒 *Ticket #%s Closed*\n\nYour ticket \"%s\" has been closed by the support team.",
            SubjectTooShort => "⚠️ The subject must be between 3 and 100 characters. Please try again:",
            DescriptionTooShort => "⚠️ The description is too short. Please provide more details:",
            EnterDescription => "👍 Great! Now, please describe your problem in detail:",
            ReplyToMessage => "✏️ *Reply to this message to add a response to the ticket.*",
            SupportReply => "💬 *Support Response (Ticket #%s):*\n\n%s\n\n_You can reply directly to this chat to respond to the ticket._",
            UseNewTicket => "To create a new ticket, use the /newticket command.\nTo view your active ticket, use the /mytickets command.\nTo view all available commands, use /help.",
            ErrorCreatingTicket => "❌ An error occurred while creating the ticket. Please try again later.",
            SelectLanguage => "🌐 *Select your preferred language:*",
            LanguageChanged => "✅ Your language has been changed to English.",
            CloseTicketButton => "Close Ticket",
            ConfirmCloseTicket => "Are you sure you want to close this ticket? This action cannot be undone.",
            ConfirmButton => "✅ Yes, close it",
            CancelButton => "❌ Cancel",
            CloseCancelled => "❌ Operation cancelled. Your ticket remains open.",
            AlreadyHasTicket => "You already have an active ticket. Please continue the conversation in that ticket or close it before creating a new one.",
        }),
        Lang::Pt => Some(match key {
            Welcome => "👋 Olá, %s!\n\nBem-vindo ao bot de suporte. Você pode criar um novo ticket a qualquer momento usando o comando /novoticket.",
            Help => "📚 *Comandos disponíveis:*\n\n• /start - Inicia o bot\n• /novoticket - Cria um novo ticket de suporte\n• /meustickets - Visualiza seu ticket ativo\n• /ajuda - Mostra esta mensagem de ajuda\n• /idioma - Altera seu idioma preferido",
            NewTicketPrompt => "📝 Vamos criar um novo ticket de suporte.\n\nPor favor, digite o assunto do seu ticket:",
            NoTickets => "Você não possui tickets abertos no momento.",
            YourTickets => "🎫 *Seu ticket ativo:*\n\n",
            TicketCreated => "✅ Seu ticket foi criado com sucesso!\n\n*Ticket #%s*\n*Assunto:* %s\n\nUm membro da nossa equipe de suporte irá responder em breve. Você receberá uma notificação aqui quando houver uma resposta.\n\nVocê pode simplesmente responder a este chat para adicionar mais informações ao seu ticket.",
            MessageSent => "✅ Sua mensagem foi enviada com sucesso!",
            TicketNotFound => "❌ Ticket não encontrado ou já foi fechado.",
            TicketClosed => "✅ Ticket #%s \"%s\" foi fechado com sucesso.",
            TicketClosedBySupport => "🔒 *Ticket #%s Fechado*\n\nSeu ticket \"%s\" foi fechado pela equipe de suporte.",
            SubjectTooShort => "⚠️ O assunto deve ter entre 3 e 100 caracteres. Por favor, tente novamente:",
            DescriptionTooShort => "⚠️ A descrição é muito curta. Por favor, forneça mais detalhes:",
            EnterDescription => "👍 Ótimo! Agora, por favor, descreva seu problema em detalhes:",
            ReplyToMessage => "✏️ *Responda a esta mensagem para adicionar uma resposta ao ticket.*",
            SupportReply => "💬 *Resposta do Suporte (Ticket #%s):*\n\n%s\n\n_Você pode responder diretamente a este chat para responder ao ticket._",
            UseNewTicket => "Para criar um novo ticket, use o comando /novoticket.\nPara ver seu ticket ativo, use o comando /meustickets.\nPara ver todos os comandos disponíveis, use /ajuda.",
            ErrorCreatingTicket => "❌ Ocorreu um erro ao criar o ticket. Por favor, tente novamente mais tarde.",
            SelectLanguage => "🌐 *Selecione seu idioma preferido:*",
            LanguageChanged => "✅ Seu idioma foi alterado para Português.",
            CloseTicketButton => "Fechar Ticket",
            ConfirmCloseTicket => "Tem certeza que deseja fechar este ticket? Esta ação não pode ser desfeita.",
            ConfirmButton => "✅ Sim, fechar",
            CancelButton => "❌ Cancelar",
            CloseCancelled => "❌ Operação cancelada. Seu ticket continua aberto.",
            AlreadyHasTicket => "Você já possui um ticket ativo. Por favor, continue a conversa nesse ticket ou feche-o antes de criar um novo.",
        }),
        Lang::Es => Some(match key {
            Welcome => "👋 ¡Hola, %s!\n\nBienvenido al bot de soporte. Puedes crear un nuevo ticket en cualquier momento usando el comando /nuevoticket.",
            Help => "📚 *Comandos disponibles:*\n\n• /start - Inicia el bot\n• /nuevoticket - Crea un nuevo ticket de soporte\n• /mistickets - Ver tu ticket activo\n• /ayuda - Muestra este mensaje de ayuda\n• /idioma - Cambia tu idioma preferido",
            NewTicketPrompt => "📝 Vamos a crear un nuevo ticket de soporte.\n\nPor favor, ingresa el asunto de tu ticket:",
            NoTickets => "No tienes tickets abiertos en este momento.",
            YourTickets => "🎫 *Tu ticket activo:*\n\n",
            TicketCreated => "✅ ¡Tu ticket ha sido creado con éxito!\n\n*Ticket #%s*\n*Asunto:* %s\n\nUn miembro de nuestro equipo de soporte responderá en breve. Recibirás una notificación aquí cuando haya una respuesta.\n\nPuedes simplemente responder a este chat para añadir más información a tu ticket.",
            MessageSent => "✅ ¡Tu mensaje ha sido enviado con éxito!",
            TicketNotFound => "❌ Ticket no encontrado o ya cerrado.",
            TicketClosed => "✅ Ticket #%s \"%s\" ha sido cerrado con éxito.",
            TicketClosedBySupport => "🔒 *Ticket #%s Cerrado*\n\nTu ticket \"%s\" ha sido cerrado por el equipo de soporte.",
            SubjectTooShort => "⚠️ El asunto debe tener entre 3 y 100 caracteres. Por favor, inténtalo de nuevo:",
            DescriptionTooShort => "⚠️ La descripción es demasiado corta. Por favor, proporciona más detalles:",
            EnterDescription => "👍 ¡Genial! Ahora, por favor, describe tu problema en detalle:",
            ReplyToMessage => "✏️ *Responde a este mensaje para añadir una respuesta al ticket.*",
            SupportReply => "💬 *Respuesta del Soporte (Ticket #%s):*\n\n%s\n\n_Puedes responder directamente a este chat para responder al ticket._",
            UseNewTicket => "Para crear un nuevo ticket, usa el comando /nuevoticket.\nPara ver tu ticket activo, usa el comando /mistickets.\nPara ver todos los comandos disponibles, usa /ayuda.",
            ErrorCreatingTicket => "❌ Ocurrió un error al crear el ticket. Por favor, inténtalo de nuevo más tarde.",
            SelectLanguage => "🌐 *Selecciona tu idioma preferido:*",
            LanguageChanged => "✅ Tu idioma ha sido cambiado a Español.",
            CloseTicketButton => "Cerrar Ticket",
            ConfirmCloseTicket => "¿Estás seguro de que quieres cerrar este ticket? Esta acción no se puede deshacer.",
            ConfirmButton => "✅ Sí, cerrar",
            CancelButton => "❌ Cancelar",
            CloseCancelled => "❌ Operación cancelada. Tu ticket sigue abierto.",
            AlreadyHasTicket => "Ya tienes un ticket activo. Por favor, continúa la conversación en ese ticket o ciérralo antes de crear uno nuevo.",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn lang_round_trips_through_strings() {
        for lang in [Lang::En, Lang::Pt, Lang::Es] {
            let s = lang.to_string();
            assert_eq!(Lang::from_str(&s).unwrap(), lang);
        }
        assert!(Lang::from_str("fr").is_err());
    }

    #[test]
    fn render_substitutes_in_order() {
        let s = render(MsgKey::TicketClosed, Lang::En, &["12345_1", "Login issue"]);
        assert!(s.contains("Ticket #12345_1"));
        assert!(s.contains("\"Login issue\""));
    }

    #[test]
    fn render_blanks_surplus_placeholders() {
        let s = render(MsgKey::TicketClosed, Lang::En, &["12345_1"]);
        assert!(!s.contains("%s"));
    }

    #[test]
    fn render_keeps_placeholder_lookalikes_in_arguments() {
        let s = render(MsgKey::TicketClosed, Lang::En, &["12345_1", "50%s off coupon"]);
        assert!(s.contains("\"50%s off coupon\""));
    }

    #[test]
    fn every_key_has_text_in_every_language() {
        use MsgKey::*;
        let keys = [
            Welcome, Help, NewTicketPrompt, NoTickets, YourTickets, TicketCreated,
            MessageSent, TicketNotFound, TicketClosed, TicketClosedBySupport,
            SubjectTooShort, DescriptionTooShort, EnterDescription, ReplyToMessage,
            SupportReply, UseNewTicket, ErrorCreatingTicket, SelectLanguage,
            LanguageChanged, CloseTicketButton, ConfirmCloseTicket, ConfirmButton,
            CancelButton, CloseCancelled, AlreadyHasTicket,
        ];
        for lang in [Lang::En, Lang::Pt, Lang::Es] {
            for key in keys {
                assert!(!text(key, lang).is_empty(), "{key:?}/{lang}");
            }
        }
    }

    #[test]
    fn localized_close_button() {
        assert_eq!(text(MsgKey::CloseTicketButton, Lang::Pt), "Fechar Ticket");
        assert_eq!(text(MsgKey::CloseTicketButton, Lang::Es), "Cerrar Ticket");
    }
}
