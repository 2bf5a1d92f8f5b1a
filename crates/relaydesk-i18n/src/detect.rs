// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic language detection from short text samples.
//!
//! Scores a sample against per-language marker words and characteristic
//! characters. No model, no network. Samples shorter than three characters
//! or with no clear winner fall back to English.

use crate::Lang;

/// Minimum sample length before detection is attempted.
const MIN_SAMPLE_LEN: usize = 3;

/// Common Portuguese words unlikely to appear in English or Spanish text.
const PT_WORDS: &[&str] = &[
    "não", "você", "vocês", "está", "são", "obrigado", "obrigada", "olá",
    "também", "já", "meu", "minha", "fazer", "quero", "preciso", "ajuda",
    "consigo", "senha", "entrar", "ontem", "desde", "bom", "dia",
];

/// Common Spanish words unlikely to appear in English or Portuguese text.
const ES_WORDS: &[&str] = &[
    "hola", "gracias", "usted", "ustedes", "estás", "quiero", "necesito",
    "ayuda", "puedo", "contraseña", "ayer", "desde", "buenos", "días",
    "hacer", "tengo", "ningún", "también",
];

/// Characters strongly associated with one language.
const PT_CHARS: &[char] = &['ã', 'õ', 'ç'];
const ES_CHARS: &[char] = &['ñ', '¿', '¡'];

/// Infers the language of a short text sample, defaulting to English.
pub fn detect(text: &str) -> Lang {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_SAMPLE_LEN {
        return Lang::En;
    }

    let lower = trimmed.to_lowercase();
    let mut pt = 0u32;
    let mut es = 0u32;

    for word in lower.split(|c: char| !c.is_alphanumeric() && !is_marked(c)) {
        if word.is_empty() {
            continue;
        }
        if PT_WORDS.contains(&word) {
            pt += 1;
        }
        if ES_WORDS.contains(&word) {
            es += 1;
        }
    }

    // Characteristic characters are a stronger signal than shared vocabulary.
    pt += 2 * lower.chars().filter(|c| PT_CHARS.contains(c)).count() as u32;
    es += 2 * lower.chars().filter(|c| ES_CHARS.contains(c)).count() as u32;

    match pt.cmp(&es) {
        std::cmp::Ordering::Greater => Lang::Pt,
        std::cmp::Ordering::Less => Lang::Es,
        std::cmp::Ordering::Equal => Lang::En,
    }
}

fn is_marked(c: char) -> bool {
    PT_CHARS.contains(&c) || ES_CHARS.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_samples_default_to_english() {
        assert_eq!(detect(""), Lang::En);
        assert_eq!(detect("ok"), Lang::En);
    }

    #[test]
    fn detects_portuguese() {
        assert_eq!(detect("Olá, não consigo entrar desde ontem"), Lang::Pt);
        assert_eq!(detect("preciso de ajuda com a senha, obrigado"), Lang::Pt);
    }

    #[test]
    fn detects_spanish() {
        assert_eq!(detect("Hola, necesito ayuda con mi contraseña"), Lang::Es);
        assert_eq!(detect("¿puedo abrir un ticket?"), Lang::Es);
    }

    #[test]
    fn english_and_ambiguous_fall_back() {
        assert_eq!(detect("I cannot log in since yesterday"), Lang::En);
        assert_eq!(detect("desde"), Lang::En); // shared pt/es word, tie
    }
}
