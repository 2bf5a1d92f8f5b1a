// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user language preferences, persisted as a flat JSON map.

use std::collections::HashMap;

use tracing::info;

use relaydesk_core::types::UserId;
use relaydesk_i18n::Lang;

use crate::persist::JsonFile;

/// User id to language map with write-through persistence. Users without an
/// entry get [`Lang::En`].
#[derive(Debug)]
pub struct LanguageStore {
    languages: HashMap<String, Lang>,
    file: JsonFile,
}

impl LanguageStore {
    pub fn open(file: JsonFile) -> Result<Self, relaydesk_core::BridgeError> {
        let languages: HashMap<String, Lang> = file.load()?;
        info!(
            users = languages.len(),
            path = %file.path().display(),
            "loaded language preferences"
        );
        Ok(Self { languages, file })
    }

    pub fn get(&self, user_id: &UserId) -> Lang {
        self.languages.get(&user_id.0).copied().unwrap_or_default()
    }

    /// True when the user has explicitly (or by detection) been assigned a
    /// language. Used to avoid re-detecting on every message.
    pub fn has(&self, user_id: &UserId) -> bool {
        self.languages.contains_key(&user_id.0)
    }

    pub fn set(&mut self, user_id: &UserId, lang: Lang) {
        self.languages.insert(user_id.0.clone(), lang);
        self.file.save_logged(&self.languages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_defaults_to_english() {
        let dir = tempfile::tempdir().unwrap();
        let store = LanguageStore::open(JsonFile::new(dir.path().join("langs.json"))).unwrap();
        assert_eq!(store.get(&UserId("1".into())), Lang::En);
        assert!(!store.has(&UserId("1".into())));
    }

    #[test]
    fn preference_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langs.json");
        let user = UserId("42".into());

        {
            let mut store = LanguageStore::open(JsonFile::new(&path)).unwrap();
            store.set(&user, Lang::Pt);
        }

        let store = LanguageStore::open(JsonFile::new(&path)).unwrap();
        assert_eq!(store.get(&user), Lang::Pt);
        assert!(store.has(&user));
    }
}
