use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::write_text_atomic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum CharacterId {
    #[default]
    Estudiante,
    Matematico,
    Ingeniero,
    Cientifico,
    Genio,
    Robot,
}

impl CharacterId {
    pub(crate) const ALL: [CharacterId; 6] = [
        CharacterId::Estudiante,
        CharacterId::Matematico,
        CharacterId::Ingeniero,
        CharacterId::Cientifico,
        CharacterId::Genio,
        CharacterId::Robot,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CharacterId::Estudiante => "estudiante",
            CharacterId::Matematico => "matematico",
            CharacterId::Ingeniero => "ingeniero",
            CharacterId::Cientifico => "cientifico",
            CharacterId::Genio => "genio",
            CharacterId::Robot => "robot",
        }
    }

    pub(crate) fn display_name(self) -> &'static str {
        match self {
            CharacterId::Estudiante => "Estudiante Básico",
            CharacterId::Matematico => "Matemático",
            CharacterId::Ingeniero => "Ingeniero",
            CharacterId::Cientifico => "Científico",
            CharacterId::Genio => "Genio Matemático",
            CharacterId::Robot => "IA Calculator",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk shape. The id stays a string so an unknown value can be reported
/// and replaced instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Preferences {
    pub(crate) selected_character: String,
}

impl Preferences {
    fn for_character(character: CharacterId) -> Self {
        Self {
            selected_character: character.as_str().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum PreferenceError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to encode preferences: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub(crate) struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub(crate) fn in_dir(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(PREFERENCES_FILE_NAME),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no preference has been stored yet.
    pub(crate) fn load(&self) -> Result<Option<Preferences>, PreferenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PreferenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        parse_preferences_json(&raw)
            .map(Some)
            .map_err(|message| PreferenceError::Parse {
                path: self.path.clone(),
                message,
            })
    }

    pub(crate) fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(preferences).map_err(PreferenceError::Encode)?;
        write_text_atomic(&self.path, &json).map_err(|source| PreferenceError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn parse_preferences_json(raw: &str) -> Result<Preferences, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, Preferences>(&mut deserializer) {
        Ok(preferences) => Ok(preferences),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(source.to_string())
            } else {
                Err(format!("at {path}: {source}"))
            }
        }
    }
}

/// Picks the player character. A valid `override_id` wins and is stored;
/// otherwise the stored value is used. Anything unusable falls back to the
/// default. Never fails: a broken preference only costs a warning.
pub(crate) fn resolve_character(store: &PreferenceStore, override_id: Option<&str>) -> CharacterId {
    if let Some(raw) = override_id {
        match CharacterId::parse(raw) {
            Some(character) => {
                persist(store, character);
                info!(character = %character, source = "override", "character_selected");
                return character;
            }
            None => warn!(value = raw, "character_override_unknown_ignored"),
        }
    }

    match store.load() {
        Ok(Some(preferences)) => match CharacterId::parse(&preferences.selected_character) {
            Some(character) => {
                info!(character = %character, source = "stored", "character_selected");
                character
            }
            None => {
                let fallback = CharacterId::default();
                warn!(
                    value = preferences.selected_character.as_str(),
                    fallback = %fallback,
                    "stored_character_unknown_using_default"
                );
                fallback
            }
        },
        Ok(None) => {
            let character = CharacterId::default();
            persist(store, character);
            info!(character = %character, source = "default", "character_selected");
            character
        }
        Err(error) => {
            warn!(error = %error, "preferences_unreadable_using_default");
            CharacterId::default()
        }
    }
}

fn persist(store: &PreferenceStore, character: CharacterId) {
    if let Err(error) = store.save(&Preferences::for_character(character)) {
        warn!(error = %error, "preferences_save_failed");
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store(temp: &TempDir) -> PreferenceStore {
        PreferenceStore::in_dir(temp.path())
    }

    #[test]
    fn missing_file_selects_default_and_writes_it() {
        let temp = TempDir::new().expect("temp");
        let store = store(&temp);

        assert_eq!(resolve_character(&store, None), CharacterId::Estudiante);
        assert_eq!(
            store.load().expect("load"),
            Some(Preferences::for_character(CharacterId::Estudiante))
        );
    }

    #[test]
    fn stored_character_round_trips_through_disk() {
        let temp = TempDir::new().expect("temp");
        let store = store(&temp);
        store
            .save(&Preferences::for_character(CharacterId::Robot))
            .expect("save");

        assert_eq!(resolve_character(&store, None), CharacterId::Robot);
    }

    #[test]
    fn unknown_stored_id_falls_back_without_rewriting() {
        let temp = TempDir::new().expect("temp");
        let store = store(&temp);
        fs::write(store.path(), r#"{ "selected_character": "pirata" }"#).expect("write");

        assert_eq!(resolve_character(&store, None), CharacterId::Estudiante);
        let raw = fs::read_to_string(store.path()).expect("read");
        assert!(raw.contains("pirata"));
    }

    #[test]
    fn valid_override_wins_and_is_stored() {
        let temp = TempDir::new().expect("temp");
        let store = store(&temp);
        store
            .save(&Preferences::for_character(CharacterId::Genio))
            .expect("save");

        assert_eq!(
            resolve_character(&store, Some("Ingeniero")),
            CharacterId::Ingeniero
        );
        assert_eq!(resolve_character(&store, None), CharacterId::Ingeniero);
    }

    #[test]
    fn invalid_override_is_ignored() {
        let temp = TempDir::new().expect("temp");
        let store = store(&temp);
        store
            .save(&Preferences::for_character(CharacterId::Cientifico))
            .expect("save");

        assert_eq!(
            resolve_character(&store, Some("nadie")),
            CharacterId::Cientifico
        );
    }

    #[test]
    fn parse_error_reports_field_path() {
        let temp = TempDir::new().expect("temp");
        let store = store(&temp);
        fs::write(store.path(), r#"{ "selected_character": 7 }"#).expect("write");

        let error = store.load().expect_err("type mismatch");
        let message = error.to_string();
        assert!(message.contains("selected_character"), "{message}");
        assert_eq!(resolve_character(&store, None), CharacterId::Estudiante);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_preferences_json(r#"{ "selected_character": "robot", "volume": 3 }"#).is_err());
    }

    #[test]
    fn character_parse_is_case_insensitive() {
        assert_eq!(CharacterId::parse(" ROBOT "), Some(CharacterId::Robot));
        assert_eq!(CharacterId::parse(""), None);
        for id in CharacterId::ALL {
            assert_eq!(CharacterId::parse(id.as_str()), Some(id));
        }
    }
}
