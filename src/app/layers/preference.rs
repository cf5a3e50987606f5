//! Dauerhafter Layer-Präferenz-Datensatz und Key-Value-Speicher.

use crate::app::error::EditorError;
use crate::core::LayerCategory;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Schlüssel des Layer-Präferenz-Datensatzes.
pub const LAYER_PREFERENCE_KEY: &str = "layer_preferences";

/// Persistierte Auswahl aktiver Layer.
///
/// JSON-Form: `{"activeLayerIds":["buildings",…],"lastUpdated":1700000000000}`.
/// Die IDs bleiben Rohstrings, damit veraltete Einträge einzeln verworfen
/// werden können statt den ganzen Datensatz zu verlieren.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPreference {
    /// Aktive Layer-IDs in Aktivierungsreihenfolge
    pub active_layer_ids: Vec<String>,
    /// Zeitpunkt der letzten Änderung (Unix-Millisekunden)
    pub last_updated: u64,
}

impl LayerPreference {
    /// Erstellt einen Datensatz aus validierten Kategorien.
    pub fn from_layers<'a>(
        layers: impl IntoIterator<Item = &'a LayerCategory>,
        last_updated: u64,
    ) -> Self {
        Self {
            active_layer_ids: layers.into_iter().map(|c| c.as_str().to_string()).collect(),
            last_updated,
        }
    }

    /// Parst den JSON-Datensatz. Fehlerhafte oder schemafremde Daten sind ein
    /// Persistenzfehler.
    pub fn parse(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(|e| EditorError::persistence(LAYER_PREFERENCE_KEY, e))
    }

    /// Serialisiert den Datensatz als JSON.
    pub fn to_json(&self) -> Result<String, EditorError> {
        serde_json::to_string(self).map_err(|e| EditorError::persistence(LAYER_PREFERENCE_KEY, e))
    }
}

/// Dauerhafter Key-Value-Speicher für Präferenzen.
pub trait PreferenceStorage {
    /// Liest den Wert zu `key`; `Ok(None)` wenn nicht vorhanden.
    fn read(&self, key: &str) -> Result<Option<String>, EditorError>;
    /// Schreibt (ersetzt) den Wert zu `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), EditorError>;
}

/// Speichert jeden Schlüssel als `<key>.json` in einem Verzeichnis.
#[derive(Debug, Clone)]
pub struct FilePreferenceStorage {
    dir: PathBuf,
}

impl FilePreferenceStorage {
    /// Erstellt den Speicher; das Verzeichnis wird beim ersten Schreiben angelegt.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Pfad der Datei zu `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PreferenceStorage for FilePreferenceStorage {
    fn read(&self, key: &str) -> Result<Option<String>, EditorError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditorError::persistence(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), EditorError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| EditorError::persistence(key, e))?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| EditorError::persistence(key, e))?;
        log::debug!("Präferenz '{}' gespeichert nach: {}", key, path.display());
        Ok(())
    }
}

/// Flüchtiger Speicher (Tests, Sitzungen ohne Profil).
///
/// Klone teilen denselben Inhalt, damit ein Neustart simuliert werden kann.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStorage {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryPreferenceStorage {
    /// Erstellt einen leeren Speicher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Liest den Rohwert zu `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Setzt den Rohwert zu `key` direkt (z.B. beschädigte Daten im Test).
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.values.borrow_mut().insert(key.to_string(), value.into());
    }
}

impl PreferenceStorage for MemoryPreferenceStorage {
    fn read(&self, key: &str) -> Result<Option<String>, EditorError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), EditorError> {
        self.insert(key, value);
        Ok(())
    }
}
