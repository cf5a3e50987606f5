//! Fehler-Taxonomie des Koordinationskerns.

use thiserror::Error;

/// Fehler, die an den Grenzen der Manager entstehen.
///
/// Validierungs- und Persistenzfehler werden vom besitzenden Manager geloggt und
/// auf einen sicheren Zustand zurückgeführt; sie unterbrechen den Aufrufer nicht.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    /// Ungültige Layer-/Kategorie-ID oder fehlerhafter Messpunkt
    #[error("Validierung fehlgeschlagen: {0}")]
    Validation(String),
    /// Lese- oder Schreibfehler des dauerhaften Speichers
    #[error("Persistenz fehlgeschlagen ({key}): {message}")]
    Persistence {
        /// Betroffener Speicher-Schlüssel
        key: String,
        /// Ursache
        message: String,
    },
    /// Referenz auf ein nicht vorhandenes Element bzw. eine Verbindung
    #[error("{entity} {id} nicht gefunden")]
    NotFound {
        /// Art der Entität ("Element", "Verbindung")
        entity: &'static str,
        /// Gesuchte ID
        id: u64,
    },
    /// Mutation nach dem Teardown des Kontexts
    #[error("Mutation '{operation}' nach Teardown abgelehnt")]
    StateConflict {
        /// Name der abgelehnten Operation
        operation: &'static str,
    },
}

impl EditorError {
    /// Erstellt einen Persistenzfehler aus einer beliebigen Ursache.
    pub fn persistence(key: &str, cause: impl std::fmt::Display) -> Self {
        Self::Persistence {
            key: key.to_string(),
            message: cause.to_string(),
        }
    }
}
