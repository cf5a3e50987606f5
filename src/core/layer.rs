//! Layer-Kategorien und benutzerdefinierte Layer-Gruppen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kategorie von Netzelementen, die als Layer ein- und ausgeblendet werden kann.
///
/// Die Menge aller Varianten ist die Live-Aufzählung, gegen die persistierte
/// Layer-Präferenzen validiert werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerCategory {
    /// Gebäude / Hausanschlüsse
    Buildings,
    /// Verteiler- und Netzschränke
    Cabinets,
    /// Schächte
    Manholes,
    /// Masten (Freileitung)
    Poles,
    /// Optische Splitter
    Splitters,
    /// Kabel
    Cables,
    /// Leerrohre / Trassen
    Ducts,
    /// Endkunden
    Customers,
}

impl LayerCategory {
    /// Alle bekannten Kategorien in Anzeige-Reihenfolge.
    pub const ALL: [LayerCategory; 8] = [
        LayerCategory::Buildings,
        LayerCategory::Cabinets,
        LayerCategory::Manholes,
        LayerCategory::Poles,
        LayerCategory::Splitters,
        LayerCategory::Cables,
        LayerCategory::Ducts,
        LayerCategory::Customers,
    ];

    /// Standard-Auswahl aktiver Layer beim ersten Start.
    pub const DEFAULT_ACTIVE: [LayerCategory; 3] = [
        LayerCategory::Buildings,
        LayerCategory::Cabinets,
        LayerCategory::Cables,
    ];

    /// Stabiler String-Bezeichner (identisch zur Serde-Darstellung).
    pub fn as_str(self) -> &'static str {
        match self {
            LayerCategory::Buildings => "buildings",
            LayerCategory::Cabinets => "cabinets",
            LayerCategory::Manholes => "manholes",
            LayerCategory::Poles => "poles",
            LayerCategory::Splitters => "splitters",
            LayerCategory::Cables => "cables",
            LayerCategory::Ducts => "ducts",
            LayerCategory::Customers => "customers",
        }
    }

    /// Löst einen Bezeichner auf. Unbekannte Bezeichner liefern `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == id)
    }
}

impl fmt::Display for LayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benutzerdefinierte Layer-Gruppe aus dem Layer-Katalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLayer {
    /// Eindeutige Gruppen-ID
    pub id: String,
    /// Anzeigename
    pub name: String,
    /// Zugeordnete Element-IDs
    #[serde(default)]
    pub element_ids: Vec<u64>,
}

impl CustomLayer {
    /// Erstellt eine leere Gruppe.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            element_ids: Vec::new(),
        }
    }
}

/// Referenz auf einen Layer: feste Kategorie oder benutzerdefinierte Gruppe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum LayerRef {
    /// Feste Kategorie
    Category(LayerCategory),
    /// Benutzerdefinierte Gruppe (ID aus dem Katalog)
    Custom(String),
}
