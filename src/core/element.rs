//! Netzelemente und Verbindungen, wie sie die Datenzugriffsschicht liefert.

use super::geo::GeoPoint;
use super::layer::LayerCategory;
use serde::{Deserialize, Serialize};

/// ID eines Netzelements.
pub type ElementId = u64;
/// ID einer Verbindung.
pub type ConnectionId = u64;

/// Ein Element auf der Netzkarte (Schrank, Schacht, Gebäude, …)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapElement {
    /// Element-ID
    pub id: ElementId,
    /// Layer-Kategorie des Elements
    pub category: LayerCategory,
    /// Anzeigename
    pub name: String,
    /// Geografische Position
    pub position: GeoPoint,
}

impl MapElement {
    /// Erstellt ein neues Element
    pub fn new(
        id: ElementId,
        category: LayerCategory,
        name: impl Into<String>,
        position: GeoPoint,
    ) -> Self {
        Self {
            id,
            category,
            name: name.into(),
            position,
        }
    }
}

/// Eine Verbindung (Kabel, Trasse) zwischen zwei Elementen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Verbindungs-ID
    pub id: ConnectionId,
    /// Quell-Element
    pub source_id: ElementId,
    /// Ziel-Element
    pub target_id: ElementId,
    /// Layer-Kategorie (typischerweise `Cables` oder `Ducts`)
    pub category: LayerCategory,
}

impl Connection {
    /// Erstellt eine neue Verbindung
    pub fn new(
        id: ConnectionId,
        source_id: ElementId,
        target_id: ElementId,
        category: LayerCategory,
    ) -> Self {
        Self {
            id,
            source_id,
            target_id,
            category,
        }
    }

    /// Prüft, ob die Verbindung das Element berührt.
    pub fn touches(&self, element_id: ElementId) -> bool {
        self.source_id == element_id || self.target_id == element_id
    }
}

/// Vorschau eines Elements, das gerade platziert wird (noch nicht gespeichert).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementPreview {
    /// Kategorie des zu erstellenden Elements
    pub category: LayerCategory,
    /// Aktuelle Vorschau-Position
    pub position: GeoPoint,
}

/// Referenz auf eine Domänen-Entität (für Create/Update/Delete-Events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "camelCase")]
pub enum EntityRef {
    /// Netzelement
    Element(ElementId),
    /// Verbindung
    Connection(ConnectionId),
}
