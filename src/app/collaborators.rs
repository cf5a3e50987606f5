//! Verträge externer Kollaborateure (Datenzugriff, Export, Dialoge, Hinweise, Katalog).
//!
//! Der Koordinationskern kennt nur diese Traits; Implementierungen liefert der Host.

use crate::core::{
    Connection, ConnectionId, CustomLayer, ElementId, LayerCategory, MapElement, Measurement,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Datenzugriff auf Elemente und Verbindungen.
pub trait ElementRepository {
    /// Sucht ein Element per ID.
    fn element(&self, id: ElementId) -> Option<MapElement>;
    /// Sucht eine Verbindung per ID.
    fn connection(&self, id: ConnectionId) -> Option<Connection>;
    /// Legt eine Verbindung zwischen zwei vorhandenen Elementen an.
    fn create_connection(&self, source: ElementId, target: ElementId)
        -> anyhow::Result<Connection>;
    /// Aktualisiert ein vorhandenes Element.
    fn update_element(&self, element: MapElement) -> anyhow::Result<()>;
    /// Löscht ein Element samt anhängender Verbindungen.
    fn delete_element(&self, id: ElementId) -> anyhow::Result<()>;
    /// Volltextsuche über Elementnamen.
    fn search(&self, query: &str) -> Vec<MapElement>;
}

/// Zielformat eines Exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Rasterbild
    Png,
    /// Vektorgrafik
    Svg,
    /// Druckdokument
    Pdf,
    /// Rohdaten
    Json,
}

/// Serialisiert die gerenderte Szene samt Messungen.
pub trait SceneExporter {
    /// Exportiert und liefert den Namen des erzeugten Artefakts.
    fn export(&self, format: ExportFormat, measurements: &[Measurement]) -> anyhow::Result<String>;
}

/// Fragt den Benutzer nach einer Bestätigung.
pub trait ConfirmationPrompter {
    /// `true` = bestätigt.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Schweregrad eines Hinweises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Information
    Info,
    /// Erfolgreich abgeschlossen
    Success,
    /// Warnung
    Warning,
    /// Fehler
    Error,
}

/// Flüchtiger Hinweis für den Benutzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Schweregrad
    pub level: NotificationLevel,
    /// Anzeigetext
    pub message: String,
}

impl Notification {
    /// Information
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Erfolgsmeldung
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Warnung (Aktion nicht ausgeführt, aber kein Fehler)
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    /// Fehlermeldung
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Zeigt flüchtige Hinweise an (Toast, Statuszeile, …).
pub trait Notifier {
    /// Zeigt den Hinweis an.
    fn notify(&self, notification: Notification);
}

/// Liefert die aktuellen benutzerdefinierten Layer-Gruppen.
pub trait LayerCatalog {
    /// Aktuelle Gruppen in Anzeige-Reihenfolge.
    fn custom_layers(&self) -> anyhow::Result<Vec<CustomLayer>>;
}

/// Bündel aller Kollaborateure, die der Kontext verdrahtet.
#[derive(Clone)]
pub struct Collaborators {
    /// Datenzugriff
    pub elements: Rc<dyn ElementRepository>,
    /// Szenen-Export
    pub exporter: Rc<dyn SceneExporter>,
    /// Bestätigungsdialog
    pub prompter: Rc<dyn ConfirmationPrompter>,
    /// Hinweise
    pub notifier: Rc<dyn Notifier>,
    /// Layer-Katalog
    pub catalog: Rc<dyn LayerCatalog>,
}

/// Notifier, der Hinweise nur ins Log schreibt.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => log::error!("{}", notification.message),
            NotificationLevel::Warning => log::warn!("{}", notification.message),
            NotificationLevel::Info | NotificationLevel::Success => {
                log::info!("{}", notification.message)
            }
        }
    }
}

/// Fester Katalog (z.B. aus einer Projektdatei geladen).
#[derive(Debug, Default, Clone)]
pub struct StaticLayerCatalog {
    layers: Vec<CustomLayer>,
}

impl StaticLayerCatalog {
    /// Erstellt den Katalog.
    pub fn new(layers: Vec<CustomLayer>) -> Self {
        Self { layers }
    }
}

impl LayerCatalog for StaticLayerCatalog {
    fn custom_layers(&self) -> anyhow::Result<Vec<CustomLayer>> {
        Ok(self.layers.clone())
    }
}

/// Element-Datenhaltung im Speicher (für Offline-Sitzungen und Tests).
#[derive(Debug, Default)]
pub struct InMemoryElementRepository {
    elements: RefCell<BTreeMap<ElementId, MapElement>>,
    connections: RefCell<BTreeMap<ConnectionId, Connection>>,
    next_connection_id: Cell<ConnectionId>,
}

impl InMemoryElementRepository {
    /// Erstellt ein leeres Repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt ein Element ein (ersetzt gleiche ID).
    pub fn insert_element(&self, element: MapElement) {
        self.elements.borrow_mut().insert(element.id, element);
    }

    /// Anzahl gespeicherter Elemente.
    pub fn element_count(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Anzahl gespeicherter Verbindungen.
    pub fn connection_count(&self) -> usize {
        self.connections.borrow().len()
    }
}

/// Freileitungen (Mast beteiligt) laufen als Kabel, alles andere im Leerrohr.
fn connection_category(source: &MapElement, target: &MapElement) -> LayerCategory {
    if source.category == LayerCategory::Poles || target.category == LayerCategory::Poles {
        LayerCategory::Cables
    } else {
        LayerCategory::Ducts
    }
}

impl ElementRepository for InMemoryElementRepository {
    fn element(&self, id: ElementId) -> Option<MapElement> {
        self.elements.borrow().get(&id).cloned()
    }

    fn connection(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.borrow().get(&id).cloned()
    }

    fn create_connection(
        &self,
        source: ElementId,
        target: ElementId,
    ) -> anyhow::Result<Connection> {
        anyhow::ensure!(source != target, "Verbindung auf sich selbst ({source})");
        let source_element = self
            .element(source)
            .with_context(|| format!("Quell-Element {source} existiert nicht"))?;
        let target_element = self
            .element(target)
            .with_context(|| format!("Ziel-Element {target} existiert nicht"))?;

        let id = self.next_connection_id.get() + 1;
        self.next_connection_id.set(id);
        let connection = Connection::new(
            id,
            source,
            target,
            connection_category(&source_element, &target_element),
        );
        self.connections
            .borrow_mut()
            .insert(id, connection.clone());
        Ok(connection)
    }

    fn update_element(&self, element: MapElement) -> anyhow::Result<()> {
        let mut elements = self.elements.borrow_mut();
        let slot = elements
            .get_mut(&element.id)
            .with_context(|| format!("Element {} existiert nicht", element.id))?;
        *slot = element;
        Ok(())
    }

    fn delete_element(&self, id: ElementId) -> anyhow::Result<()> {
        self.elements
            .borrow_mut()
            .remove(&id)
            .with_context(|| format!("Element {id} existiert nicht"))?;
        self.connections
            .borrow_mut()
            .retain(|_, connection| !connection.touches(id));
        Ok(())
    }

    fn search(&self, query: &str) -> Vec<MapElement> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.elements
            .borrow()
            .values()
            .filter(|element| element.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
