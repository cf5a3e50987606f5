use crate::app::history::HistoryItem;
use crate::core::{Connection, CustomLayer, ElementPreview, LayerCategory, MapElement};
use crate::shared::EditorOptions;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Aktives Editor-Werkzeug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorTool {
    /// Standard: Elemente selektieren
    #[default]
    Select,
    /// Karte verschieben
    Pan,
    /// Neue Elemente platzieren
    AddElement,
    /// Verbindungen zwischen Elementen ziehen
    Connect,
    /// Distanzen messen
    Measure,
}

/// Welche Selektion gerade primär hervorgehoben wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Das selektierte Element
    Element,
    /// Die selektierte Verbindung
    Connection,
}

/// Kanonischer, geteilter UI-Zustand.
///
/// Collections liegen hinter `Arc`, damit ein neuer Zustand unveränderte Felder
/// teilt (Structural Sharing); geändert wird per `Arc::make_mut`.
#[derive(Debug, Clone)]
pub struct ApplicationState {
    /// Selektiertes Element
    pub selected_element: Option<Arc<MapElement>>,
    /// Selektierte Verbindung
    pub selected_connection: Option<Arc<Connection>>,
    pub(crate) primary: Option<Highlight>,
    /// Aktive Layer-Kategorien (Reihenfolge = Aktivierungsreihenfolge)
    pub active_layers: Arc<IndexSet<LayerCategory>>,
    /// Benutzerdefinierte Layer-Gruppen aus dem Katalog
    pub custom_layers: Arc<Vec<CustomLayer>>,
    /// IDs der aktiven Gruppen (immer Teilmenge von `custom_layers`)
    pub active_custom_layers: Arc<IndexSet<String>>,
    /// Dunkles Farbschema
    pub is_dark_mode: bool,
    /// Aktives Werkzeug
    pub current_tool: EditorTool,
    /// Zoomstufe (innerhalb des konfigurierten Bereichs)
    pub zoom_level: f64,
    /// Ungespeicherte Änderungen vorhanden
    pub has_unsaved_changes: bool,
    /// Geladene Verbindungen
    pub connections: Arc<Vec<Connection>>,
    /// Aktionsverlauf (höchstens `HISTORY_LIMIT` Einträge)
    pub history_items: Arc<VecDeque<HistoryItem>>,
    /// Treffer der letzten Suche
    pub search_results: Arc<Vec<MapElement>>,
    /// Vorschau eines zu platzierenden Elements
    pub element_preview: Option<ElementPreview>,
    /// Such-Widget sichtbar
    pub search_widget_visible: bool,
    /// Elemente-Panel sichtbar
    pub elements_panel_visible: bool,
}

impl ApplicationState {
    /// Erstellt den Standardzustand mit den gegebenen Katalog-Gruppen.
    pub fn with_defaults(options: &EditorOptions, custom_layers: Vec<CustomLayer>) -> Self {
        Self {
            selected_element: None,
            selected_connection: None,
            primary: None,
            active_layers: Arc::new(options.default_layers.iter().copied().collect()),
            custom_layers: Arc::new(custom_layers),
            active_custom_layers: Arc::new(IndexSet::new()),
            is_dark_mode: false,
            current_tool: EditorTool::Select,
            zoom_level: options.zoom_level_default,
            has_unsaved_changes: false,
            connections: Arc::new(Vec::new()),
            history_items: Arc::new(VecDeque::new()),
            search_results: Arc::new(Vec::new()),
            element_preview: None,
            search_widget_visible: false,
            elements_panel_visible: false,
        }
    }

    /// Liefert die primäre Hervorhebung.
    ///
    /// Sind Element und Verbindung gleichzeitig selektiert, gewinnt die zuletzt
    /// gesetzte Selektion. Ist diese inzwischen leer, fällt die Hervorhebung
    /// auf die jeweils andere zurück.
    pub fn primary_highlight(&self) -> Option<Highlight> {
        let has = |highlight: Highlight| match highlight {
            Highlight::Element => self.selected_element.is_some(),
            Highlight::Connection => self.selected_connection.is_some(),
        };
        match self.primary {
            Some(highlight) if has(highlight) => Some(highlight),
            _ if self.selected_element.is_some() => Some(Highlight::Element),
            _ if self.selected_connection.is_some() => Some(Highlight::Connection),
            _ => None,
        }
    }

    /// Prüft, ob eine Kategorie aktiv ist.
    pub fn is_layer_active(&self, category: LayerCategory) -> bool {
        self.active_layers.contains(&category)
    }

    /// Prüft, ob eine benutzerdefinierte Gruppe aktiv ist.
    pub fn is_custom_layer_active(&self, id: &str) -> bool {
        self.active_custom_layers.contains(id)
    }

    /// Prüft, ob eine Gruppe mit dieser ID im Katalog existiert.
    pub fn has_custom_layer(&self, id: &str) -> bool {
        self.custom_layers.iter().any(|layer| layer.id == id)
    }
}
