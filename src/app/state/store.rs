//! StateStore: einzige schreibende Instanz des Anwendungszustands.

use super::app_state::{ApplicationState, EditorTool, Highlight};
use crate::app::collaborators::LayerCatalog;
use crate::app::error::EditorError;
use crate::app::history::{self, HistoryItem};
use crate::app::subscription::{Subscribers, Subscription};
use crate::core::{
    Connection, ConnectionId, CustomLayer, ElementId, ElementPreview, LayerCategory, MapElement,
};
use crate::shared::{EditorOptions, HISTORY_LIMIT};
use indexmap::IndexSet;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Besitzt den kanonischen Zustand und benachrichtigt Beobachter nach jeder Mutation.
///
/// Jede Mutation berechnet zuerst den vollständigen Folgezustand und sendet ihn
/// dann genau einmal an alle Beobachter (Registrierungsreihenfolge). Mutationen,
/// die ein Beobachter während einer Benachrichtigung auslöst, werden sofort
/// angewendet, aber erst nach Abschluss der laufenden Runde verteilt. Jeder
/// Beobachter sieht die Zustände damit in Erzeugungsreihenfolge.
pub struct StateStore {
    state: RefCell<Arc<ApplicationState>>,
    subscribers: Subscribers<ApplicationState>,
    pending: RefCell<VecDeque<Arc<ApplicationState>>>,
    broadcasting: Cell<bool>,
    torn_down: Cell<bool>,
    catalog: Rc<dyn LayerCatalog>,
    options: EditorOptions,
}

impl StateStore {
    /// Erstellt den Store mit Standardwerten und den Gruppen aus dem Katalog.
    pub fn new(options: &EditorOptions, catalog: Rc<dyn LayerCatalog>) -> Self {
        let custom_layers = load_custom_layers(catalog.as_ref());
        Self {
            state: RefCell::new(Arc::new(ApplicationState::with_defaults(
                options,
                custom_layers,
            ))),
            subscribers: Subscribers::new(),
            pending: RefCell::new(VecDeque::new()),
            broadcasting: Cell::new(false),
            torn_down: Cell::new(false),
            catalog,
            options: options.clone(),
        }
    }

    /// Synchroner Snapshot des aktuellen Zustands.
    pub fn get(&self) -> Arc<ApplicationState> {
        Arc::clone(&self.state.borrow())
    }

    /// Registriert einen Beobachter für alle folgenden Zustandsänderungen.
    pub fn subscribe(&self, observer: impl FnMut(&ApplicationState) + 'static) -> Subscription {
        self.subscribers.subscribe(observer)
    }

    /// Abgeleiteter Stream: liefert sofort den aktuellen Wert und danach nur
    /// noch Änderungen des selektierten Werts.
    pub fn select<T, S, F>(&self, selector: S, mut observer: F) -> Subscription
    where
        T: PartialEq + 'static,
        S: Fn(&ApplicationState) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let initial = selector(&self.get());
        observer(&initial);
        let mut last = initial;
        self.subscribers.subscribe(move |state| {
            let next = selector(state);
            if next != last {
                observer(&next);
                last = next;
            }
        })
    }

    /// Anzahl registrierter Beobachter.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Gibt `true` zurück, sobald `teardown()` aufgerufen wurde.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// Zoomgrenzen und Defaults, mit denen der Store arbeitet.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    // ── Selektion ───────────────────────────────────────────────────

    /// Setzt (oder leert) das selektierte Element.
    pub fn set_selected_element(&self, element: Option<MapElement>) -> Result<(), EditorError> {
        self.update("set_selected_element", |state| {
            state.primary = match &element {
                Some(_) => Some(Highlight::Element),
                None => state.primary.filter(|p| *p == Highlight::Connection),
            };
            state.selected_element = element.map(Arc::new);
        })
    }

    /// Setzt (oder leert) die selektierte Verbindung.
    pub fn set_selected_connection(
        &self,
        connection: Option<Connection>,
    ) -> Result<(), EditorError> {
        self.update("set_selected_connection", |state| {
            state.primary = match &connection {
                Some(_) => Some(Highlight::Connection),
                None => state.primary.filter(|p| *p == Highlight::Element),
            };
            state.selected_connection = connection.map(Arc::new);
        })
    }

    /// Hebt jede Selektion auf.
    pub fn clear_selection(&self) -> Result<(), EditorError> {
        self.update("clear_selection", |state| {
            state.selected_element = None;
            state.selected_connection = None;
            state.primary = None;
        })
    }

    // ── Layer ───────────────────────────────────────────────────────

    /// Entfernt die Kategorie, falls aktiv, sonst wird sie aktiviert.
    ///
    /// Die Kategorie muss vom Aufrufer bereits validiert sein.
    pub fn toggle_layer(&self, category: LayerCategory) -> Result<(), EditorError> {
        self.update("toggle_layer", |state| {
            let layers = Arc::make_mut(&mut state.active_layers);
            if !layers.shift_remove(&category) {
                layers.insert(category);
            }
        })
    }

    /// Ersetzt die Menge aktiver Kategorien.
    pub fn update_active_layers(
        &self,
        layers: impl IntoIterator<Item = LayerCategory>,
    ) -> Result<(), EditorError> {
        let layers: IndexSet<LayerCategory> = layers.into_iter().collect();
        self.update("update_active_layers", |state| {
            state.active_layers = Arc::new(layers);
        })
    }

    /// Ersetzt die Katalog-Gruppen; aktive Gruppen ohne Katalogeintrag fallen weg.
    pub fn set_custom_layers(&self, custom_layers: Vec<CustomLayer>) -> Result<(), EditorError> {
        self.update("set_custom_layers", |state| {
            state.custom_layers = Arc::new(custom_layers);
            prune_active_custom_layers(state);
        })
    }

    /// Schaltet eine benutzerdefinierte Gruppe um.
    ///
    /// Unbekannte Gruppen-IDs werden ignoriert (kein Broadcast).
    pub fn toggle_custom_layer(&self, id: &str) -> Result<(), EditorError> {
        if !self.get().has_custom_layer(id) {
            log::warn!("Unbekannte Layer-Gruppe '{}' ignoriert", id);
            return self.ensure_alive("toggle_custom_layer");
        }
        self.update("toggle_custom_layer", |state| {
            let active = Arc::make_mut(&mut state.active_custom_layers);
            if !active.shift_remove(id) {
                active.insert(id.to_string());
            }
        })
    }

    // ── Darstellung ─────────────────────────────────────────────────

    /// Setzt das Farbschema.
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), EditorError> {
        self.update("set_dark_mode", |state| state.is_dark_mode = enabled)
    }

    /// Schaltet das Farbschema um.
    pub fn toggle_dark_mode(&self) -> Result<(), EditorError> {
        self.update("toggle_dark_mode", |state| {
            state.is_dark_mode = !state.is_dark_mode
        })
    }

    /// Wechselt das aktive Werkzeug.
    pub fn set_current_tool(&self, tool: EditorTool) -> Result<(), EditorError> {
        self.update("set_current_tool", |state| state.current_tool = tool)
    }

    /// Setzt die Zoomstufe (begrenzt auf den konfigurierten Bereich).
    pub fn set_zoom_level(&self, zoom_level: f64) -> Result<(), EditorError> {
        let clamped = self.options.clamp_zoom(zoom_level);
        if clamped != zoom_level {
            log::debug!("Zoomstufe {} auf {} begrenzt", zoom_level, clamped);
        }
        self.update("set_zoom_level", |state| state.zoom_level = clamped)
    }

    /// Blendet das Such-Widget ein/aus. Beim Ausblenden werden Treffer verworfen.
    pub fn toggle_search_widget(&self) -> Result<(), EditorError> {
        self.update("toggle_search_widget", |state| {
            state.search_widget_visible = !state.search_widget_visible;
            if !state.search_widget_visible {
                state.search_results = Arc::new(Vec::new());
            }
        })
    }

    /// Blendet das Elemente-Panel ein/aus.
    pub fn toggle_elements_panel(&self) -> Result<(), EditorError> {
        self.update("toggle_elements_panel", |state| {
            state.elements_panel_visible = !state.elements_panel_visible
        })
    }

    // ── Daten ───────────────────────────────────────────────────────

    /// Markiert ungespeicherte Änderungen.
    pub fn set_unsaved_changes(&self, dirty: bool) -> Result<(), EditorError> {
        self.update("set_unsaved_changes", |state| {
            state.has_unsaved_changes = dirty
        })
    }

    /// Ersetzt die geladenen Verbindungen.
    pub fn set_connections(&self, connections: Vec<Connection>) -> Result<(), EditorError> {
        self.update("set_connections", |state| {
            state.connections = Arc::new(connections);
        })
    }

    /// Fügt eine Verbindung hinzu (ersetzt eine vorhandene mit gleicher ID).
    pub fn add_connection(&self, connection: Connection) -> Result<(), EditorError> {
        self.update("add_connection", |state| {
            let connections = Arc::make_mut(&mut state.connections);
            connections.retain(|existing| existing.id != connection.id);
            connections.push(connection);
        })
    }

    /// Entfernt eine Verbindung; eine darauf zeigende Selektion wird aufgehoben.
    pub fn remove_connection(&self, id: ConnectionId) -> Result<(), EditorError> {
        self.update("remove_connection", |state| {
            if state.connections.iter().any(|c| c.id == id) {
                Arc::make_mut(&mut state.connections).retain(|c| c.id != id);
            }
            if state.selected_connection.as_ref().is_some_and(|c| c.id == id) {
                state.selected_connection = None;
            }
        })
    }

    /// Entfernt alle Referenzen auf ein gelöschtes Element (Selektion, Verbindungen, Treffer).
    pub fn remove_element(&self, id: ElementId) -> Result<(), EditorError> {
        self.update("remove_element", |state| {
            if state.selected_element.as_ref().is_some_and(|e| e.id == id) {
                state.selected_element = None;
            }
            if state.connections.iter().any(|c| c.touches(id)) {
                Arc::make_mut(&mut state.connections).retain(|c| !c.touches(id));
            }
            if state
                .selected_connection
                .as_ref()
                .is_some_and(|c| c.touches(id))
            {
                state.selected_connection = None;
            }
            if state.search_results.iter().any(|e| e.id == id) {
                Arc::make_mut(&mut state.search_results).retain(|e| e.id != id);
            }
            state.has_unsaved_changes = true;
        })
    }

    /// Setzt die Suchtreffer.
    pub fn set_search_results(&self, results: Vec<MapElement>) -> Result<(), EditorError> {
        self.update("set_search_results", |state| {
            state.search_results = Arc::new(results);
        })
    }

    /// Setzt (oder leert) die Element-Vorschau.
    pub fn set_element_preview(&self, preview: Option<ElementPreview>) -> Result<(), EditorError> {
        self.update("set_element_preview", |state| {
            state.element_preview = preview
        })
    }

    // ── Verlauf ─────────────────────────────────────────────────────

    /// Hängt einen Eintrag an; bei mehr als `HISTORY_LIMIT` fällt der älteste weg.
    pub fn add_to_history(&self, item: HistoryItem) -> Result<(), EditorError> {
        self.update("add_to_history", |state| {
            history::push_bounded(Arc::make_mut(&mut state.history_items), item, HISTORY_LIMIT);
        })
    }

    /// Leert den Aktionsverlauf.
    pub fn clear_history(&self) -> Result<(), EditorError> {
        self.update("clear_history", |state| {
            state.history_items = Arc::new(VecDeque::new());
        })
    }

    // ── Lebenszyklus ────────────────────────────────────────────────

    /// Stellt die Standardwerte wieder her und lädt die Gruppen neu aus dem Katalog.
    pub fn reset_state(&self) -> Result<(), EditorError> {
        self.ensure_alive("reset_state")?;
        let custom_layers = load_custom_layers(self.catalog.as_ref());
        let options = &self.options;
        self.update("reset_state", |state| {
            *state = ApplicationState::with_defaults(options, custom_layers);
        })
    }

    /// Beendet den Store: alle Beobachter werden abgemeldet, weitere Mutationen
    /// schlagen mit `StateConflict` fehl.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.subscribers.clear();
        self.pending.borrow_mut().clear();
        log::info!("StateStore beendet");
    }

    fn ensure_alive(&self, operation: &'static str) -> Result<(), EditorError> {
        if self.torn_down.get() {
            log::warn!("Mutation '{}' nach Teardown abgelehnt", operation);
            return Err(EditorError::StateConflict { operation });
        }
        Ok(())
    }

    fn update(
        &self,
        operation: &'static str,
        mutate: impl FnOnce(&mut ApplicationState),
    ) -> Result<(), EditorError> {
        self.ensure_alive(operation)?;
        let mut next = ApplicationState::clone(&self.state.borrow());
        mutate(&mut next);
        log::trace!("State-Mutation: {}", operation);
        self.commit(Arc::new(next));
        Ok(())
    }

    fn commit(&self, next: Arc<ApplicationState>) {
        *self.state.borrow_mut() = Arc::clone(&next);
        self.pending.borrow_mut().push_back(next);

        if self.broadcasting.replace(true) {
            // Verteilung übernimmt die bereits laufende Runde
            return;
        }
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(state) = next else { break };
            self.subscribers.notify(&state);
        }
        self.broadcasting.set(false);
    }
}

fn load_custom_layers(catalog: &dyn LayerCatalog) -> Vec<CustomLayer> {
    match catalog.custom_layers() {
        Ok(layers) => layers,
        Err(e) => {
            log::error!("Layer-Katalog nicht verfügbar, keine Gruppen geladen: {:#}", e);
            Vec::new()
        }
    }
}

fn prune_active_custom_layers(state: &mut ApplicationState) {
    let known: IndexSet<&str> = state
        .custom_layers
        .iter()
        .map(|layer| layer.id.as_str())
        .collect();
    if state
        .active_custom_layers
        .iter()
        .all(|id| known.contains(id.as_str()))
    {
        return;
    }
    let pruned: IndexSet<String> = state
        .active_custom_layers
        .iter()
        .filter(|id| known.contains(id.as_str()))
        .cloned()
        .collect();
    state.active_custom_layers = Arc::new(pruned);
}
