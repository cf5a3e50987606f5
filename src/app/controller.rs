//! Application Controller für zentrale Event-Verarbeitung.

use super::context::EditorContext;
use super::error::EditorError;
use super::history::HistoryItem;
use super::state::{ApplicationState, EditorTool};
use super::subscription::Subscription;
use super::{AppCommand, AppIntent};
use crate::core::{Connection, EntityRef, LayerCategory, MapElement};
use indexmap::IndexSet;
use std::rc::Rc;
use std::sync::Arc;

/// Fassade für UI-Komponenten: abgeleitete Streams lesen, Commands ausführen.
///
/// Besitzt keinen eigenen Zustand; alles liegt im geteilten [`EditorContext`].
#[derive(Clone)]
pub struct AppController {
    context: Rc<EditorContext>,
}

impl AppController {
    /// Erstellt einen neuen Controller.
    pub fn new(context: Rc<EditorContext>) -> Self {
        Self { context }
    }

    /// Geteilter Kontext.
    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    /// Synchroner Snapshot des aktuellen Zustands.
    pub fn state(&self) -> Arc<ApplicationState> {
        self.context.store.get()
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    pub fn handle_intent(&self, intent: AppIntent) -> Result<(), EditorError> {
        let commands = super::intent_mapping::map_intent_to_commands(&self.state(), intent);
        for command in commands {
            self.handle_command(command)?;
        }

        Ok(())
    }

    /// Führt mutierende Commands aus.
    /// Dispatcht an Feature-Handler in `handlers/`.
    pub fn handle_command(&self, command: AppCommand) -> Result<(), EditorError> {
        use super::handlers;

        let ctx = self.context.as_ref();
        let recorded = command.is_recorded().then(|| history_item(&command));
        log::debug!("Command: {:?}", command);

        match command {
            // === Selektion ===
            AppCommand::SelectElement { element_id } => {
                handlers::selection::select_element(ctx, element_id)?
            }
            AppCommand::SelectConnection { connection_id } => {
                handlers::selection::select_connection(ctx, connection_id)?
            }
            AppCommand::ClearSelection => handlers::selection::clear(ctx)?,

            // === Layer ===
            AppCommand::ToggleLayer { layer_id } => handlers::layers::toggle(ctx, &layer_id)?,
            AppCommand::ActivateLayers { layer_ids } => {
                handlers::layers::activate(ctx, &layer_ids)?
            }
            AppCommand::DeactivateLayers { layer_ids } => {
                handlers::layers::deactivate(ctx, &layer_ids)?
            }
            AppCommand::ResetLayers => handlers::layers::reset(ctx)?,
            AppCommand::ToggleCustomLayer { group_id } => {
                handlers::layers::toggle_custom(ctx, &group_id)?
            }

            // === Ansicht & Werkzeug ===
            AppCommand::SetZoomLevel { zoom_level } => {
                handlers::view::set_zoom_level(ctx, zoom_level)?
            }
            AppCommand::ZoomIn => handlers::view::zoom_in(ctx)?,
            AppCommand::ZoomOut => handlers::view::zoom_out(ctx)?,
            AppCommand::SetCurrentTool { tool } => handlers::view::set_current_tool(ctx, tool)?,
            AppCommand::ToggleDarkMode => handlers::view::toggle_dark_mode(ctx)?,

            // === Messung ===
            AppCommand::StartMeasurement => handlers::measurement::start(ctx)?,
            AppCommand::AddMeasurementPoint { point } => {
                handlers::measurement::add_point(ctx, point)
            }
            AppCommand::CompleteMeasurement => handlers::measurement::complete(ctx)?,
            AppCommand::ClearMeasurements => handlers::measurement::clear(ctx),
            AppCommand::ExportMeasurements { format } => {
                handlers::measurement::export(ctx, format)
            }

            // === Bearbeitung ===
            AppCommand::CreateConnection { source, target } => {
                handlers::editing::create_connection(ctx, source, target)?
            }
            AppCommand::DeleteElement { element_id } => {
                handlers::editing::delete_element(ctx, element_id)?
            }
            AppCommand::SearchElements { query } => handlers::editing::search(ctx, &query)?,

            // === Panels & Anwendungssteuerung ===
            AppCommand::ToggleSearchWidget => handlers::panels::toggle_search_widget(ctx)?,
            AppCommand::ToggleElementsPanel => handlers::panels::toggle_elements_panel(ctx)?,
            AppCommand::ResetState => handlers::panels::reset_state(ctx)?,
        }

        if let Some(item) = recorded {
            ctx.store.add_to_history(item)?;
        }
        Ok(())
    }

    /// Ein Tick der Frame-Schleife (Performance-Messung, Layer-Persistenz).
    pub fn on_frame(&self, now_ms: f64) {
        self.context.on_frame(now_ms);
    }

    // ── Abgeleitete Streams ─────────────────────────────────────────

    /// Selektiertes Element (sofort und bei jeder Änderung).
    pub fn watch_selected_element(
        &self,
        observer: impl FnMut(&Option<Arc<MapElement>>) + 'static,
    ) -> Subscription {
        self.context
            .store
            .select(|state| state.selected_element.clone(), observer)
    }

    /// Selektierte Verbindung.
    pub fn watch_selected_connection(
        &self,
        observer: impl FnMut(&Option<Arc<Connection>>) + 'static,
    ) -> Subscription {
        self.context
            .store
            .select(|state| state.selected_connection.clone(), observer)
    }

    /// Menge aktiver Kategorien (Reihenfolge ist für Änderungen irrelevant).
    pub fn watch_active_layers(
        &self,
        observer: impl FnMut(&Arc<IndexSet<LayerCategory>>) + 'static,
    ) -> Subscription {
        self.context
            .store
            .select(|state| Arc::clone(&state.active_layers), observer)
    }

    /// Zoomstufe.
    pub fn watch_zoom_level(&self, observer: impl FnMut(&f64) + 'static) -> Subscription {
        self.context.store.select(|state| state.zoom_level, observer)
    }

    /// Farbschema.
    pub fn watch_dark_mode(&self, observer: impl FnMut(&bool) + 'static) -> Subscription {
        self.context.store.select(|state| state.is_dark_mode, observer)
    }

    /// Aktives Werkzeug.
    pub fn watch_current_tool(
        &self,
        observer: impl FnMut(&EditorTool) + 'static,
    ) -> Subscription {
        self.context
            .store
            .select(|state| state.current_tool, observer)
    }
}

fn history_item(command: &AppCommand) -> HistoryItem {
    let item = HistoryItem::new(command.label());
    match command {
        AppCommand::SelectElement { element_id } | AppCommand::DeleteElement { element_id } => {
            item.with_entity(EntityRef::Element(*element_id))
        }
        AppCommand::SelectConnection { connection_id } => {
            item.with_entity(EntityRef::Connection(*connection_id))
        }
        _ => item,
    }
}
