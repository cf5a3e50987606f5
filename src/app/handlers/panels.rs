//! Handler für Panels und Zustands-Reset.

use crate::app::context::EditorContext;
use crate::app::error::EditorError;
use crate::app::state::EditorTool;

/// Blendet das Such-Widget ein/aus.
pub fn toggle_search_widget(ctx: &EditorContext) -> Result<(), EditorError> {
    ctx.store.toggle_search_widget()
}

/// Blendet das Elemente-Panel ein/aus.
pub fn toggle_elements_panel(ctx: &EditorContext) -> Result<(), EditorError> {
    ctx.store.toggle_elements_panel()
}

/// Setzt den Zustand auf Standardwerte zurück (Messmodus wird verlassen).
pub fn reset_state(ctx: &EditorContext) -> Result<(), EditorError> {
    ctx.measurement.disable_measurement_mode(EditorTool::Select)?;
    ctx.measurement.clear_measurements();
    ctx.store.reset_state()
}
