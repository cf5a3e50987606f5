//! Handler für Zoom, Werkzeug und Farbschema.

use crate::app::context::EditorContext;
use crate::app::error::EditorError;
use crate::app::events::EventPayload;
use crate::app::state::EditorTool;

/// Setzt die Zoomstufe absolut (begrenzt auf den konfigurierten Bereich).
pub fn set_zoom_level(ctx: &EditorContext, zoom_level: f64) -> Result<(), EditorError> {
    if !zoom_level.is_finite() {
        log::warn!("Ungültige Zoomstufe {} ignoriert", zoom_level);
        return Ok(());
    }
    let before = ctx.store.get().zoom_level;
    ctx.store.set_zoom_level(zoom_level)?;
    let after = ctx.store.get().zoom_level;
    if after != before {
        ctx.bus.emit(EventPayload::ZoomChanged { zoom_level: after });
    }
    Ok(())
}

/// Zoomt um eine Stufe hinein.
pub fn zoom_in(ctx: &EditorContext) -> Result<(), EditorError> {
    let current = ctx.store.get().zoom_level;
    set_zoom_level(ctx, current + ctx.options.zoom_step)
}

/// Zoomt um eine Stufe heraus.
pub fn zoom_out(ctx: &EditorContext) -> Result<(), EditorError> {
    let current = ctx.store.get().zoom_level;
    set_zoom_level(ctx, current - ctx.options.zoom_step)
}

/// Wechselt das aktive Werkzeug.
///
/// Der Messmodus wird über die Mess-Engine betreten und verlassen, damit
/// Punktpuffer und Overlay konsistent bleiben. Pro echtem Wechsel gibt es
/// genau einen neuen Zustand und ein `ToolChanged`.
pub fn set_current_tool(ctx: &EditorContext, tool: EditorTool) -> Result<(), EditorError> {
    if tool == EditorTool::Measure {
        return ctx.measurement.enable_measurement_mode();
    }
    ctx.measurement.disable_measurement_mode(tool)?;
    if ctx.store.get().current_tool != tool {
        ctx.store.set_current_tool(tool)?;
        ctx.bus.emit(EventPayload::ToolChanged { tool });
    }
    Ok(())
}

/// Schaltet das Farbschema um.
pub fn toggle_dark_mode(ctx: &EditorContext) -> Result<(), EditorError> {
    ctx.store.toggle_dark_mode()
}
