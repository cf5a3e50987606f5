//! Handler für den Messmodus.

use crate::app::collaborators::ExportFormat;
use crate::app::context::EditorContext;
use crate::app::error::EditorError;
use crate::app::state::EditorTool;
use crate::core::MeasurementPoint;

/// Betritt den Messmodus.
pub fn start(ctx: &EditorContext) -> Result<(), EditorError> {
    ctx.measurement.enable_measurement_mode()
}

/// Setzt einen Messpunkt; ungültige Punkte werden von der Engine verworfen.
pub fn add_point(ctx: &EditorContext, point: MeasurementPoint) {
    if let Some(measurement) = ctx.measurement.add_measurement_point(point) {
        log::debug!("Messung abgeschlossen: {}", measurement);
    }
}

/// Verlässt den Messmodus zurück zum Auswahlwerkzeug.
pub fn complete(ctx: &EditorContext) -> Result<(), EditorError> {
    ctx.measurement.disable_measurement_mode(EditorTool::Select)
}

/// Verwirft Punktpuffer, Overlay und aktuelle Messung.
pub fn clear(ctx: &EditorContext) {
    ctx.measurement.clear_measurements();
}

/// Exportiert den Messverlauf; das Ergebnis meldet die Engine selbst.
pub fn export(ctx: &EditorContext, format: ExportFormat) {
    ctx.measurement.export_measurements(format);
}
