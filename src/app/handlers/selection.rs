//! Handler für Selektions-Operationen.

use crate::app::context::EditorContext;
use crate::app::error::EditorError;
use crate::app::events::EventPayload;
use crate::core::{ConnectionId, ElementId};

/// Selektiert ein Element per ID.
///
/// Unbekannte IDs heben die Selektion auf, statt einen Fehler zu melden.
pub fn select_element(ctx: &EditorContext, element_id: ElementId) -> Result<(), EditorError> {
    let Some(element) = ctx.collaborators.elements.element(element_id) else {
        log::warn!("{}, Auswahl wird aufgehoben", not_found("Element", element_id));
        return clear(ctx);
    };
    ctx.store.set_selected_element(Some(element))?;
    ctx.bus.emit(EventPayload::ElementSelected {
        element_id: Some(element_id),
    });
    Ok(())
}

/// Selektiert eine Verbindung per ID.
pub fn select_connection(
    ctx: &EditorContext,
    connection_id: ConnectionId,
) -> Result<(), EditorError> {
    let Some(connection) = ctx.collaborators.elements.connection(connection_id) else {
        log::warn!(
            "{}, Auswahl wird aufgehoben",
            not_found("Verbindung", connection_id)
        );
        return clear(ctx);
    };
    ctx.store.set_selected_connection(Some(connection))?;
    ctx.bus.emit(EventPayload::ConnectionSelected {
        connection_id: Some(connection_id),
    });
    Ok(())
}

/// Hebt die aktuelle Selektion auf.
pub fn clear(ctx: &EditorContext) -> Result<(), EditorError> {
    let before = ctx.store.get();
    ctx.store.clear_selection()?;
    if before.selected_element.is_some() {
        ctx.bus
            .emit(EventPayload::ElementSelected { element_id: None });
    }
    if before.selected_connection.is_some() {
        ctx.bus
            .emit(EventPayload::ConnectionSelected { connection_id: None });
    }
    Ok(())
}

fn not_found(entity: &'static str, id: u64) -> EditorError {
    EditorError::NotFound { entity, id }
}
