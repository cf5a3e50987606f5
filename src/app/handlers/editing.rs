//! Handler für Bearbeitungs-Operationen (Verbindungen, Löschen, Suche).

use crate::app::collaborators::Notification;
use crate::app::context::EditorContext;
use crate::app::error::EditorError;
use crate::app::events::EventPayload;
use crate::core::{ElementId, EntityRef};

/// Legt eine Verbindung zwischen zwei Elementen an.
///
/// Fehler der Datenzugriffsschicht erreichen den Benutzer als Hinweis.
pub fn create_connection(
    ctx: &EditorContext,
    source: ElementId,
    target: ElementId,
) -> Result<(), EditorError> {
    match ctx.collaborators.elements.create_connection(source, target) {
        Ok(connection) => {
            let id = connection.id;
            ctx.store.add_connection(connection)?;
            ctx.store.set_unsaved_changes(true)?;
            ctx.bus.emit(EventPayload::EntityCreated {
                entity: EntityRef::Connection(id),
            });
            log::info!("Verbindung {} angelegt ({} → {})", id, source, target);
            ctx.collaborators
                .notifier
                .notify(Notification::success(format!("Verbindung {id} angelegt")));
        }
        Err(e) => {
            log::error!("Verbindung {} → {} fehlgeschlagen: {:#}", source, target, e);
            ctx.collaborators.notifier.notify(Notification::error(format!(
                "Verbindung konnte nicht angelegt werden: {e}"
            )));
        }
    }
    Ok(())
}

/// Löscht ein Element nach Rückfrage und entfernt alle Referenzen darauf.
pub fn delete_element(ctx: &EditorContext, element_id: ElementId) -> Result<(), EditorError> {
    let Some(element) = ctx.collaborators.elements.element(element_id) else {
        let error = EditorError::NotFound {
            entity: "Element",
            id: element_id,
        };
        log::warn!("Löschen abgebrochen: {}", error);
        let selected = ctx.store.get().selected_element.as_ref().map(|e| e.id);
        if selected == Some(element_id) {
            super::selection::clear(ctx)?;
        }
        ctx.collaborators
            .notifier
            .notify(Notification::warning(error.to_string()));
        return Ok(());
    };

    let confirmed = ctx.collaborators.prompter.confirm(
        "Element löschen",
        &format!("Element '{}' und alle Verbindungen löschen?", element.name),
    );
    if !confirmed {
        log::info!("Löschen von Element {} abgebrochen", element_id);
        return Ok(());
    }

    match ctx.collaborators.elements.delete_element(element_id) {
        Ok(()) => {
            ctx.store.remove_element(element_id)?;
            ctx.bus.emit(EventPayload::EntityDeleted {
                entity: EntityRef::Element(element_id),
            });
            ctx.collaborators.notifier.notify(Notification::success(format!(
                "Element '{}' gelöscht",
                element.name
            )));
        }
        Err(e) => {
            log::error!("Löschen von Element {} fehlgeschlagen: {:#}", element_id, e);
            ctx.collaborators
                .notifier
                .notify(Notification::error(format!("Löschen fehlgeschlagen: {e}")));
        }
    }
    Ok(())
}

/// Sucht Elemente per Name und übernimmt die Treffer in den Zustand.
pub fn search(ctx: &EditorContext, query: &str) -> Result<(), EditorError> {
    let results = ctx.collaborators.elements.search(query);
    log::debug!("Suche '{}': {} Treffer", query, results.len());
    ctx.store.set_search_results(results)
}
