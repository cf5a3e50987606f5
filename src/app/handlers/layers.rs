//! Handler für Layer-Sichtbarkeit (Kategorien und benutzerdefinierte Gruppen).

use crate::app::context::EditorContext;
use crate::app::error::EditorError;
use crate::app::events::EventPayload;
use crate::core::{LayerCategory, LayerRef};

/// Schaltet eine Kategorie per ID um; ungültige IDs werden ignoriert.
pub fn toggle(ctx: &EditorContext, layer_id: &str) -> Result<(), EditorError> {
    let Some(active) = ctx.layers.toggle_layer(layer_id)? else {
        return Ok(());
    };
    if let Some(category) = LayerCategory::from_id(layer_id) {
        emit_toggled(ctx, category, active);
    }
    Ok(())
}

/// Aktiviert mehrere Kategorien.
pub fn activate(ctx: &EditorContext, layer_ids: &[String]) -> Result<(), EditorError> {
    let before = ctx.store.get();
    let outcome = ctx.layers.activate_layers(layer_ids)?;
    for category in outcome.applied {
        if !before.is_layer_active(category) {
            emit_toggled(ctx, category, true);
        }
    }
    Ok(())
}

/// Deaktiviert mehrere Kategorien.
pub fn deactivate(ctx: &EditorContext, layer_ids: &[String]) -> Result<(), EditorError> {
    let before = ctx.store.get();
    let outcome = ctx.layers.deactivate_layers(layer_ids)?;
    for category in outcome.applied {
        if before.is_layer_active(category) {
            emit_toggled(ctx, category, false);
        }
    }
    Ok(())
}

/// Stellt die Standard-Layer wieder her.
pub fn reset(ctx: &EditorContext) -> Result<(), EditorError> {
    let before = ctx.store.get();
    ctx.layers.reset_to_default_layers()?;
    let after = ctx.store.get();
    for category in LayerCategory::ALL {
        let active = after.is_layer_active(category);
        if before.is_layer_active(category) != active {
            emit_toggled(ctx, category, active);
        }
    }
    Ok(())
}

/// Schaltet eine benutzerdefinierte Gruppe um; unbekannte Gruppen werden ignoriert.
pub fn toggle_custom(ctx: &EditorContext, group_id: &str) -> Result<(), EditorError> {
    ctx.store.toggle_custom_layer(group_id)?;
    let state = ctx.store.get();
    if state.has_custom_layer(group_id) {
        ctx.bus.emit(EventPayload::LayerToggled {
            layer: LayerRef::Custom(group_id.to_string()),
            active: state.is_custom_layer_active(group_id),
        });
    }
    Ok(())
}

fn emit_toggled(ctx: &EditorContext, category: LayerCategory, active: bool) {
    ctx.bus.emit(EventPayload::LayerToggled {
        layer: LayerRef::Category(category),
        active,
    });
}
