use super::harness;
use netmap_editor::app::{LayerPreference, LAYER_PREFERENCE_KEY};
use netmap_editor::{AppCommand, EventPayload, LayerCategory, LayerRef};
use std::cell::RefCell;
use std::rc::Rc;

fn stored_ids(h: &super::Harness) -> Vec<String> {
    let raw = h
        .storage
        .get(LAYER_PREFERENCE_KEY)
        .expect("Präferenz sollte gespeichert sein");
    LayerPreference::parse(&raw)
        .expect("gespeicherte Präferenz sollte gültig sein")
        .active_layer_ids
}

fn toggled(h: &super::Harness) -> Vec<(LayerRef, bool)> {
    h.events
        .borrow()
        .iter()
        .filter_map(|event| match &event.payload {
            EventPayload::LayerToggled { layer, active } => Some((layer.clone(), *active)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_first_start_writes_default_layers() {
    let h = harness();

    assert_eq!(stored_ids(&h), vec!["buildings", "cabinets", "cables"]);
}

#[test]
fn test_toggle_layer_publishes_event_and_persists_after_debounce() {
    let h = harness();

    h.controller
        .handle_command(AppCommand::ToggleLayer {
            layer_id: "ducts".into(),
        })
        .expect("ToggleLayer sollte durchlaufen");

    assert!(h.controller.state().is_layer_active(LayerCategory::Ducts));
    assert_eq!(
        toggled(&h),
        vec![(LayerRef::Category(LayerCategory::Ducts), true)]
    );

    h.controller.on_frame(1000.0);
    h.controller.on_frame(1200.0);
    assert_eq!(stored_ids(&h), vec!["buildings", "cabinets", "cables"]);
    assert!(h.context().layers.has_pending_write());

    h.controller.on_frame(1300.0);
    assert_eq!(stored_ids(&h), vec!["buildings", "cabinets", "cables", "ducts"]);
    assert!(!h.context().layers.has_pending_write());
}

#[test]
fn test_unknown_layer_id_is_ignored() {
    let h = harness();
    let before = h.controller.state();

    h.controller
        .handle_command(AppCommand::ToggleLayer {
            layer_id: "legacyFiber".into(),
        })
        .expect("ungültige ID ist kein Fehler");

    assert_eq!(h.controller.state().active_layers, before.active_layers);
    assert!(toggled(&h).is_empty());
    assert!(!h.context().layers.has_pending_write());
}

#[test]
fn test_activate_layers_reports_only_actual_changes() {
    let h = harness();

    h.controller
        .handle_command(AppCommand::ActivateLayers {
            layer_ids: vec!["poles".into(), "cables".into(), "bogus".into()],
        })
        .expect("ActivateLayers");

    assert_eq!(
        toggled(&h),
        vec![(LayerRef::Category(LayerCategory::Poles), true)]
    );
    assert!(h.controller.state().is_layer_active(LayerCategory::Poles));
}

#[test]
fn test_deactivate_then_reset_restores_defaults_immediately() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::DeactivateLayers {
            layer_ids: vec!["buildings".into(), "cabinets".into()],
        })
        .expect("DeactivateLayers");
    h.events.borrow_mut().clear();

    h.controller
        .handle_command(AppCommand::ResetLayers)
        .expect("ResetLayers");

    assert_eq!(stored_ids(&h), vec!["buildings", "cabinets", "cables"]);
    assert_eq!(
        toggled(&h),
        vec![
            (LayerRef::Category(LayerCategory::Buildings), true),
            (LayerRef::Category(LayerCategory::Cabinets), true),
        ]
    );
    assert!(!h.context().layers.has_pending_write());
}

#[test]
fn test_custom_layer_toggle_publishes_group_reference() {
    let h = harness();

    h.controller
        .handle_command(AppCommand::ToggleCustomLayer {
            group_id: "baustelle".into(),
        })
        .expect("Gruppe umschalten");
    h.controller
        .handle_command(AppCommand::ToggleCustomLayer {
            group_id: "unbekannt".into(),
        })
        .expect("unbekannte Gruppe ist kein Fehler");

    assert!(h.controller.state().is_custom_layer_active("baustelle"));
    assert_eq!(
        toggled(&h),
        vec![(LayerRef::Custom("baustelle".into()), true)]
    );
}

#[test]
fn test_watch_active_layers_ignores_unrelated_changes() {
    let h = harness();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _subscription = h.controller.watch_active_layers(move |layers| {
        sink.borrow_mut().push(layers.len());
    });

    h.controller
        .handle_command(AppCommand::ToggleDarkMode)
        .expect("Farbschema");
    h.controller
        .handle_command(AppCommand::ToggleLayer {
            layer_id: "cables".into(),
        })
        .expect("ToggleLayer");

    assert_eq!(*seen.borrow(), vec![3, 2]);
}
