use super::harness;
use netmap_editor::app::NotificationLevel;
use netmap_editor::core::EntityRef;
use netmap_editor::{AppCommand, AppIntent, EditorTool, EventPayload, MeasurementPoint};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_select_element_sets_state_and_publishes_selection() {
    let h = harness();

    h.controller
        .handle_intent(AppIntent::ElementClicked {
            element_id: 1,
            point: MeasurementPoint::geo(48.0, 11.0),
        })
        .expect("Klick sollte durchlaufen");

    let state = h.controller.state();
    assert_eq!(
        state.selected_element.as_ref().map(|e| e.name.as_str()),
        Some("KVz Hauptstraße")
    );
    assert_eq!(
        h.events.borrow().last().map(|e| e.payload.clone()),
        Some(EventPayload::ElementSelected {
            element_id: Some(1)
        })
    );
    assert_eq!(
        state.history_items.back().and_then(|item| item.entity),
        Some(EntityRef::Element(1))
    );
}

#[test]
fn test_unknown_element_clears_previous_selection() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::SelectElement { element_id: 2 })
        .expect("Selektion");

    h.controller
        .handle_command(AppCommand::SelectElement { element_id: 404 })
        .expect("unbekannte ID ist kein Fehler");

    assert!(h.controller.state().selected_element.is_none());
    assert_eq!(
        h.events.borrow().last().map(|e| e.payload.clone()),
        Some(EventPayload::ElementSelected { element_id: None })
    );
}

#[test]
fn test_watch_selected_element_sees_selection_lifecycle() {
    let h = harness();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _subscription = h.controller.watch_selected_element(move |element| {
        sink.borrow_mut().push(element.as_ref().map(|e| e.id));
    });

    h.controller
        .handle_command(AppCommand::SelectElement { element_id: 3 })
        .expect("Selektion");
    h.controller
        .handle_intent(AppIntent::EmptyMapClicked {
            point: MeasurementPoint::screen(5.0, 5.0),
        })
        .expect("Klick ins Leere");

    assert_eq!(*seen.borrow(), vec![None, Some(3), None]);
}

#[test]
fn test_connect_tool_creates_connection_between_clicked_elements() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::SetCurrentTool {
            tool: EditorTool::Connect,
        })
        .expect("Werkzeug");
    let click = |element_id| AppIntent::ElementClicked {
        element_id,
        point: MeasurementPoint::screen(0.0, 0.0),
    };

    h.controller.handle_intent(click(1)).expect("Quelle");
    h.controller.handle_intent(click(2)).expect("Ziel");

    let state = h.controller.state();
    assert_eq!(state.connections.len(), 1);
    assert_eq!(state.connections[0].source_id, 1);
    assert_eq!(state.connections[0].target_id, 2);
    assert!(state.has_unsaved_changes);
    assert_eq!(state.selected_element.as_ref().map(|e| e.id), Some(2));
    assert_eq!(h.repository.connection_count(), 1);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Success]);
    assert!(h.events.borrow().iter().any(|e| e.payload
        == EventPayload::EntityCreated {
            entity: EntityRef::Connection(1)
        }));
}

#[test]
fn test_failed_connection_is_reported_to_user() {
    let h = harness();

    h.controller
        .handle_command(AppCommand::CreateConnection {
            source: 1,
            target: 99,
        })
        .expect("Fehler erreicht den Benutzer als Hinweis");

    assert!(h.controller.state().connections.is_empty());
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Error]);
}

#[test]
fn test_delete_element_asks_and_removes_all_references() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::CreateConnection {
            source: 1,
            target: 2,
        })
        .expect("Verbindung");
    h.controller
        .handle_command(AppCommand::SelectElement { element_id: 2 })
        .expect("Selektion");

    h.controller
        .handle_command(AppCommand::DeleteElement { element_id: 2 })
        .expect("Löschen");

    let state = h.controller.state();
    assert_eq!(h.prompter.asked.get(), 1);
    assert!(state.selected_element.is_none());
    assert!(state.connections.is_empty());
    assert_eq!(h.repository.element_count(), 2);
    assert!(h.events.borrow().iter().any(|e| e.payload
        == EventPayload::EntityDeleted {
            entity: EntityRef::Element(2)
        }));
}

#[test]
fn test_declined_delete_keeps_element() {
    let h = harness();
    h.prompter.answer.set(false);

    h.controller
        .handle_command(AppCommand::DeleteElement { element_id: 3 })
        .expect("Abbruch ist kein Fehler");

    assert_eq!(h.prompter.asked.get(), 1);
    assert_eq!(h.repository.element_count(), 3);
    assert!(h.notifier.levels().is_empty());
}

#[test]
fn test_deleting_unknown_element_warns_without_asking() {
    let h = harness();

    h.controller
        .handle_command(AppCommand::DeleteElement { element_id: 42 })
        .expect("unbekanntes Element ist kein Fehler");

    assert_eq!(h.prompter.asked.get(), 0);
    assert_eq!(h.repository.element_count(), 3);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Warning]);
}

#[test]
fn test_search_fills_results_and_closing_widget_drops_them() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::ToggleSearchWidget)
        .expect("Widget öffnen");

    h.controller
        .handle_intent(AppIntent::SearchQueryChanged {
            query: "mast".into(),
        })
        .expect("Suche");
    assert_eq!(h.controller.state().search_results.len(), 1);

    h.controller
        .handle_command(AppCommand::ToggleSearchWidget)
        .expect("Widget schließen");
    assert!(h.controller.state().search_results.is_empty());
}
