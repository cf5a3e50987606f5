use super::harness;
use netmap_editor::app::{ExportFormat, NotificationLevel};
use netmap_editor::{AppCommand, AppIntent, EditorTool, EventKind, MeasurementPoint};
use std::cell::RefCell;
use std::rc::Rc;

fn measure_pair(h: &super::Harness, from: (f64, f64), to: (f64, f64)) {
    for (x, y) in [from, to] {
        h.controller
            .handle_command(AppCommand::AddMeasurementPoint {
                point: MeasurementPoint::screen(x, y),
            })
            .expect("Messpunkt");
    }
}

#[test]
fn test_element_click_in_measure_mode_binds_point_to_element() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::SetCurrentTool {
            tool: EditorTool::Measure,
        })
        .expect("Messmodus");

    for element_id in [1, 2] {
        h.controller
            .handle_intent(AppIntent::ElementClicked {
                element_id,
                point: MeasurementPoint::geo(48.0, 11.0 + element_id as f64 * 0.01),
            })
            .expect("Klick");
    }

    let measurement = h
        .context()
        .measurement
        .current_measurement()
        .expect("Messung abgeschlossen");
    assert_eq!(measurement.source_element, Some(1));
    assert_eq!(measurement.target_element, Some(2));
    assert!(h.controller.state().selected_element.is_none());
    assert_eq!(
        h.context().bus.last_event().map(|event| event.kind()),
        Some(EventKind::MeasurementCompleted)
    );
}

#[test]
fn test_switching_tool_leaves_measure_mode_but_keeps_result() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::StartMeasurement)
        .expect("Messmodus");
    measure_pair(&h, (0.0, 0.0), (3.0, 4.0));

    h.controller
        .handle_command(AppCommand::SetCurrentTool {
            tool: EditorTool::Pan,
        })
        .expect("Werkzeug");

    assert!(!h.context().measurement.is_active());
    assert_eq!(h.controller.state().current_tool, EditorTool::Pan);
    assert_eq!(
        h.context()
            .measurement
            .current_measurement()
            .map(|m| m.distance),
        Some(5.0)
    );
}

#[test]
fn test_each_real_tool_change_publishes_one_tool_changed() {
    let h = harness();
    let tools = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&tools);
    let _subscription = h
        .controller
        .watch_current_tool(move |tool| sink.borrow_mut().push(*tool));

    for tool in [EditorTool::Measure, EditorTool::Pan, EditorTool::Measure] {
        h.controller
            .handle_command(AppCommand::SetCurrentTool { tool })
            .expect("Werkzeug");
    }

    assert_eq!(
        *tools.borrow(),
        vec![
            EditorTool::Select,
            EditorTool::Measure,
            EditorTool::Pan,
            EditorTool::Measure
        ]
    );
    assert_eq!(
        h.event_types(),
        vec!["ToolChanged", "ToolChanged", "ToolChanged"]
    );
}

#[test]
fn test_reselecting_measure_keeps_the_pending_point() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::SetCurrentTool {
            tool: EditorTool::Measure,
        })
        .expect("Messmodus");
    h.controller
        .handle_command(AppCommand::AddMeasurementPoint {
            point: MeasurementPoint::screen(0.0, 0.0),
        })
        .expect("Punkt 1");
    h.events.borrow_mut().clear();

    h.controller
        .handle_command(AppCommand::SetCurrentTool {
            tool: EditorTool::Measure,
        })
        .expect("gleiches Werkzeug");
    assert!(h.events.borrow().is_empty());
    assert_eq!(h.context().measurement.pending_points(), 1);

    h.controller
        .handle_command(AppCommand::AddMeasurementPoint {
            point: MeasurementPoint::screen(0.0, 4.0),
        })
        .expect("Punkt 2");
    assert_eq!(
        h.context()
            .measurement
            .current_measurement()
            .map(|m| m.distance),
        Some(4.0)
    );
}

#[test]
fn test_export_measurements_reports_artifact() {
    let h = harness();
    h.controller
        .handle_command(AppCommand::ExportMeasurements {
            format: ExportFormat::Json,
        })
        .expect("leerer Export ist kein Fehler");
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Info]);

    h.controller
        .handle_command(AppCommand::StartMeasurement)
        .expect("Messmodus");
    measure_pair(&h, (0.0, 0.0), (3.0, 4.0));
    measure_pair(&h, (0.0, 0.0), (0.0, 1.0));
    h.controller
        .handle_command(AppCommand::ExportMeasurements {
            format: ExportFormat::Svg,
        })
        .expect("Export");

    let notifications = h.notifier.notifications.borrow();
    let last = notifications.last().expect("Hinweis");
    assert_eq!(last.level, NotificationLevel::Success);
    assert!(last.message.contains("messungen-2.svg"));
}
