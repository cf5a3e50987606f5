//! Mapping von UI-Intents auf mutierende App-Commands.

use super::state::{ApplicationState, EditorTool};
use super::{AppCommand, AppIntent};

/// Übersetzt einen `AppIntent` in eine Sequenz ausführbarer `AppCommand`s.
///
/// Klicks werden abhängig vom aktiven Werkzeug interpretiert.
pub fn map_intent_to_commands(state: &ApplicationState, intent: AppIntent) -> Vec<AppCommand> {
    match intent {
        AppIntent::ElementClicked { element_id, point } => match state.current_tool {
            EditorTool::Measure => vec![AppCommand::AddMeasurementPoint {
                point: point.with_element(element_id),
            }],
            EditorTool::Connect => match state.selected_element.as_ref() {
                Some(source) if source.id != element_id => vec![
                    AppCommand::CreateConnection {
                        source: source.id,
                        target: element_id,
                    },
                    AppCommand::SelectElement { element_id },
                ],
                _ => vec![AppCommand::SelectElement { element_id }],
            },
            EditorTool::Pan => Vec::new(),
            EditorTool::Select | EditorTool::AddElement => {
                vec![AppCommand::SelectElement { element_id }]
            }
        },
        AppIntent::ConnectionClicked { connection_id } => match state.current_tool {
            EditorTool::Measure | EditorTool::Pan => Vec::new(),
            _ => vec![AppCommand::SelectConnection { connection_id }],
        },
        AppIntent::EmptyMapClicked { point } => match state.current_tool {
            EditorTool::Measure => vec![AppCommand::AddMeasurementPoint { point }],
            EditorTool::Pan => Vec::new(),
            _ if state.primary_highlight().is_some() => vec![AppCommand::ClearSelection],
            _ => Vec::new(),
        },
        AppIntent::CancelRequested => match state.current_tool {
            EditorTool::Measure => vec![
                AppCommand::ClearMeasurements,
                AppCommand::CompleteMeasurement,
            ],
            _ => vec![AppCommand::ClearSelection],
        },
        AppIntent::SearchQueryChanged { query } => vec![AppCommand::SearchElements { query }],
        AppIntent::ZoomInRequested => vec![AppCommand::ZoomIn],
        AppIntent::ZoomOutRequested => vec![AppCommand::ZoomOut],
    }
}
