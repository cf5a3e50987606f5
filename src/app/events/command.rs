use crate::app::collaborators::ExportFormat;
use crate::app::state::EditorTool;
use crate::core::{ConnectionId, ElementId, MeasurementPoint};

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Element per ID selektieren (unbekannte ID hebt die Selektion auf)
    SelectElement { element_id: ElementId },
    /// Verbindung per ID selektieren (unbekannte ID hebt die Selektion auf)
    SelectConnection { connection_id: ConnectionId },
    /// Selektion aufheben
    ClearSelection,
    /// Layer-Kategorie per ID umschalten (ID wird validiert)
    ToggleLayer { layer_id: String },
    /// Mehrere Kategorien aktivieren (ungültige IDs werden einzeln verworfen)
    ActivateLayers { layer_ids: Vec<String> },
    /// Mehrere Kategorien deaktivieren
    DeactivateLayers { layer_ids: Vec<String> },
    /// Standard-Layer wiederherstellen
    ResetLayers,
    /// Benutzerdefinierte Gruppe umschalten
    ToggleCustomLayer { group_id: String },
    /// Zoomstufe absolut setzen
    SetZoomLevel { zoom_level: f64 },
    /// Stufenweise hineinzoomen
    ZoomIn,
    /// Stufenweise herauszoomen
    ZoomOut,
    /// Werkzeug wechseln
    SetCurrentTool { tool: EditorTool },
    /// Farbschema umschalten
    ToggleDarkMode,
    /// Messmodus starten
    StartMeasurement,
    /// Messpunkt setzen
    AddMeasurementPoint { point: MeasurementPoint },
    /// Messmodus beenden (Ergebnisse bleiben erhalten)
    CompleteMeasurement,
    /// Messungen und Overlay verwerfen
    ClearMeasurements,
    /// Messverlauf exportieren
    ExportMeasurements { format: ExportFormat },
    /// Verbindung zwischen zwei Elementen anlegen
    CreateConnection { source: ElementId, target: ElementId },
    /// Element nach Rückfrage löschen
    DeleteElement { element_id: ElementId },
    /// Elemente per Name suchen
    SearchElements { query: String },
    /// Such-Widget ein-/ausblenden
    ToggleSearchWidget,
    /// Elemente-Panel ein-/ausblenden
    ToggleElementsPanel,
    /// Zustand auf Standardwerte zurücksetzen
    ResetState,
}

impl AppCommand {
    /// Anzeigetext für den Aktionsverlauf.
    pub fn label(&self) -> String {
        match self {
            AppCommand::SelectElement { element_id } => format!("Element {element_id} ausgewählt"),
            AppCommand::SelectConnection { connection_id } => {
                format!("Verbindung {connection_id} ausgewählt")
            }
            AppCommand::ClearSelection => "Auswahl aufgehoben".into(),
            AppCommand::ToggleLayer { layer_id } => format!("Layer '{layer_id}' umgeschaltet"),
            AppCommand::ActivateLayers { layer_ids } => {
                format!("{} Layer aktiviert", layer_ids.len())
            }
            AppCommand::DeactivateLayers { layer_ids } => {
                format!("{} Layer deaktiviert", layer_ids.len())
            }
            AppCommand::ResetLayers => "Standard-Layer wiederhergestellt".into(),
            AppCommand::ToggleCustomLayer { group_id } => {
                format!("Gruppe '{group_id}' umgeschaltet")
            }
            AppCommand::SetZoomLevel { zoom_level } => format!("Zoom {zoom_level}"),
            AppCommand::ZoomIn => "Hineingezoomt".into(),
            AppCommand::ZoomOut => "Herausgezoomt".into(),
            AppCommand::SetCurrentTool { tool } => format!("Werkzeug {tool:?}"),
            AppCommand::ToggleDarkMode => "Farbschema gewechselt".into(),
            AppCommand::StartMeasurement => "Messung gestartet".into(),
            AppCommand::AddMeasurementPoint { .. } => "Messpunkt gesetzt".into(),
            AppCommand::CompleteMeasurement => "Messung beendet".into(),
            AppCommand::ClearMeasurements => "Messungen verworfen".into(),
            AppCommand::ExportMeasurements { format } => format!("Messungen exportiert ({format:?})"),
            AppCommand::CreateConnection { source, target } => {
                format!("Verbindung {source} → {target} angelegt")
            }
            AppCommand::DeleteElement { element_id } => format!("Element {element_id} gelöscht"),
            AppCommand::SearchElements { query } => format!("Suche '{query}'"),
            AppCommand::ToggleSearchWidget => "Suche umgeschaltet".into(),
            AppCommand::ToggleElementsPanel => "Elemente-Panel umgeschaltet".into(),
            AppCommand::ResetState => "Zustand zurückgesetzt".into(),
        }
    }

    /// `true` für Commands, die im Aktionsverlauf protokolliert werden.
    ///
    /// `ResetState` leert den Verlauf selbst und wird deshalb nicht protokolliert.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, AppCommand::ResetState)
    }
}
