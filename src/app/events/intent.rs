use crate::core::{ConnectionId, ElementId, MeasurementPoint};

/// Eingaben der Kartenoberfläche ohne eigene Mutationslogik.
///
/// Welche Commands daraus werden, hängt vom aktiven Werkzeug ab.
#[derive(Debug, Clone, PartialEq)]
pub enum AppIntent {
    /// Klick auf ein Element
    ElementClicked {
        element_id: ElementId,
        point: MeasurementPoint,
    },
    /// Klick auf eine Verbindung
    ConnectionClicked { connection_id: ConnectionId },
    /// Klick auf leere Kartenfläche
    EmptyMapClicked { point: MeasurementPoint },
    /// Escape gedrückt
    CancelRequested,
    /// Suchtext geändert
    SearchQueryChanged { query: String },
    /// Hineinzoomen (Mausrad, Taste)
    ZoomInRequested,
    /// Herauszoomen (Mausrad, Taste)
    ZoomOutRequested,
}
