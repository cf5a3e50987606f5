use crate::app::state::EditorTool;
use crate::core::{ConnectionId, ElementId, EntityRef, GeoBounds, GeoPoint, LayerRef, Measurement};
use serde::{Deserialize, Serialize};

/// Transientes Domänen-Ereignis mit Zeitstempel.
///
/// Serialisiert als flaches JSON-Objekt mit `type`-Tag, z.B.
/// `{"timestampMs":1,"type":"zoomChanged","zoomLevel":12.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEvent {
    /// Erzeugungszeitpunkt (Unix-Millisekunden)
    pub timestamp_ms: u64,
    /// Variantenspezifische Nutzdaten inkl. Diskriminante
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl AppEvent {
    /// Erstellt ein Ereignis mit aktuellem Zeitstempel.
    pub fn now(payload: EventPayload) -> Self {
        Self::at(crate::app::epoch_millis(), payload)
    }

    /// Erstellt ein Ereignis mit festem Zeitstempel.
    pub fn at(timestamp_ms: u64, payload: EventPayload) -> Self {
        Self {
            timestamp_ms,
            payload,
        }
    }

    /// Diskriminante des Ereignisses.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Geschlossener Ereignis-Katalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventPayload {
    /// Element selektiert (`None` = Selektion aufgehoben)
    ElementSelected { element_id: Option<ElementId> },
    /// Verbindung selektiert (`None` = Selektion aufgehoben)
    ConnectionSelected {
        connection_id: Option<ConnectionId>,
    },
    /// Entität angelegt
    EntityCreated { entity: EntityRef },
    /// Entität geändert
    EntityUpdated { entity: EntityRef },
    /// Entität gelöscht
    EntityDeleted { entity: EntityRef },
    /// Layer ein-/ausgeschaltet
    LayerToggled { layer: LayerRef, active: bool },
    /// Zoomstufe geändert
    ZoomChanged { zoom_level: f64 },
    /// Werkzeug gewechselt
    ToolChanged { tool: EditorTool },
    /// Messung abgeschlossen
    MeasurementCompleted { measurement: Measurement },
    /// Laufende Aktion abgebrochen
    ActionCancelled { action_id: String, reason: String },
    /// Karte fertig geladen
    MapReady,
    /// Karte meldet einen Fehler
    MapError { message: String },
    /// Ziehen eines Elements begonnen
    DragStarted { element_id: ElementId },
    /// Ziehen eines Elements beendet
    DragEnded {
        element_id: ElementId,
        position: GeoPoint,
    },
    /// Kartenmittelpunkt verschoben
    CenterChanged { center: GeoPoint },
    /// Sichtbarer Kartenausschnitt geändert
    BoundsChanged { bounds: GeoBounds },
}

/// Feldlose Diskriminante von [`EventPayload`] für gefilterte Streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// [`EventPayload::ElementSelected`]
    ElementSelected,
    /// [`EventPayload::ConnectionSelected`]
    ConnectionSelected,
    /// [`EventPayload::EntityCreated`]
    EntityCreated,
    /// [`EventPayload::EntityUpdated`]
    EntityUpdated,
    /// [`EventPayload::EntityDeleted`]
    EntityDeleted,
    /// [`EventPayload::LayerToggled`]
    LayerToggled,
    /// [`EventPayload::ZoomChanged`]
    ZoomChanged,
    /// [`EventPayload::ToolChanged`]
    ToolChanged,
    /// [`EventPayload::MeasurementCompleted`]
    MeasurementCompleted,
    /// [`EventPayload::ActionCancelled`]
    ActionCancelled,
    /// [`EventPayload::MapReady`]
    MapReady,
    /// [`EventPayload::MapError`]
    MapError,
    /// [`EventPayload::DragStarted`]
    DragStarted,
    /// [`EventPayload::DragEnded`]
    DragEnded,
    /// [`EventPayload::CenterChanged`]
    CenterChanged,
    /// [`EventPayload::BoundsChanged`]
    BoundsChanged,
}

impl EventKind {
    /// Alle Diskriminanten in Katalog-Reihenfolge.
    pub const ALL: [EventKind; 16] = [
        EventKind::ElementSelected,
        EventKind::ConnectionSelected,
        EventKind::EntityCreated,
        EventKind::EntityUpdated,
        EventKind::EntityDeleted,
        EventKind::LayerToggled,
        EventKind::ZoomChanged,
        EventKind::ToolChanged,
        EventKind::MeasurementCompleted,
        EventKind::ActionCancelled,
        EventKind::MapReady,
        EventKind::MapError,
        EventKind::DragStarted,
        EventKind::DragEnded,
        EventKind::CenterChanged,
        EventKind::BoundsChanged,
    ];
}

impl EventPayload {
    /// Diskriminante der Variante.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::ElementSelected { .. } => EventKind::ElementSelected,
            EventPayload::ConnectionSelected { .. } => EventKind::ConnectionSelected,
            EventPayload::EntityCreated { .. } => EventKind::EntityCreated,
            EventPayload::EntityUpdated { .. } => EventKind::EntityUpdated,
            EventPayload::EntityDeleted { .. } => EventKind::EntityDeleted,
            EventPayload::LayerToggled { .. } => EventKind::LayerToggled,
            EventPayload::ZoomChanged { .. } => EventKind::ZoomChanged,
            EventPayload::ToolChanged { .. } => EventKind::ToolChanged,
            EventPayload::MeasurementCompleted { .. } => EventKind::MeasurementCompleted,
            EventPayload::ActionCancelled { .. } => EventKind::ActionCancelled,
            EventPayload::MapReady => EventKind::MapReady,
            EventPayload::MapError { .. } => EventKind::MapError,
            EventPayload::DragStarted { .. } => EventKind::DragStarted,
            EventPayload::DragEnded { .. } => EventKind::DragEnded,
            EventPayload::CenterChanged { .. } => EventKind::CenterChanged,
            EventPayload::BoundsChanged { .. } => EventKind::BoundsChanged,
        }
    }
}
