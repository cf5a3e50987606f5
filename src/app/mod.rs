//! Application-Layer: Store, Events, Manager und Controller.
//!
//! Alle Komponenten laufen auf einem Thread; geteilt wird per `Rc`,
//! Zustandsänderungen laufen ausschließlich über den `StateStore`.

pub mod collaborators;
pub mod context;
pub mod controller;
pub mod error;
pub mod events;
pub mod handlers;
pub mod history;
mod intent_mapping;
pub mod layers;
pub mod measurement;
pub mod performance;
/// Application State
///
/// Dieses Modul verwaltet den kanonischen Zustand (Selektion, Layer, Werkzeug, Zoom).
pub mod state;
pub mod subscription;

pub use collaborators::{
    Collaborators, ConfirmationPrompter, ElementRepository, ExportFormat,
    InMemoryElementRepository, LayerCatalog, LogNotifier, Notification, NotificationLevel,
    Notifier, SceneExporter, StaticLayerCatalog,
};
pub use context::EditorContext;
pub use controller::AppController;
pub use error::EditorError;
pub use events::{
    AppCommand, AppEvent, AppIntent, CancellationNotice, CancellationSignal, EventBus, EventKind,
    EventPayload, EventStream,
};
pub use history::HistoryItem;
pub use layers::{
    FilePreferenceStorage, LayerBatchOutcome, LayerPersistenceManager, LayerPreference,
    MemoryPreferenceStorage, PreferenceStorage, LAYER_PREFERENCE_KEY,
};
pub use measurement::{MeasurementEngine, MeasurementOverlay};
pub use performance::PerformanceController;
pub use state::{ApplicationState, EditorTool, Highlight, StateStore};
pub use subscription::{Subscribers, Subscription};

/// Aktuelle Zeit in Unix-Millisekunden (0, falls die Systemuhr vor 1970 steht).
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
