//! Netzplan-Editor Library.
//! Koordinationskern (State, Events, Layer, Performance, Messung) als Library
//! exportiert für Host-Anwendungen, Tests und Wiederverwendung.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    AppCommand, AppController, AppEvent, AppIntent, ApplicationState, Collaborators,
    EditorContext, EditorError, EditorTool, EventBus, EventKind, EventPayload,
    LayerPersistenceManager, MeasurementEngine, PerformanceController, StateStore, Subscription,
};
pub use core::{
    Connection, CustomLayer, GeoPoint, LayerCategory, LayerRef, MapElement, Measurement,
    MeasurementPoint,
};
pub use shared::{EditorOptions, PerformanceConfig, PerformanceSample};
