//! Explizit besessener Kontext: verdrahtet Store, Bus und Manager einer Sitzung.

use crate::app::collaborators::Collaborators;
use crate::app::error::EditorError;
use crate::app::events::EventBus;
use crate::app::layers::{LayerPersistenceManager, PreferenceStorage};
use crate::app::measurement::MeasurementEngine;
use crate::app::performance::PerformanceController;
use crate::app::state::StateStore;
use crate::shared::EditorOptions;
use std::cell::Cell;
use std::rc::Rc;

/// Einmal pro Prozess erzeugter Kontext; wird per Referenz an alle
/// Komponenten weitergereicht. Beendet wird explizit über [`teardown`].
///
/// [`teardown`]: EditorContext::teardown
pub struct EditorContext {
    /// Laufzeit-Optionen
    pub options: EditorOptions,
    /// Kanonischer Zustand
    pub store: Rc<StateStore>,
    /// Ereignis-Kanal
    pub bus: Rc<EventBus>,
    /// Layer-Persistenz
    pub layers: LayerPersistenceManager,
    /// Render-Performance-Regelung
    pub performance: PerformanceController,
    /// Distanzmessung
    pub measurement: MeasurementEngine,
    /// Externe Kollaborateure
    pub collaborators: Collaborators,
    torn_down: Cell<bool>,
}

impl EditorContext {
    /// Baut alle Komponenten auf und lädt die gespeicherte Layer-Auswahl.
    pub fn new(
        options: EditorOptions,
        collaborators: Collaborators,
        storage: Rc<dyn PreferenceStorage>,
    ) -> Result<Self, EditorError> {
        Self::with_layer_manager(options, collaborators, |store, options| {
            LayerPersistenceManager::new(store, storage, options)
        })
    }

    /// Wie [`EditorContext::new`], der Layer-Manager wird aber vom Aufrufer
    /// gebaut (z.B. mit eingeschränkter Menge gültiger Kategorien).
    pub fn with_layer_manager(
        options: EditorOptions,
        collaborators: Collaborators,
        layers: impl FnOnce(Rc<StateStore>, &EditorOptions) -> LayerPersistenceManager,
    ) -> Result<Self, EditorError> {
        let store = Rc::new(StateStore::new(&options, Rc::clone(&collaborators.catalog)));
        let bus = Rc::new(EventBus::new());
        let layers = layers(Rc::clone(&store), &options);
        let performance = PerformanceController::new(&options.performance);
        let measurement = MeasurementEngine::new(
            Rc::clone(&store),
            Rc::clone(&bus),
            Rc::clone(&collaborators.exporter),
            Rc::clone(&collaborators.notifier),
            &options,
        );

        let context = Self {
            options,
            store,
            bus,
            layers,
            performance,
            measurement,
            collaborators,
            torn_down: Cell::new(false),
        };
        context.layers.initialize()?;
        context.performance.start_monitoring();
        log::info!("Editor-Kontext initialisiert");
        Ok(context)
    }

    /// Ein Tick der kooperativen Frame-Schleife (Zeitstempel in ms).
    pub fn on_frame(&self, now_ms: f64) {
        if self.torn_down.get() {
            return;
        }
        self.performance.on_frame(now_ms);
        if now_ms.is_finite() && now_ms >= 0.0 {
            self.layers.poll(now_ms as u64);
        }
    }

    /// `true` nach [`EditorContext::teardown`].
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// Schreibt ausstehende Präferenzen und trennt alle Beobachter.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.layers.teardown();
        self.performance.teardown();
        self.measurement.teardown();
        self.bus.teardown();
        self.store.teardown();
        log::info!("Editor-Kontext beendet");
    }
}
