//! Interaktive Zwei-Punkt-Distanzmessung.

use crate::app::collaborators::{ExportFormat, Notification, Notifier, SceneExporter};
use crate::app::error::EditorError;
use crate::app::events::{EventBus, EventPayload};
use crate::app::history::push_bounded;
use crate::app::state::{EditorTool, StateStore};
use crate::app::subscription::{Subscribers, Subscription};
use crate::core::{Measurement, MeasurementPoint, MeasurementUnit, PointPosition};
use crate::shared::EditorOptions;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::mem::discriminant;
use std::rc::Rc;

/// Visuelle Artefakte, die der Renderer über der Karte zeichnet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementOverlay {
    /// Gesetzte Punkte
    pub markers: Vec<PointPosition>,
    /// Verbindungslinie der abgeschlossenen Messung
    pub line: Option<[PointPosition; 2]>,
    /// Beschriftung der Linie (z.B. "5.00 m")
    pub label: Option<String>,
}

impl MeasurementOverlay {
    /// `true`, wenn nichts zu zeichnen ist.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.line.is_none()
    }
}

/// Führt den Messablauf: Modus an, zwei Punkte, Ergebnis, Verlauf.
///
/// Nach einem vollständigen Paar wird der Punktpuffer geleert; der nächste
/// Punkt beginnt eine neue Messung. Der Verlauf ist auf
/// `measurement_history_limit` Einträge begrenzt (älteste fallen weg).
pub struct MeasurementEngine {
    store: Rc<StateStore>,
    bus: Rc<EventBus>,
    exporter: Rc<dyn SceneExporter>,
    notifier: Rc<dyn Notifier>,
    units_per_pixel: Cell<f64>,
    unit: MeasurementUnit,
    history_limit: usize,
    active: Cell<bool>,
    buffer: RefCell<Vec<MeasurementPoint>>,
    current: RefCell<Option<Measurement>>,
    history: RefCell<VecDeque<Measurement>>,
    overlay: RefCell<MeasurementOverlay>,
    history_observers: Subscribers<VecDeque<Measurement>>,
}

impl MeasurementEngine {
    /// Erstellt die Engine.
    pub fn new(
        store: Rc<StateStore>,
        bus: Rc<EventBus>,
        exporter: Rc<dyn SceneExporter>,
        notifier: Rc<dyn Notifier>,
        options: &EditorOptions,
    ) -> Self {
        Self {
            store,
            bus,
            exporter,
            notifier,
            units_per_pixel: Cell::new(options.units_per_pixel),
            unit: options.measurement_unit,
            history_limit: options.measurement_history_limit,
            active: Cell::new(false),
            buffer: RefCell::new(Vec::with_capacity(2)),
            current: RefCell::new(None),
            history: RefCell::new(VecDeque::new()),
            overlay: RefCell::new(MeasurementOverlay::default()),
            history_observers: Subscribers::new(),
        }
    }

    /// Aktiviert den Messmodus; verwirft angefangene Punkte und das Overlay.
    ///
    /// Ist der Modus bereits aktiv, bleibt alles unverändert (auch ein
    /// angefangenes Paar).
    pub fn enable_measurement_mode(&self) -> Result<(), EditorError> {
        if self.active.get() {
            return Ok(());
        }
        let changed = self.store.get().current_tool != EditorTool::Measure;
        self.store.set_current_tool(EditorTool::Measure)?;
        self.active.set(true);
        self.buffer.borrow_mut().clear();
        *self.overlay.borrow_mut() = MeasurementOverlay::default();
        *self.current.borrow_mut() = None;
        if changed {
            self.bus.emit(EventPayload::ToolChanged {
                tool: EditorTool::Measure,
            });
        }
        log::debug!("Messmodus aktiviert");
        Ok(())
    }

    /// Beendet den Messmodus und übergibt an `next`; Ergebnis und Verlauf
    /// bleiben erhalten.
    ///
    /// `next` wird genau einmal gesetzt und mit einem `ToolChanged` gemeldet.
    /// `EditorTool::Measure` als Nachfolger wird als `Select` behandelt.
    pub fn disable_measurement_mode(&self, next: EditorTool) -> Result<(), EditorError> {
        if !self.active.replace(false) {
            return Ok(());
        }
        let next = match next {
            EditorTool::Measure => EditorTool::Select,
            other => other,
        };
        self.buffer.borrow_mut().clear();
        self.overlay.borrow_mut().markers.clear();
        if self.store.get().current_tool == EditorTool::Measure {
            self.store.set_current_tool(next)?;
            self.bus.emit(EventPayload::ToolChanged { tool: next });
        }
        log::debug!("Messmodus beendet, weiter mit {:?}", next);
        Ok(())
    }

    /// `true`, solange der Messmodus aktiv ist.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Setzt einen Messpunkt.
    ///
    /// Liefert die Messung, wenn der Punkt ein Paar vervollständigt. Ungültige
    /// Punkte (nicht endlich, außerhalb des Wertebereichs, anderer
    /// Koordinatenraum als der erste Punkt) werden geloggt und übersprungen.
    pub fn add_measurement_point(&self, point: MeasurementPoint) -> Option<Measurement> {
        if !self.active.get() {
            log::debug!("Messpunkt außerhalb des Messmodus ignoriert");
            return None;
        }
        if let Err(e) = self.validate(&point) {
            log::warn!("Messpunkt übersprungen: {}", e);
            return None;
        }

        let pair = {
            let mut buffer = self.buffer.borrow_mut();
            let mut overlay = self.overlay.borrow_mut();
            if buffer.is_empty() {
                *overlay = MeasurementOverlay::default();
            }
            buffer.push(point);
            overlay.markers.push(point.position);
            if buffer.len() < 2 {
                return None;
            }
            let pair = (buffer[0], buffer[1]);
            buffer.clear();
            pair
        };

        let measurement =
            Measurement::between(&pair.0, &pair.1, self.units_per_pixel.get(), self.unit)?;
        {
            let mut overlay = self.overlay.borrow_mut();
            overlay.line = Some([measurement.source_point, measurement.target_point]);
            overlay.label = Some(measurement.to_string());
        }
        *self.current.borrow_mut() = Some(measurement.clone());
        let snapshot = {
            let mut history = self.history.borrow_mut();
            push_bounded(&mut history, measurement.clone(), self.history_limit);
            history.clone()
        };

        log::info!("Messung abgeschlossen: {}", measurement);
        self.bus.emit(EventPayload::MeasurementCompleted {
            measurement: measurement.clone(),
        });
        self.history_observers.notify(&snapshot);
        Some(measurement)
    }

    fn validate(&self, point: &MeasurementPoint) -> Result<(), EditorError> {
        if !point.position.is_valid() {
            return Err(EditorError::Validation(format!(
                "ungültige Koordinate {:?}",
                point.position
            )));
        }
        let buffer = self.buffer.borrow();
        if let Some(first) = buffer.first() {
            if discriminant(&first.position) != discriminant(&point.position) {
                return Err(EditorError::Validation(
                    "Screen- und Geo-Punkte können nicht gemischt werden".into(),
                ));
            }
        }
        Ok(())
    }

    /// Verwirft angefangene Punkte, Overlay und aktuelle Messung (der Verlauf bleibt).
    pub fn clear_measurements(&self) {
        self.buffer.borrow_mut().clear();
        *self.overlay.borrow_mut() = MeasurementOverlay::default();
        *self.current.borrow_mut() = None;
    }

    /// Leert den Messverlauf.
    pub fn clear_history(&self) {
        let snapshot = {
            let mut history = self.history.borrow_mut();
            if history.is_empty() {
                return;
            }
            history.clear();
            history.clone()
        };
        self.history_observers.notify(&snapshot);
    }

    /// Exportiert den Messverlauf über den Szenen-Exporter.
    ///
    /// Fehler erreichen den Benutzer als Hinweis, nicht als Rückgabefehler.
    pub fn export_measurements(&self, format: ExportFormat) -> Option<String> {
        let measurements: Vec<Measurement> = self.history.borrow().iter().cloned().collect();
        if measurements.is_empty() {
            self.notifier
                .notify(Notification::info("Keine Messungen zum Exportieren"));
            return None;
        }
        match self.exporter.export(format, &measurements) {
            Ok(artifact) => {
                log::info!("{} Messungen exportiert nach {}", measurements.len(), artifact);
                self.notifier.notify(Notification::success(format!(
                    "{} Messungen exportiert: {}",
                    measurements.len(),
                    artifact
                )));
                Some(artifact)
            }
            Err(e) => {
                log::error!("Export der Messungen fehlgeschlagen: {:#}", e);
                self.notifier
                    .notify(Notification::error(format!("Export fehlgeschlagen: {e}")));
                None
            }
        }
    }

    /// Zuletzt abgeschlossene Messung.
    pub fn current_measurement(&self) -> Option<Measurement> {
        self.current.borrow().clone()
    }

    /// Messverlauf, älteste zuerst.
    pub fn history(&self) -> Vec<Measurement> {
        self.history.borrow().iter().cloned().collect()
    }

    /// Aktuelle visuelle Artefakte.
    pub fn overlay(&self) -> MeasurementOverlay {
        self.overlay.borrow().clone()
    }

    /// Anzahl gepufferter Punkte (0 oder 1 zwischen zwei Messungen).
    pub fn pending_points(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// Beobachtet Änderungen des Messverlaufs.
    pub fn on_history_changed(
        &self,
        callback: impl FnMut(&VecDeque<Measurement>) + 'static,
    ) -> Subscription {
        self.history_observers.subscribe(callback)
    }

    /// Setzt den Maßstab für Screen-Messungen. Nicht-positive Werte werden verworfen.
    pub fn set_units_per_pixel(&self, units_per_pixel: f64) -> bool {
        if !(units_per_pixel.is_finite() && units_per_pixel > 0.0) {
            log::warn!("Ungültiger Maßstab {} ignoriert", units_per_pixel);
            return false;
        }
        self.units_per_pixel.set(units_per_pixel);
        true
    }

    /// Aktueller Maßstab.
    pub fn units_per_pixel(&self) -> f64 {
        self.units_per_pixel.get()
    }

    pub(crate) fn teardown(&self) {
        self.active.set(false);
        self.history_observers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::collaborators::{NotificationLevel, StaticLayerCatalog};
    use crate::app::events::EventKind;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: RefCell<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.borrow_mut().push(notification);
        }
    }

    struct Exporter {
        fail: bool,
    }

    impl SceneExporter for Exporter {
        fn export(
            &self,
            format: ExportFormat,
            measurements: &[Measurement],
        ) -> anyhow::Result<String> {
            anyhow::ensure!(!self.fail, "Encoder nicht verfügbar");
            Ok(format!("messungen-{}.{:?}", measurements.len(), format).to_lowercase())
        }
    }

    struct Fixture {
        store: Rc<StateStore>,
        bus: Rc<EventBus>,
        notifier: Rc<RecordingNotifier>,
        engine: MeasurementEngine,
    }

    fn fixture_with(options: EditorOptions, fail_export: bool) -> Fixture {
        let store = Rc::new(StateStore::new(
            &options,
            Rc::new(StaticLayerCatalog::default()),
        ));
        let bus = Rc::new(EventBus::new());
        let notifier = Rc::new(RecordingNotifier::default());
        let engine = MeasurementEngine::new(
            Rc::clone(&store),
            Rc::clone(&bus),
            Rc::new(Exporter { fail: fail_export }),
            notifier.clone(),
            &options,
        );
        Fixture {
            store,
            bus,
            notifier,
            engine,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(EditorOptions::default(), false)
    }

    #[test]
    fn screen_pair_yields_euclidean_distance() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        assert_eq!(f.store.get().current_tool, EditorTool::Measure);

        assert!(f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0)).is_none());
        let m = f
            .engine
            .add_measurement_point(MeasurementPoint::screen(3.0, 4.0))
            .expect("Paar vollständig");
        assert_relative_eq!(m.distance, 5.0, epsilon = 1e-12);
        assert_eq!(m.unit, MeasurementUnit::Meters);
        assert_eq!(f.engine.current_measurement(), Some(m.clone()));
        assert_eq!(f.engine.overlay().label.as_deref(), Some("5.00 m"));
    }

    #[test]
    fn geo_pair_yields_great_circle_distance() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::geo(0.0, 0.0));
        let m = f
            .engine
            .add_measurement_point(MeasurementPoint::geo(0.0, 1.0))
            .expect("Paar vollständig");
        assert_eq!(m.unit, MeasurementUnit::Kilometers);
        assert_relative_eq!(m.distance, 111.19, max_relative = 0.01);
    }

    #[test]
    fn completion_is_dispatched_on_the_bus() {
        let f = fixture();
        let stream = f.bus.stream(Some(EventKind::MeasurementCompleted));
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 2.0));

        let events = stream.drain();
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            EventPayload::MeasurementCompleted { measurement } => {
                assert_relative_eq!(measurement.distance, 2.0)
            }
            other => panic!("unerwartetes Ereignis {other:?}"),
        }
    }

    #[test]
    fn third_point_starts_a_new_pair() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(3.0, 4.0));
        assert_eq!(f.engine.pending_points(), 0);

        assert!(f.engine.add_measurement_point(MeasurementPoint::screen(10.0, 10.0)).is_none());
        let overlay = f.engine.overlay();
        assert_eq!(overlay.markers.len(), 1);
        assert!(overlay.line.is_none());

        let m = f
            .engine
            .add_measurement_point(MeasurementPoint::screen(10.0, 11.0))
            .expect("zweites Paar");
        assert_relative_eq!(m.distance, 1.0);
        assert_eq!(f.engine.history().len(), 2);
    }

    #[test]
    fn invalid_points_are_skipped() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        assert!(f
            .engine
            .add_measurement_point(MeasurementPoint::screen(f64::NAN, 0.0))
            .is_none());
        assert!(f.engine.add_measurement_point(MeasurementPoint::geo(91.0, 0.0)).is_none());
        assert_eq!(f.engine.pending_points(), 0);

        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        assert!(f.engine.add_measurement_point(MeasurementPoint::geo(0.0, 1.0)).is_none());
        assert_eq!(f.engine.pending_points(), 1, "gemischter Punkt wird verworfen");
    }

    #[test]
    fn points_outside_measurement_mode_are_ignored() {
        let f = fixture();
        assert!(f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0)).is_none());
        assert_eq!(f.engine.pending_points(), 0);
    }

    #[test]
    fn history_is_bounded_fifo() {
        let options = EditorOptions {
            measurement_history_limit: 3,
            ..EditorOptions::default()
        };
        let f = fixture_with(options, false);
        f.engine.enable_measurement_mode().expect("aktiv");
        for i in 1..=5 {
            f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
            f.engine
                .add_measurement_point(MeasurementPoint::screen(f64::from(i), 0.0));
        }
        let distances: Vec<f64> = f.engine.history().iter().map(|m| m.distance).collect();
        assert_eq!(distances, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn clear_keeps_history_but_drops_current_and_overlay() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(1.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(5.0, 0.0));

        f.engine.clear_measurements();
        assert_eq!(f.engine.pending_points(), 0);
        assert!(f.engine.overlay().is_empty());
        assert!(f.engine.current_measurement().is_none());
        assert_eq!(f.engine.history().len(), 1);
    }

    #[test]
    fn disabling_restores_select_tool_and_keeps_result() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(1.0, 0.0));

        f.engine
            .disable_measurement_mode(EditorTool::Select)
            .expect("aktiv");
        assert!(!f.engine.is_active());
        assert_eq!(f.store.get().current_tool, EditorTool::Select);
        assert!(f.engine.current_measurement().is_some());
        assert!(f.engine.overlay().line.is_some());
    }

    #[test]
    fn enabling_twice_keeps_the_pending_point() {
        let f = fixture();
        let stream = f.bus.stream(Some(EventKind::ToolChanged));
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));

        f.engine.enable_measurement_mode().expect("aktiv");
        assert_eq!(f.engine.pending_points(), 1);
        assert!(f
            .engine
            .add_measurement_point(MeasurementPoint::screen(0.0, 3.0))
            .is_some());
        assert_eq!(stream.drain().len(), 1);
    }

    #[test]
    fn disabling_hands_over_to_the_next_tool_once() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        let tools = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&tools);
        let _sub = f
            .store
            .subscribe(move |state| sink.borrow_mut().push(state.current_tool));
        let stream = f.bus.stream(Some(EventKind::ToolChanged));

        f.engine
            .disable_measurement_mode(EditorTool::Pan)
            .expect("aktiv");

        assert_eq!(*tools.borrow(), vec![EditorTool::Pan]);
        let events = stream.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            EventPayload::ToolChanged {
                tool: EditorTool::Pan
            }
        );
    }

    #[test]
    fn clearing_history_notifies_observers_once() {
        let f = fixture();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sizes);
        let _sub = f
            .engine
            .on_history_changed(move |history| sink.borrow_mut().push(history.len()));

        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(1.0, 0.0));
        f.engine.clear_history();
        f.engine.clear_history();

        assert_eq!(*sizes.borrow(), vec![1, 0]);
        assert!(f.engine.history().is_empty());
        assert!(f.engine.current_measurement().is_some());
    }

    #[test]
    fn export_failure_becomes_a_user_notification() {
        let f = fixture_with(EditorOptions::default(), true);
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(1.0, 0.0));

        assert!(f.engine.export_measurements(ExportFormat::Pdf).is_none());
        let seen = f.notifier.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, NotificationLevel::Error);
    }

    #[test]
    fn export_success_is_confirmed() {
        let f = fixture();
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        f.engine.add_measurement_point(MeasurementPoint::screen(1.0, 0.0));

        assert_eq!(
            f.engine.export_measurements(ExportFormat::Json).as_deref(),
            Some("messungen-1.json")
        );
        assert_eq!(f.notifier.seen.borrow()[0].level, NotificationLevel::Success);
    }

    #[test]
    fn scale_applies_to_following_screen_measurements() {
        let f = fixture();
        assert!(!f.engine.set_units_per_pixel(0.0));
        assert!(f.engine.set_units_per_pixel(0.5));
        f.engine.enable_measurement_mode().expect("aktiv");
        f.engine.add_measurement_point(MeasurementPoint::screen(0.0, 0.0));
        let m = f
            .engine
            .add_measurement_point(MeasurementPoint::screen(0.0, 10.0))
            .expect("Paar vollständig");
        assert_relative_eq!(m.distance, 5.0);
    }
}
