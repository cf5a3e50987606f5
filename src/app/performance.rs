//! Adaptive Render-Performance: Messfenster pro Frame und einseitige Drosselung.

use crate::app::subscription::{Subscribers, Subscription};
use crate::shared::{PerformanceConfig, PerformanceOptions, PerformanceSample};
use std::cell::{Cell, RefCell};

/// Unterhalb dieses Anteils der Ziel-Bildrate wird gedrosselt.
const LOW_FPS_RATIO: f64 = 0.8;
/// Schrumpffaktor für `max_elements_per_view`.
const SHRINK_FACTOR: f64 = 0.8;

#[derive(Debug, Default)]
struct FrameWindow {
    started_ms: Option<f64>,
    frames: u32,
    render_time_sum_ms: f64,
    render_reports: u32,
    elements: u32,
    connections: u32,
}

impl FrameWindow {
    fn restart(&mut self, now_ms: f64) {
        self.started_ms = Some(now_ms);
        self.frames = 0;
        self.render_time_sum_ms = 0.0;
        self.render_reports = 0;
    }
}

/// Sammelt Frame-Statistiken und verschärft die Render-Konfiguration bei
/// anhaltend niedriger Bildrate.
///
/// Die Drosselung wirkt nur in eine Richtung: erholt sich die Bildrate,
/// bleibt die Konfiguration bis zu einem expliziten [`reset_config`] bestehen.
///
/// [`reset_config`]: PerformanceController::reset_config
pub struct PerformanceController {
    options: PerformanceOptions,
    config: Cell<PerformanceConfig>,
    monitoring: Cell<bool>,
    window: RefCell<FrameWindow>,
    last_sample: Cell<Option<PerformanceSample>>,
    sample_seq: Cell<u64>,
    optimized_seq: Cell<Option<u64>>,
    samples: Subscribers<PerformanceSample>,
    config_changed: Subscribers<PerformanceConfig>,
}

impl PerformanceController {
    /// Erstellt den Controller mit der Startkonfiguration aus den Optionen.
    pub fn new(options: &PerformanceOptions) -> Self {
        Self {
            options: options.clone(),
            config: Cell::new(PerformanceConfig::from_options(options)),
            monitoring: Cell::new(false),
            window: RefCell::new(FrameWindow::default()),
            last_sample: Cell::new(None),
            sample_seq: Cell::new(0),
            optimized_seq: Cell::new(None),
            samples: Subscribers::new(),
            config_changed: Subscribers::new(),
        }
    }

    /// Startet die Messung; das erste `on_frame` eröffnet das Messfenster.
    pub fn start_monitoring(&self) {
        if self.monitoring.replace(true) {
            return;
        }
        self.window.borrow_mut().started_ms = None;
        log::debug!("Performance-Monitoring gestartet");
    }

    /// Beendet die Messung und verwirft das laufende Fenster.
    pub fn stop_monitoring(&self) {
        if !self.monitoring.replace(false) {
            return;
        }
        *self.window.borrow_mut() = FrameWindow::default();
        log::debug!("Performance-Monitoring gestoppt");
    }

    /// `true`, solange gemessen wird.
    pub fn is_monitoring(&self) -> bool {
        self.monitoring.get()
    }

    /// Meldet einen Frame-Tick (Zeitstempel in ms, monoton).
    ///
    /// Liefert die Messung, wenn mit diesem Tick ein Messfenster abgeschlossen wurde.
    pub fn on_frame(&self, now_ms: f64) -> Option<PerformanceSample> {
        if !self.monitoring.get() || !now_ms.is_finite() {
            return None;
        }

        let sample = {
            let mut window = self.window.borrow_mut();
            let Some(started) = window.started_ms else {
                window.restart(now_ms);
                return None;
            };
            window.frames += 1;
            let elapsed = now_ms - started;
            if elapsed < self.options.sampling_window_ms || elapsed <= 0.0 {
                return None;
            }
            let render_time_ms = if window.render_reports > 0 {
                window.render_time_sum_ms / f64::from(window.render_reports)
            } else {
                0.0
            };
            let sample = PerformanceSample {
                fps: f64::from(window.frames) * 1000.0 / elapsed,
                elements_rendered: window.elements,
                connections_rendered: window.connections,
                render_time_ms,
            };
            window.restart(now_ms);
            sample
        };

        self.last_sample.set(Some(sample));
        self.sample_seq.set(self.sample_seq.get() + 1);
        log::trace!(
            "Performance: {:.1} fps, {} Elemente, {:.2} ms",
            sample.fps,
            sample.elements_rendered,
            sample.render_time_ms
        );
        self.samples.notify(&sample);

        if self.is_low_fps(&sample) {
            self.auto_optimize();
        }
        Some(sample)
    }

    /// Vom Renderer nach jedem Zeichnen gemeldete Werte; fließen in die nächste Messung ein.
    pub fn update_rendering_info(&self, elements: u32, connections: u32, render_time_ms: f64) {
        let mut window = self.window.borrow_mut();
        window.elements = elements;
        window.connections = connections;
        if render_time_ms.is_finite() && render_time_ms >= 0.0 {
            window.render_time_sum_ms += render_time_ms;
            window.render_reports += 1;
        } else {
            log::debug!("Ungültige Renderzeit {} ignoriert", render_time_ms);
        }
    }

    fn is_low_fps(&self, sample: &PerformanceSample) -> bool {
        sample.fps < LOW_FPS_RATIO * self.config.get().fps_target
    }

    /// Verschärft die Konfiguration um genau einen Schritt, wenn die letzte
    /// Messung unter 80 % der Ziel-Bildrate liegt.
    ///
    /// Reihenfolge: `max_elements_per_view` × 0,8 (nicht unter die Untergrenze),
    /// sonst Clustering, sonst Virtualisierung. Pro Messung wird höchstens
    /// einmal verschärft. Gibt `true` zurück, wenn sich etwas geändert hat.
    pub fn auto_optimize(&self) -> bool {
        let Some(sample) = self.last_sample.get() else {
            return false;
        };
        if !self.is_low_fps(&sample) {
            return false;
        }
        let seq = self.sample_seq.get();
        if self.optimized_seq.get() == Some(seq) {
            return false;
        }
        self.optimized_seq.set(Some(seq));

        let mut config = self.config.get();
        let floor = self.options.max_elements_floor;
        let shrunk = ((f64::from(config.max_elements_per_view) * SHRINK_FACTOR) as u32).max(floor);
        if shrunk < config.max_elements_per_view {
            config.max_elements_per_view = shrunk;
        } else if !config.use_clustering {
            config.use_clustering = true;
        } else if !config.use_virtualization {
            config.use_virtualization = true;
        } else {
            return false;
        }

        log::info!(
            "Performance-Drosselung bei {:.1} fps: max {} Elemente, Clustering {}, Virtualisierung {}",
            sample.fps,
            config.max_elements_per_view,
            config.use_clustering,
            config.use_virtualization
        );
        self.set_config(config);
        true
    }

    /// Stellt die Startkonfiguration wieder her.
    pub fn reset_config(&self) {
        self.optimized_seq.set(None);
        self.set_config(PerformanceConfig::from_options(&self.options));
    }

    fn set_config(&self, config: PerformanceConfig) {
        if self.config.replace(config) != config {
            self.config_changed.notify(&config);
        }
    }

    /// Aktuelle Konfiguration.
    pub fn config(&self) -> PerformanceConfig {
        self.config.get()
    }

    /// Letzte abgeschlossene Messung.
    pub fn last_sample(&self) -> Option<PerformanceSample> {
        self.last_sample.get()
    }

    /// Beobachtet abgeschlossene Messungen.
    pub fn on_sample(&self, callback: impl FnMut(&PerformanceSample) + 'static) -> Subscription {
        self.samples.subscribe(callback)
    }

    /// Beobachtet tatsächliche Konfigurationsänderungen.
    pub fn on_config_changed(
        &self,
        callback: impl FnMut(&PerformanceConfig) + 'static,
    ) -> Subscription {
        self.config_changed.subscribe(callback)
    }

    /// Clustering lohnt sich nur, wenn aktiviert und die Elementzahl die Schwelle übersteigt.
    pub fn should_use_clustering(&self, element_count: usize) -> bool {
        self.config.get().use_clustering && element_count > self.options.clustering_threshold
    }

    /// GPU-Rendering, sobald die letzte Messung mehr Elemente als die Schwelle zeigte.
    pub fn should_use_gpu_rendering(&self) -> bool {
        self.last_sample
            .get()
            .is_some_and(|sample| sample.elements_rendered > self.options.gpu_rendering_threshold)
    }

    /// Virtualisierung (nur sichtbare Elemente rendern) ist eingeschaltet.
    pub fn should_use_virtualization(&self) -> bool {
        self.config.get().use_virtualization
    }

    /// Aktuelles Element-Budget pro Ansicht.
    pub fn max_elements_per_view(&self) -> u32 {
        self.config.get().max_elements_per_view
    }

    /// Meldet alle Beobachter ab und stoppt die Messung.
    pub fn teardown(&self) {
        self.stop_monitoring();
        self.samples.clear();
        self.config_changed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    /// 50 fps, liegt über 80 % von 60 fps
    const FRAME_50: f64 = 20.0;

    fn controller() -> PerformanceController {
        let controller = PerformanceController::new(&PerformanceOptions::default());
        controller.start_monitoring();
        controller
    }

    /// Simuliert `frames` Ticks im Abstand `interval` ab `start` (erster Tick eröffnet).
    fn run_window(
        controller: &PerformanceController,
        start: f64,
        frames: u32,
        interval: f64,
    ) -> Option<PerformanceSample> {
        let mut sample = None;
        for i in 0..frames {
            if let Some(s) = controller.on_frame(start + f64::from(i + 1) * interval) {
                sample = Some(s);
            }
        }
        sample
    }

    #[test]
    fn computes_fps_over_the_sampling_window() {
        let controller = controller();
        assert!(controller.on_frame(0.0).is_none());
        controller.update_rendering_info(300, 120, 4.0);
        controller.update_rendering_info(310, 125, 6.0);

        let sample = run_window(&controller, 0.0, 50, FRAME_50).expect("Fenster abgeschlossen");
        assert_relative_eq!(sample.fps, 50.0, epsilon = 1e-9);
        assert_eq!(sample.elements_rendered, 310);
        assert_eq!(sample.connections_rendered, 125);
        assert_relative_eq!(sample.render_time_ms, 5.0);
        assert_eq!(controller.config(), PerformanceConfig::default());
    }

    #[test]
    fn ignores_ticks_while_stopped() {
        let controller = PerformanceController::new(&PerformanceOptions::default());
        assert!(controller.on_frame(0.0).is_none());
        assert!(controller.on_frame(2000.0).is_none());
        assert!(controller.last_sample().is_none());
    }

    #[test]
    fn low_fps_tightens_in_order_down_to_the_floor() {
        let controller = controller();
        controller.on_frame(0.0);

        let mut maxima = Vec::new();
        let mut start = 0.0;
        while controller.max_elements_per_view() > 100 {
            run_window(&controller, start, 20, 50.0).expect("20 fps");
            start += 1000.0;
            maxima.push(controller.max_elements_per_view());
            assert!(!controller.config().use_clustering);
        }
        assert_eq!(&maxima[..3], &[800, 640, 512]);
        assert_eq!(*maxima.last().expect("mindestens ein Schritt"), 100);

        run_window(&controller, start, 20, 50.0);
        start += 1000.0;
        assert!(controller.config().use_clustering);
        assert!(!controller.should_use_virtualization());

        run_window(&controller, start, 20, 50.0);
        assert!(controller.should_use_virtualization());
        assert_eq!(controller.max_elements_per_view(), 100);
    }

    #[test]
    fn auto_optimize_is_idempotent_per_sample_and_at_fixed_point() {
        let controller = controller();
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        let _sub = controller.on_config_changed(move |_| counter.set(counter.get() + 1));

        controller.on_frame(0.0);
        run_window(&controller, 0.0, 10, 100.0);
        let after_sample = controller.config();
        assert!(!controller.auto_optimize());
        assert_eq!(controller.config(), after_sample);
        assert_eq!(changes.get(), 1);

        // Fixpunkt: alles verschärft, weitere Messungen ändern nichts
        let mut start = 1000.0;
        for _ in 0..30 {
            run_window(&controller, start, 10, 100.0);
            start += 1000.0;
        }
        let fixed = controller.config();
        assert!(fixed.use_clustering && fixed.use_virtualization);
        let notified = changes.get();
        run_window(&controller, start, 10, 100.0);
        assert_eq!(controller.config(), fixed);
        assert_eq!(changes.get(), notified);
    }

    #[test]
    fn recovery_does_not_relax_until_reset() {
        let controller = controller();
        controller.on_frame(0.0);
        run_window(&controller, 0.0, 10, 100.0);
        let tightened = controller.config();
        assert_eq!(tightened.max_elements_per_view, 800);

        run_window(&controller, 1000.0, 50, FRAME_50);
        assert_eq!(controller.config(), tightened);

        controller.reset_config();
        assert_eq!(controller.config(), PerformanceConfig::default());
    }

    #[test]
    fn queries_read_config_and_last_sample() {
        let controller = controller();
        assert!(!controller.should_use_clustering(10_000));
        assert!(!controller.should_use_gpu_rendering());

        controller.on_frame(0.0);
        controller.update_rendering_info(6_000, 0, 1.0);
        run_window(&controller, 0.0, 50, FRAME_50);
        assert!(controller.should_use_gpu_rendering());

        controller.update_rendering_info(10, 0, 1.0);
        run_window(&controller, 1000.0, 50, FRAME_50);
        assert!(!controller.should_use_gpu_rendering());
    }

    #[test]
    fn sample_subscribers_receive_each_window() {
        let controller = controller();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = controller.on_sample(move |sample| sink.borrow_mut().push(sample.fps));

        controller.on_frame(0.0);
        run_window(&controller, 0.0, 50, FRAME_50);
        run_window(&controller, 1000.0, 25, 40.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_relative_eq!(seen[1], 25.0, epsilon = 1e-9);
    }
}
