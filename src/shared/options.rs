//! Zentrale Konfiguration für den Netzplan-Editor.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use crate::core::{LayerCategory, MeasurementUnit};
use serde::{Deserialize, Serialize};

// ── Zoom ────────────────────────────────────────────────────────────

/// Minimale Zoomstufe der Karte.
pub const ZOOM_LEVEL_MIN: f64 = 1.0;
/// Maximale Zoomstufe der Karte.
pub const ZOOM_LEVEL_MAX: f64 = 19.0;
/// Zoomstufe beim Start.
pub const ZOOM_LEVEL_DEFAULT: f64 = 13.0;
/// Schrittweite für stufenweises Zoomen (Toolbar / Shortcuts).
pub const ZOOM_STEP: f64 = 1.0;

// ── Verlauf ─────────────────────────────────────────────────────────

/// Maximale Anzahl an Einträgen im Aktionsverlauf.
pub const HISTORY_LIMIT: usize = 50;

// ── Layer-Persistenz ────────────────────────────────────────────────

/// Entprell-Fenster für Layer-Schreibvorgänge in Millisekunden.
pub const LAYER_PERSIST_DEBOUNCE_MS: u64 = 300;

// ── Performance ─────────────────────────────────────────────────────

/// Ziel-Bildrate.
pub const FPS_TARGET: f64 = 60.0;
/// Maximale Anzahl gleichzeitig gerenderter Elemente.
pub const MAX_ELEMENTS_PER_VIEW: u32 = 1000;
/// Untergrenze beim automatischen Verkleinern von `max_elements_per_view`.
pub const MAX_ELEMENTS_FLOOR: u32 = 100;
/// Länge eines Messfensters für die FPS-Berechnung in Millisekunden.
pub const SAMPLING_WINDOW_MS: f64 = 1000.0;
/// Ab dieser Elementanzahl wird bei aktivem Clustering gruppiert.
pub const CLUSTERING_THRESHOLD: usize = 100;
/// Ab dieser Anzahl gerenderter Elemente wird GPU-Rendering empfohlen.
pub const GPU_RENDERING_THRESHOLD: u32 = 5000;

// ── Messung ─────────────────────────────────────────────────────────

/// Einheiten pro Screen-Pixel für planare Messungen.
pub const UNITS_PER_PIXEL: f64 = 1.0;
/// Maximale Anzahl gespeicherter Messungen (älteste werden verworfen).
pub const MEASUREMENT_HISTORY_LIMIT: usize = 100;

/// Standardwerte und Regelparameter des Performance-Controllers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceOptions {
    /// Ziel-Bildrate
    pub fps_target: f64,
    /// Startwert für `max_elements_per_view`
    pub max_elements_per_view: u32,
    /// Untergrenze für `max_elements_per_view`
    pub max_elements_floor: u32,
    /// Messfenster in Millisekunden
    pub sampling_window_ms: f64,
    /// Schwelle für Clustering
    pub clustering_threshold: usize,
    /// Schwelle für GPU-Rendering
    pub gpu_rendering_threshold: u32,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            fps_target: FPS_TARGET,
            max_elements_per_view: MAX_ELEMENTS_PER_VIEW,
            max_elements_floor: MAX_ELEMENTS_FLOOR,
            sampling_window_ms: SAMPLING_WINDOW_MS,
            clustering_threshold: CLUSTERING_THRESHOLD,
            gpu_rendering_threshold: GPU_RENDERING_THRESHOLD,
        }
    }
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `netmap_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorOptions {
    // ── Zoom ────────────────────────────────────────────────────
    /// Minimale Zoomstufe
    pub zoom_level_min: f64,
    /// Maximale Zoomstufe
    pub zoom_level_max: f64,
    /// Zoomstufe beim Start und nach Reset
    pub zoom_level_default: f64,
    /// Schrittweite für Zoom-In/-Out
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,

    // ── Layer ───────────────────────────────────────────────────
    /// Aktive Layer beim ersten Start bzw. nach "Standard wiederherstellen"
    pub default_layers: Vec<LayerCategory>,
    /// Entprell-Fenster für Layer-Persistenz (ms)
    #[serde(default = "default_layer_persist_debounce_ms")]
    pub layer_persist_debounce_ms: u64,

    // ── Messung ─────────────────────────────────────────────────
    /// Einheiten pro Pixel für planare Messungen
    pub units_per_pixel: f64,
    /// Einheit planarer Messungen
    #[serde(default)]
    pub measurement_unit: MeasurementUnit,
    /// Maximale Länge des Messverlaufs
    #[serde(default = "default_measurement_history_limit")]
    pub measurement_history_limit: usize,

    // ── Performance ─────────────────────────────────────────────
    /// Regelparameter des Performance-Controllers
    #[serde(default)]
    pub performance: PerformanceOptions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            zoom_level_min: ZOOM_LEVEL_MIN,
            zoom_level_max: ZOOM_LEVEL_MAX,
            zoom_level_default: ZOOM_LEVEL_DEFAULT,
            zoom_step: ZOOM_STEP,

            default_layers: LayerCategory::DEFAULT_ACTIVE.to_vec(),
            layer_persist_debounce_ms: LAYER_PERSIST_DEBOUNCE_MS,

            units_per_pixel: UNITS_PER_PIXEL,
            measurement_unit: MeasurementUnit::Meters,
            measurement_history_limit: MEASUREMENT_HISTORY_LIMIT,

            performance: PerformanceOptions::default(),
        }
    }
}

/// Serde-Default für `zoom_step` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_zoom_step() -> f64 {
    ZOOM_STEP
}

/// Serde-Default für `layer_persist_debounce_ms`.
fn default_layer_persist_debounce_ms() -> u64 {
    LAYER_PERSIST_DEBOUNCE_MS
}

/// Serde-Default für `measurement_history_limit`.
fn default_measurement_history_limit() -> usize {
    MEASUREMENT_HISTORY_LIMIT
}

impl EditorOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts.sanitized()
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        Self::config_dir().join("netmap_editor.toml")
    }

    /// Verzeichnis der Binary (Fallback: Arbeitsverzeichnis).
    pub fn config_dir() -> std::path::PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(std::path::Path::to_path_buf))
            .unwrap_or_else(|| std::path::PathBuf::from("."))
    }

    /// Begrenzt eine Zoomstufe auf den konfigurierten Bereich.
    pub fn clamp_zoom(&self, zoom_level: f64) -> f64 {
        if zoom_level.is_nan() {
            return self.zoom_level_default;
        }
        zoom_level.clamp(self.zoom_level_min, self.zoom_level_max)
    }

    /// Korrigiert inkonsistente Werte aus handbearbeiteten Dateien.
    fn sanitized(mut self) -> Self {
        if !(self.zoom_level_min.is_finite()
            && self.zoom_level_max.is_finite()
            && self.zoom_level_min <= self.zoom_level_max)
        {
            log::warn!(
                "Ungültiger Zoom-Bereich {}..{}, verwende Standard",
                self.zoom_level_min,
                self.zoom_level_max
            );
            self.zoom_level_min = ZOOM_LEVEL_MIN;
            self.zoom_level_max = ZOOM_LEVEL_MAX;
        }
        self.zoom_level_default = self.clamp_zoom(self.zoom_level_default);
        if !(self.units_per_pixel.is_finite() && self.units_per_pixel > 0.0) {
            log::warn!(
                "Ungültiger Maßstab {} Einheiten/Pixel, verwende {}",
                self.units_per_pixel,
                UNITS_PER_PIXEL
            );
            self.units_per_pixel = UNITS_PER_PIXEL;
        }
        self.performance.max_elements_floor = self.performance.max_elements_floor.max(1);
        if !self.performance.sampling_window_ms.is_finite() {
            log::warn!(
                "Ungültiges Messfenster {}, verwende {} ms",
                self.performance.sampling_window_ms,
                SAMPLING_WINDOW_MS
            );
            self.performance.sampling_window_ms = SAMPLING_WINDOW_MS;
        }
        self.performance.sampling_window_ms = self.performance.sampling_window_ms.max(1.0);
        self.measurement_history_limit = self.measurement_history_limit.max(1);
        self
    }
}
