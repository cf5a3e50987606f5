//! Render-Performance-Typen (shared zwischen Performance-Controller und Renderer).

use super::options::PerformanceOptions;
use serde::{Deserialize, Serialize};

/// Vom Performance-Controller abgestimmte Render-Konfiguration.
///
/// Der (externe) Renderer liest diese Werte vor jedem Frame zurück.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    /// Elemente bei hoher Dichte zu Clustern zusammenfassen
    pub use_clustering: bool,
    /// Nur sichtbare Listeneinträge / Elemente materialisieren
    pub use_virtualization: bool,
    /// Obergrenze gleichzeitig gerenderter Elemente
    pub max_elements_per_view: u32,
    /// Ziel-Bildrate
    pub fps_target: f64,
}

impl PerformanceConfig {
    /// Startkonfiguration aus den Optionen.
    pub fn from_options(options: &PerformanceOptions) -> Self {
        Self {
            use_clustering: false,
            use_virtualization: false,
            max_elements_per_view: options.max_elements_per_view,
            fps_target: options.fps_target,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self::from_options(&PerformanceOptions::default())
    }
}

/// Messwerte eines abgeschlossenen Messfensters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    /// Gemessene Bildrate im Fenster
    pub fps: f64,
    /// Zuletzt gemeldete Anzahl gerenderter Elemente
    pub elements_rendered: u32,
    /// Zuletzt gemeldete Anzahl gerenderter Verbindungen
    pub connections_rendered: u32,
    /// Mittlere Renderzeit pro gemeldetem Frame im Fenster (ms)
    pub render_time_ms: f64,
}
