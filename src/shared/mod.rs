//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält Konfiguration und Performance-Typen, die zwischen `app` und dem
//! externen Renderer geteilt werden, um direkte Abhängigkeiten zu vermeiden.

pub mod options;
mod performance;

pub use options::{EditorOptions, PerformanceOptions, HISTORY_LIMIT};
pub use performance::{PerformanceConfig, PerformanceSample};
