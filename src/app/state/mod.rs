//! Application State: zentrale Datenhaltung.
//!
//! `ApplicationState` ist der unveränderliche Snapshot, `StateStore` die einzige
//! Stelle, die neue Snapshots erzeugt und verteilt.

mod app_state;
mod store;

pub use app_state::{ApplicationState, EditorTool, Highlight};
pub use store::StateStore;
