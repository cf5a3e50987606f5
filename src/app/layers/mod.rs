//! Layer-Sichtbarkeit: dauerhafte Präferenz und Abgleich mit dem StateStore.

mod persistence;
mod preference;

pub use persistence::{LayerBatchOutcome, LayerPersistenceManager};
pub use preference::{
    FilePreferenceStorage, LayerPreference, MemoryPreferenceStorage, PreferenceStorage,
    LAYER_PREFERENCE_KEY,
};
