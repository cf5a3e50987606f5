#![no_main]

use libfuzzer_sys::fuzz_target;
use netmap_editor::app::{
    Collaborators, ConfirmationPrompter, ExportFormat, InMemoryElementRepository,
    LayerPreference, LogNotifier, MemoryPreferenceStorage, SceneExporter, StaticLayerCatalog,
    LAYER_PREFERENCE_KEY,
};
use netmap_editor::{EditorContext, EditorOptions, Measurement};
use std::rc::Rc;

struct NoExport;

impl SceneExporter for NoExport {
    fn export(&self, _format: ExportFormat, _measurements: &[Measurement]) -> anyhow::Result<String> {
        anyhow::bail!("kein Export")
    }
}

struct Decline;

impl ConfirmationPrompter for Decline {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        false
    }
}

// Beliebige gespeicherte Präferenzen dürfen den Start nie verhindern und
// müssen danach immer einen gültigen Datensatz hinterlassen.
fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let storage = MemoryPreferenceStorage::new();
    storage.insert(LAYER_PREFERENCE_KEY, raw);

    let collaborators = Collaborators {
        elements: Rc::new(InMemoryElementRepository::new()),
        exporter: Rc::new(NoExport),
        prompter: Rc::new(Decline),
        notifier: Rc::new(LogNotifier),
        catalog: Rc::new(StaticLayerCatalog::default()),
    };
    let context = EditorContext::new(
        EditorOptions::default(),
        collaborators,
        Rc::new(storage.clone()),
    )
    .expect("Start darf an gespeicherten Daten nicht scheitern");

    if let Some(stored) = storage.get(LAYER_PREFERENCE_KEY) {
        if stored != raw {
            LayerPreference::parse(&stored).expect("neu geschriebener Datensatz ist gültig");
        }
    }
    context.teardown();
});
