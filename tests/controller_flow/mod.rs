//! Gemeinsamer Aufbau für die Controller-Flow-Tests.

pub mod layers;
pub mod measurement;
pub mod selection_and_editing;

use netmap_editor::app::{
    Collaborators, ConfirmationPrompter, ExportFormat, InMemoryElementRepository,
    MemoryPreferenceStorage, Notification, NotificationLevel, Notifier, SceneExporter,
    StaticLayerCatalog,
};
use netmap_editor::{
    AppController, AppEvent, CustomLayer, EditorContext, EditorOptions, GeoPoint, LayerCategory,
    MapElement, Measurement,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn levels(&self) -> Vec<NotificationLevel> {
        self.notifications.borrow().iter().map(|n| n.level).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}

pub struct ScriptedPrompter {
    pub answer: Cell<bool>,
    pub asked: Cell<u32>,
}

impl ConfirmationPrompter for ScriptedPrompter {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.asked.set(self.asked.get() + 1);
        self.answer.get()
    }
}

pub struct FileNameExporter;

impl SceneExporter for FileNameExporter {
    fn export(&self, format: ExportFormat, measurements: &[Measurement]) -> anyhow::Result<String> {
        Ok(format!("messungen-{}.{format:?}", measurements.len()).to_lowercase())
    }
}

pub struct Harness {
    pub controller: AppController,
    pub repository: Rc<InMemoryElementRepository>,
    pub storage: MemoryPreferenceStorage,
    pub notifier: Rc<RecordingNotifier>,
    pub prompter: Rc<ScriptedPrompter>,
    pub events: Rc<RefCell<Vec<AppEvent>>>,
}

impl Harness {
    pub fn context(&self) -> &EditorContext {
        self.controller.context()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|event| format!("{:?}", event.kind()))
            .collect()
    }
}

pub fn repository() -> InMemoryElementRepository {
    let repository = InMemoryElementRepository::new();
    repository.insert_element(MapElement::new(
        1,
        LayerCategory::Cabinets,
        "KVz Hauptstraße",
        GeoPoint::new(48.0, 11.0),
    ));
    repository.insert_element(MapElement::new(
        2,
        LayerCategory::Buildings,
        "Haus 12",
        GeoPoint::new(48.001, 11.001),
    ));
    repository.insert_element(MapElement::new(
        3,
        LayerCategory::Poles,
        "Mast 7",
        GeoPoint::new(48.002, 11.0),
    ));
    repository
}

pub fn harness_with_storage(storage: MemoryPreferenceStorage) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let repository = Rc::new(repository());
    let notifier = Rc::new(RecordingNotifier::default());
    let prompter = Rc::new(ScriptedPrompter {
        answer: Cell::new(true),
        asked: Cell::new(0),
    });
    let collaborators = Collaborators {
        elements: repository.clone(),
        exporter: Rc::new(FileNameExporter),
        prompter: prompter.clone(),
        notifier: notifier.clone(),
        catalog: Rc::new(StaticLayerCatalog::new(vec![
            CustomLayer::new("baustelle", "Baustelle Nord"),
            CustomLayer::new("planung", "Planung 2027"),
        ])),
    };

    let context = EditorContext::new(
        EditorOptions::default(),
        collaborators,
        Rc::new(storage.clone()),
    )
    .expect("Kontext sollte sich aufbauen lassen");

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    context
        .bus
        .subscribe(move |event| sink.borrow_mut().push(event.clone()));

    Harness {
        controller: AppController::new(Rc::new(context)),
        repository,
        storage,
        notifier,
        prompter,
        events,
    }
}

pub fn harness() -> Harness {
    harness_with_storage(MemoryPreferenceStorage::new())
}
