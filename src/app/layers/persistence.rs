//! Abgleich der aktiven Layer zwischen StateStore und dauerhaftem Speicher.

use super::preference::{LayerPreference, PreferenceStorage, LAYER_PREFERENCE_KEY};
use crate::app::error::EditorError;
use crate::app::state::StateStore;
use crate::app::subscription::Subscription;
use crate::core::LayerCategory;
use crate::shared::EditorOptions;
use indexmap::IndexSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Ergebnis einer Batch-Operation: gültige IDs werden angewendet, ungültige
/// einzeln verworfen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerBatchOutcome {
    /// Validierte Kategorien, die angewendet wurden
    pub applied: Vec<LayerCategory>,
    /// Verworfene IDs
    pub rejected: Vec<String>,
}

/// Ausstehender Schreibvorgang (ein einziger, überschriebener Slot).
#[derive(Debug, Clone)]
struct PendingWrite {
    layers: IndexSet<LayerCategory>,
    /// Erster `poll`-Zeitpunkt nach der letzten Änderung
    since_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct SyncState {
    last_persisted: Option<IndexSet<LayerCategory>>,
    pending: Option<PendingWrite>,
}

impl SyncState {
    /// Übernimmt eine neue Menge aktiver Layer als ausstehenden Schreibvorgang.
    fn observe(&mut self, layers: &IndexSet<LayerCategory>) {
        let latest = self
            .pending
            .as_ref()
            .map(|pending| &pending.layers)
            .or(self.last_persisted.as_ref());
        if latest == Some(layers) {
            return;
        }
        if self.last_persisted.as_ref() == Some(layers) {
            // Zurück auf den gespeicherten Stand
            self.pending = None;
            return;
        }
        self.pending = Some(PendingWrite {
            layers: layers.clone(),
            since_ms: None,
        });
    }
}

/// Lädt, validiert und speichert die Menge aktiver Layer-Kategorien.
///
/// Veraltete IDs im gespeicherten Datensatz werden einzeln verworfen; ein
/// fehlender oder beschädigter Datensatz wird sofort mit der aktuellen
/// Auswahl überschrieben. Änderungen im Store werden entprellt und
/// zusammengefasst geschrieben. Schreibfehler werden nur geloggt; der Stand
/// bleibt vorgemerkt und wird beim nächsten fälligen `poll`, `flush` oder
/// `teardown` erneut geschrieben.
pub struct LayerPersistenceManager {
    store: Rc<StateStore>,
    storage: Rc<dyn PreferenceStorage>,
    valid: IndexSet<LayerCategory>,
    defaults: Vec<LayerCategory>,
    debounce_ms: u64,
    sync: Rc<RefCell<SyncState>>,
    subscription: RefCell<Option<Subscription>>,
}

impl LayerPersistenceManager {
    /// Erstellt den Manager; gültig sind zunächst alle Kategorien.
    pub fn new(
        store: Rc<StateStore>,
        storage: Rc<dyn PreferenceStorage>,
        options: &EditorOptions,
    ) -> Self {
        Self {
            store,
            storage,
            valid: LayerCategory::ALL.into_iter().collect(),
            defaults: options.default_layers.clone(),
            debounce_ms: options.layer_persist_debounce_ms,
            sync: Rc::new(RefCell::new(SyncState::default())),
            subscription: RefCell::new(None),
        }
    }

    /// Schränkt die Live-Aufzählung gültiger Kategorien ein.
    pub fn with_valid_categories(mut self, valid: impl IntoIterator<Item = LayerCategory>) -> Self {
        self.valid = valid.into_iter().collect();
        self
    }

    /// Gültige Kategorien.
    pub fn valid_categories(&self) -> &IndexSet<LayerCategory> {
        &self.valid
    }

    /// Lädt den gespeicherten Datensatz, wendet ihn an und beobachtet ab dann den Store.
    pub fn initialize(&self) -> Result<(), EditorError> {
        match self.load() {
            Some((layers, stale)) => {
                self.store.update_active_layers(layers.iter().copied())?;
                if stale {
                    self.write_now(&layers);
                } else {
                    self.sync.borrow_mut().last_persisted = Some(layers);
                }
            }
            None => {
                let state = self.store.get();
                let current: IndexSet<LayerCategory> = state
                    .active_layers
                    .iter()
                    .copied()
                    .filter(|category| self.valid.contains(category))
                    .collect();
                if current.len() != state.active_layers.len() {
                    self.store.update_active_layers(current.iter().copied())?;
                }
                self.write_now(&current);
            }
        }

        if let Some(previous) = self.subscription.borrow_mut().take() {
            previous.unsubscribe();
        }
        let sync = Rc::clone(&self.sync);
        let subscription = self.store.subscribe(move |state| {
            sync.borrow_mut().observe(&state.active_layers);
        });
        *self.subscription.borrow_mut() = Some(subscription);
        Ok(())
    }

    /// Liest und filtert den Datensatz. `None` = fehlt oder unbrauchbar.
    /// Das zweite Feld meldet, ob veraltete IDs verworfen wurden.
    fn load(&self) -> Option<(IndexSet<LayerCategory>, bool)> {
        let raw = match self.storage.read(LAYER_PREFERENCE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("Keine Layer-Präferenz gespeichert, verwende Standard-Layer");
                return None;
            }
            Err(e) => {
                log::warn!("Layer-Präferenz nicht lesbar, verwende Standard-Layer: {}", e);
                return None;
            }
        };
        let preference = match LayerPreference::parse(&raw) {
            Ok(preference) => preference,
            Err(e) => {
                log::warn!("Layer-Präferenz beschädigt, wird überschrieben: {}", e);
                return None;
            }
        };

        let mut stale = false;
        let mut layers = IndexSet::new();
        for id in &preference.active_layer_ids {
            match self.validate(id) {
                Some(category) => {
                    layers.insert(category);
                }
                None => {
                    log::warn!("Veraltete Layer-ID '{}' in Präferenz verworfen", id);
                    stale = true;
                }
            }
        }
        Some((layers, stale))
    }

    fn validate(&self, id: &str) -> Option<LayerCategory> {
        LayerCategory::from_id(id).filter(|category| self.valid.contains(category))
    }

    /// Schaltet eine Kategorie per ID um.
    ///
    /// Liefert die neue Mitgliedschaft oder `None`, wenn die ID ungültig ist.
    pub fn toggle_layer(&self, id: &str) -> Result<Option<bool>, EditorError> {
        let Some(category) = self.validate(id) else {
            log::warn!("Ungültige Layer-ID '{}' ignoriert", id);
            return Ok(None);
        };
        self.store.toggle_layer(category)?;
        Ok(Some(self.store.get().is_layer_active(category)))
    }

    /// Aktiviert alle gültigen IDs; ungültige werden einzeln verworfen.
    pub fn activate_layers<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<LayerBatchOutcome, EditorError> {
        let outcome = self.partition(ids);
        let mut layers: IndexSet<LayerCategory> =
            self.store.get().active_layers.iter().copied().collect();
        let before = layers.len();
        layers.extend(outcome.applied.iter().copied());
        if layers.len() != before {
            self.store.update_active_layers(layers)?;
        }
        Ok(outcome)
    }

    /// Deaktiviert alle gültigen IDs; ungültige werden einzeln verworfen.
    pub fn deactivate_layers<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<LayerBatchOutcome, EditorError> {
        let outcome = self.partition(ids);
        let mut layers: IndexSet<LayerCategory> =
            self.store.get().active_layers.iter().copied().collect();
        let before = layers.len();
        layers.retain(|category| !outcome.applied.contains(category));
        if layers.len() != before {
            self.store.update_active_layers(layers)?;
        }
        Ok(outcome)
    }

    fn partition<S: AsRef<str>>(&self, ids: &[S]) -> LayerBatchOutcome {
        let mut outcome = LayerBatchOutcome::default();
        for id in ids {
            let id = id.as_ref();
            match self.validate(id) {
                Some(category) if !outcome.applied.contains(&category) => {
                    outcome.applied.push(category)
                }
                Some(_) => {}
                None => {
                    log::warn!("Ungültige Layer-ID '{}' im Batch verworfen", id);
                    outcome.rejected.push(id.to_string());
                }
            }
        }
        outcome
    }

    /// Stellt die Standard-Layer her und speichert sofort.
    pub fn reset_to_default_layers(&self) -> Result<(), EditorError> {
        let layers: IndexSet<LayerCategory> = self
            .defaults
            .iter()
            .copied()
            .filter(|category| self.valid.contains(category))
            .collect();
        self.store.update_active_layers(layers.iter().copied())?;
        self.write_now(&layers);
        Ok(())
    }

    /// Schreibt einen ausstehenden Stand, sobald er `debounce_ms` lang stabil war.
    ///
    /// Wird einmal pro Frame aufgerufen; gibt `true` zurück, wenn geschrieben wurde.
    pub fn poll(&self, now_ms: u64) -> bool {
        let due = {
            let mut sync = self.sync.borrow_mut();
            let Some(pending) = sync.pending.as_mut() else {
                return false;
            };
            let since = *pending.since_ms.get_or_insert(now_ms);
            now_ms.saturating_sub(since) >= self.debounce_ms
        };
        if due {
            self.flush()
        } else {
            false
        }
    }

    /// Schreibt einen ausstehenden Stand sofort.
    pub fn flush(&self) -> bool {
        let pending = self.sync.borrow_mut().pending.take();
        match pending {
            Some(pending) => {
                self.write_now(&pending.layers);
                true
            }
            None => false,
        }
    }

    /// `true`, solange ein Schreibvorgang aussteht.
    pub fn has_pending_write(&self) -> bool {
        self.sync.borrow().pending.is_some()
    }

    /// Schreibt ausstehende Änderungen und beendet die Beobachtung.
    pub fn teardown(&self) {
        self.flush();
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
    }

    fn write_now(&self, layers: &IndexSet<LayerCategory>) {
        let preference = LayerPreference::from_layers(layers, crate::app::epoch_millis());
        let result = preference
            .to_json()
            .and_then(|json| self.storage.write(LAYER_PREFERENCE_KEY, &json));

        let mut sync = self.sync.borrow_mut();
        match result {
            Ok(()) => {
                log::debug!("Layer-Präferenz gespeichert ({} aktiv)", layers.len());
                if sync
                    .pending
                    .as_ref()
                    .is_some_and(|pending| &pending.layers == layers)
                {
                    sync.pending = None;
                }
                sync.last_persisted = Some(layers.clone());
            }
            Err(e) => {
                log::error!("Layer-Präferenz konnte nicht gespeichert werden: {}", e);
                // Neuerer Stand im Slot hat Vorrang, sonst erneut vormerken
                if sync.pending.is_none() {
                    sync.pending = Some(PendingWrite {
                        layers: layers.clone(),
                        since_ms: None,
                    });
                }
            }
        }
    }
}
