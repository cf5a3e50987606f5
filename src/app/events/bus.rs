//! Typisierter Publish/Subscribe-Kanal für transiente Domänen-Ereignisse.

use super::event::{AppEvent, EventKind, EventPayload};
use crate::app::subscription::{Subscribers, Subscription};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Abbruch-Meldung auf dem separaten Cancellation-Kanal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationNotice {
    /// ID der abgebrochenen Aktion
    pub action_id: String,
    /// Begründung
    pub reason: String,
}

/// Verteilt Ereignisse an alle Beobachter und hält das zuletzt verteilte Ereignis.
///
/// Die Verteilung ist Fan-out ohne Warteschlange: wer zum Zeitpunkt des
/// Dispatch nicht registriert ist, bekommt das Ereignis nicht nachgeliefert.
/// Ein Dispatch aus einem Beobachter heraus wird erst nach der laufenden
/// Runde verteilt, damit jeder Beobachter die Erzeugungsreihenfolge sieht.
pub struct EventBus {
    subscribers: Subscribers<AppEvent>,
    cancellations: Subscribers<CancellationNotice>,
    last_event: RefCell<Option<AppEvent>>,
    pending: RefCell<VecDeque<AppEvent>>,
    dispatching: Cell<bool>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Erstellt einen leeren Bus.
    pub fn new() -> Self {
        Self {
            subscribers: Subscribers::new(),
            cancellations: Subscribers::new(),
            last_event: RefCell::new(None),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    /// Verteilt ein Ereignis und ersetzt das zuletzt bekannte Ereignis.
    pub fn dispatch(&self, event: AppEvent) {
        log::trace!("Event: {:?}", event.kind());
        *self.last_event.borrow_mut() = Some(event.clone());
        self.pending.borrow_mut().push_back(event);

        if self.dispatching.replace(true) {
            return;
        }
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else { break };
            self.subscribers.notify(&event);
        }
        self.dispatching.set(false);
    }

    /// Kurzform: verteilt `payload` mit aktuellem Zeitstempel.
    pub fn emit(&self, payload: EventPayload) {
        self.dispatch(AppEvent::now(payload));
    }

    /// Zuletzt verteiltes Ereignis (einzelner, überschriebener Slot).
    pub fn last_event(&self) -> Option<AppEvent> {
        self.last_event.borrow().clone()
    }

    /// Registriert einen Beobachter für den ungefilterten Strom.
    pub fn subscribe(&self, callback: impl FnMut(&AppEvent) + 'static) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    /// Registriert einen Beobachter, der nur Ereignisse der Art `kind` erhält.
    pub fn on(&self, kind: EventKind, mut callback: impl FnMut(&AppEvent) + 'static) -> Subscription {
        self.subscribers.subscribe(move |event| {
            if event.kind() == kind {
                callback(event);
            }
        })
    }

    /// Alias für [`EventBus::on`].
    pub fn get_events_by_type(
        &self,
        kind: EventKind,
        callback: impl FnMut(&AppEvent) + 'static,
    ) -> Subscription {
        self.on(kind, callback)
    }

    /// Öffnet einen eigenen Empfangskanal (optional gefiltert).
    ///
    /// Ereignisse werden in die Warteschlange des Streams gelegt und per
    /// [`EventStream::try_next`] bzw. [`EventStream::drain`] abgeholt.
    pub fn stream(&self, kind: Option<EventKind>) -> EventStream {
        let (sender, receiver) = mpsc::channel();
        let subscription = self.subscribers.subscribe(move |event: &AppEvent| {
            if kind.map_or(true, |kind| event.kind() == kind) {
                // Empfänger weg = Stream bereits geschlossen
                let _ = sender.send(event.clone());
            }
        });
        EventStream {
            receiver,
            subscription,
        }
    }

    /// Anzahl registrierter Beobachter (inkl. Streams).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Bricht eine Aktion ab: meldet auf dem Cancellation-Kanal und verteilt
    /// zusätzlich ein `ActionCancelled`-Ereignis.
    pub fn cancel_action(&self, action_id: &str, reason: &str) {
        log::info!("Aktion '{}' abgebrochen: {}", action_id, reason);
        self.cancellations.notify(&CancellationNotice {
            action_id: action_id.to_string(),
            reason: reason.to_string(),
        });
        self.emit(EventPayload::ActionCancelled {
            action_id: action_id.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Feuert genau dann, wenn `cancel_action` mit passender ID aufgerufen wird.
    pub fn on_action_cancelled(
        &self,
        action_id: &str,
        mut callback: impl FnMut(&CancellationNotice) + 'static,
    ) -> Subscription {
        let action_id = action_id.to_string();
        self.cancellations.subscribe(move |notice| {
            if notice.action_id == action_id {
                callback(notice);
            }
        })
    }

    /// Liefert ein kooperatives Abbruchsignal für `action_id`.
    ///
    /// Das Signal bleibt angemeldet, solange ein Klon davon existiert.
    pub fn cancellation_signal(&self, action_id: &str) -> CancellationSignal {
        let inner = Rc::new(SignalInner {
            reason: RefCell::new(None),
            subscription: RefCell::new(None),
        });
        let weak: Weak<SignalInner> = Rc::downgrade(&inner);
        let subscription = self.on_action_cancelled(action_id, move |notice| {
            if let Some(inner) = weak.upgrade() {
                let mut reason = inner.reason.borrow_mut();
                if reason.is_none() {
                    *reason = Some(notice.reason.clone());
                }
            }
        });
        *inner.subscription.borrow_mut() = Some(subscription);
        CancellationSignal { inner }
    }

    /// Führt `f` mit einem Abbruchsignal für `action_id` aus.
    ///
    /// Der Abbruch ist kooperativ: `f` muss das Signal selbst prüfen.
    pub fn with_cancellation<R>(
        &self,
        action_id: &str,
        f: impl FnOnce(&CancellationSignal) -> R,
    ) -> R {
        let signal = self.cancellation_signal(action_id);
        f(&signal)
    }

    /// Meldet alle Beobachter beider Kanäle ab.
    pub fn teardown(&self) {
        self.subscribers.clear();
        self.cancellations.clear();
        self.pending.borrow_mut().clear();
    }
}

struct SignalInner {
    reason: RefCell<Option<String>>,
    subscription: RefCell<Option<Subscription>>,
}

impl Drop for SignalInner {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            subscription.unsubscribe();
        }
    }
}

/// Kooperatives Abbruchsignal einer laufenden Aktion.
#[derive(Clone)]
pub struct CancellationSignal {
    inner: Rc<SignalInner>,
}

impl CancellationSignal {
    /// `true`, sobald die Aktion abgebrochen wurde.
    pub fn is_cancelled(&self) -> bool {
        self.inner.reason.borrow().is_some()
    }

    /// Begründung des (ersten) Abbruchs.
    pub fn reason(&self) -> Option<String> {
        self.inner.reason.borrow().clone()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("reason", &self.reason())
            .finish()
    }
}

/// Eigener Empfangskanal eines Beobachters.
///
/// Wird beim Fallenlassen automatisch abgemeldet.
pub struct EventStream {
    receiver: Receiver<AppEvent>,
    subscription: Subscription,
}

impl EventStream {
    /// Nächstes wartendes Ereignis, ohne zu blockieren.
    pub fn try_next(&self) -> Option<AppEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Holt alle wartenden Ereignisse in Empfangsreihenfolge.
    pub fn drain(&self) -> Vec<AppEvent> {
        self.receiver.try_iter().collect()
    }

    /// Meldet den Stream ab; bereits empfangene Ereignisse bleiben abholbar.
    pub fn close(&self) -> bool {
        self.subscription.unsubscribe()
    }

    /// `true`, solange der Stream Ereignisse empfängt.
    pub fn is_open(&self) -> bool {
        self.subscription.is_active()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
