//! Callback-Registry für Beobachter mit expliziter Abmeldung.
//!
//! Wird von `StateStore`, `EventBus` und `PerformanceController` geteilt.
//! Benachrichtigt wird in Registrierungsreihenfolge; Abmelden ist auch während
//! einer laufenden Benachrichtigung erlaubt.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// Typ-gelöschte Sicht auf eine Registry, damit `Subscription` nicht generisch sein muss.
trait Detach {
    fn detach(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<T: ?Sized> Detach for RefCell<Registry<T>> {
    fn detach(&self, id: u64) -> bool {
        let mut registry = self.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|(entry_id, _)| *entry_id != id);
        before != registry.entries.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.borrow()
            .entries
            .iter()
            .any(|(entry_id, _)| *entry_id == id)
    }
}

/// Registry von Beobachtern für Werte vom Typ `T`.
pub struct Subscribers<T: ?Sized + 'static> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T: ?Sized + 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Subscribers<T> {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registriert einen Beobachter. Die IDs sind monoton steigend.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            registry.next_id += 1;
            let id = registry.next_id;
            let callback: Callback<T> = Rc::new(RefCell::new(callback));
            registry.entries.push((id, callback));
            id
        };
        let registry: Weak<dyn Detach> = Rc::downgrade(&self.inner) as Weak<dyn Detach>;
        Subscription { id, registry }
    }

    /// Benachrichtigt alle aktuell registrierten Beobachter in Registrierungsreihenfolge.
    ///
    /// Beobachter, die sich während der Runde abmelden, werden übersprungen.
    /// Ein Beobachter, der bereits läuft (Re-Entrance), wird nicht erneut aufgerufen.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<(u64, Callback<T>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        for (id, callback) in callbacks {
            if !self.inner.contains(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(value),
                Err(_) => log::warn!(
                    "Beobachter #{} ist bereits aktiv, Benachrichtigung übersprungen",
                    id
                ),
            }
        }
    }

    /// Anzahl registrierter Beobachter.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Gibt `true` zurück, wenn kein Beobachter registriert ist.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Meldet alle Beobachter ab (Teardown).
    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }
}

/// Handle zum Abmelden eines Beobachters.
///
/// Fallenlassen meldet **nicht** ab; abgemeldet wird ausschließlich über
/// [`Subscription::unsubscribe`] oder den Teardown der Registry.
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    /// Meldet den Beobachter ab. Gibt `false` zurück, wenn er bereits abgemeldet war.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.detach(self.id))
    }

    /// Gibt `true` zurück, solange der Beobachter registriert ist.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }

    /// Monotone ID innerhalb der Registry.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
