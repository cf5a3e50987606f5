//! Begrenzter Aktionsverlauf (FIFO-Verdrängung).

use crate::core::EntityRef;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Ein Eintrag im Aktionsverlauf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Anzeigetext der Aktion
    pub label: String,
    /// Zeitpunkt (Unix-Millisekunden)
    pub timestamp_ms: u64,
    /// Betroffene Entität, falls vorhanden
    pub entity: Option<EntityRef>,
}

impl HistoryItem {
    /// Erstellt einen Eintrag mit aktuellem Zeitstempel.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            timestamp_ms: super::epoch_millis(),
            entity: None,
        }
    }

    /// Verknüpft den Eintrag mit einer Entität.
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }
}

/// Hängt `item` an und verwirft vorne, bis höchstens `limit` Einträge übrig sind.
pub fn push_bounded<T>(items: &mut VecDeque<T>, item: T, limit: usize) {
    items.push_back(item);
    while items.len() > limit {
        items.pop_front();
    }
}
