//! Per-widget listener tables.

use std::rc::Rc;

use crate::display::Display;
use crate::event::{Event, EventType};

/// Error type listeners may return; routed to the display's exception handler.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a listener invocation.
pub type ListenerResult = Result<(), ListenerError>;

/// A registered event callback.
pub type Listener = Rc<dyn Fn(&mut Display, &mut Event) -> ListenerResult>;

/// Identifies one registration, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct ListenerTable {
    entries: Vec<(ListenerId, EventType, Listener)>,
}

impl ListenerTable {
    pub(crate) fn add(&mut self, id: ListenerId, event_type: EventType, listener: Listener) {
        self.entries.push((id, event_type, listener));
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry, _, _)| *entry == id)
    }

    pub(crate) fn hooks(&self, event_type: EventType) -> bool {
        self.entries.iter().any(|(_, ty, _)| *ty == event_type)
    }

    /// Listeners for `event_type`, cloned so they can run while the table changes.
    pub(crate) fn snapshot(&self, event_type: EventType) -> Vec<(ListenerId, Listener)> {
        self.entries
            .iter()
            .filter(|(_, ty, _)| *ty == event_type)
            .map(|(id, _, listener)| (*id, listener.clone()))
            .collect()
    }
}
