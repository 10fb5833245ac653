//! Typed mutation-event dispatch.
//!
//! The engine notifies interested parties after each successful write.
//! Registration is explicit and typed — no string-keyed global bus —
//! and listeners fire synchronously in registration order, after the
//! mutated table has been persisted.

use std::fmt;

/// The kind of write that happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// A row was inserted.
    Insert,
    /// Rows were updated.
    Update,
    /// Rows were deleted.
    Delete,
}

/// Payload delivered to listeners after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationEvent {
    /// The mutated table.
    pub table: String,
    /// What kind of mutation ran.
    pub kind: MutationKind,
    /// Number of rows the mutation touched.
    pub affected: u64,
}

type Listener = Box<dyn FnMut(&MutationEvent)>;

/// Ordered registry of mutation listeners.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Listener>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Listeners fire in registration order.
    pub fn subscribe(&mut self, listener: impl FnMut(&MutationEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers an event to every listener, in order.
    pub fn emit(&mut self, event: &MutationEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
