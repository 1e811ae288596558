//! Mapping from (node id, event kind) to local callbacks.

use hashbrown::HashMap;

use crate::props::EventHandler;
use treeline_core::{EventKind, NodeId};

/// Per-bridge handler table consulted when remote events are replayed.
///
/// Entries follow the node's remote lifetime: they are inserted before the
/// matching `setEventFlag` operation is queued (so an event racing the flag
/// update always finds its handler) and removed only from the destroyed-id
/// list a flush returns.
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<NodeId, HashMap<EventKind, EventHandler>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a handler; returns true when this is the first handler for
    /// the (id, kind) pair, i.e. the remote flag needs enabling.
    pub fn register(&mut self, id: NodeId, kind: EventKind, handler: EventHandler) -> bool {
        self.handlers
            .entry(id)
            .or_default()
            .insert(kind, handler)
            .is_none()
    }

    /// Removes the handler for (id, kind); returns true if one was present,
    /// i.e. the remote flag needs disabling.
    pub fn unregister(&mut self, id: NodeId, kind: EventKind) -> bool {
        let Some(per_node) = self.handlers.get_mut(&id) else {
            return false;
        };
        let removed = per_node.remove(&kind).is_some();
        if per_node.is_empty() {
            self.handlers.remove(&id);
        }
        removed
    }

    /// Drops every registration for a destroyed node.
    pub fn unregister_node(&mut self, id: NodeId) {
        self.handlers.remove(&id);
    }

    pub fn lookup(&self, id: NodeId, kind: EventKind) -> Option<EventHandler> {
        self.handlers.get(&id)?.get(&kind).cloned()
    }

    pub fn has_handlers(&self, id: NodeId) -> bool {
        self.handlers.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
