//! The call boundary into the remote retained tree.

use serde_json::Value;

use crate::{BatchError, EventKind, EventPayload, NodeId, Operation};

/// Contract the bridge consumes from the remote tree owner.
///
/// The remote side owns the authoritative node graph; the bridge only ever
/// reaches it through these synchronous calls. Implementations are free to
/// perform layout, paint, and hit testing behind them.
///
/// `destroy_node` returns every id actually destroyed (cascades included):
/// that list, not client-side guesswork, drives registry cleanup. The bulk
/// form `apply_batch` returns the union of destroyed ids for the batch.
pub trait RemoteTree {
    fn create_node(&mut self, id: NodeId, kind: &str);
    fn destroy_node(&mut self, id: NodeId) -> Vec<NodeId>;
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    fn remove_child(&mut self, parent: NodeId, child: NodeId);
    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId);
    fn set_style(&mut self, id: NodeId, style: &Value);
    fn set_text(&mut self, id: NodeId, text: &str);
    fn set_event_flag(&mut self, id: NodeId, event: EventKind, enabled: bool);
    fn set_custom_property(&mut self, id: NodeId, key: &str, value: &Value);
    fn set_root(&mut self, id: NodeId);

    /// Post-batch bookkeeping signal, distinct from the bulk apply. Fired
    /// once per update cycle even when no operations were queued.
    fn commit(&mut self);

    /// Applies an encoded batch in order; returns the destroyed ids.
    fn apply_batch(&mut self, ops_json: &str) -> Result<Vec<NodeId>, BatchError>;

    /// Retrieves and clears all events buffered since the last drain.
    fn drain_events(&mut self) -> Vec<EventPayload>;

    /// Whether `apply_batch` is supported. When false the bridge degrades
    /// to one boundary call per operation.
    fn supports_batching(&self) -> bool {
        true
    }
}

/// Dispatches one operation through the single-call surface.
///
/// Shared by the bridge's unbatched fallback mode and by remote
/// implementations that build `apply_batch` on top of their own
/// single-call methods. Returns the ids a `DestroyNode` destroyed.
pub fn apply_operation(tree: &mut dyn RemoteTree, op: &Operation) -> Vec<NodeId> {
    match op {
        Operation::CreateNode { id, kind } => tree.create_node(*id, kind),
        Operation::DestroyNode { id } => return tree.destroy_node(*id),
        Operation::AppendChild { parent, child } => tree.append_child(*parent, *child),
        Operation::RemoveChild { parent, child } => tree.remove_child(*parent, *child),
        Operation::InsertBefore {
            parent,
            child,
            before,
        } => tree.insert_before(*parent, *child, *before),
        Operation::SetStyle { id, style } => tree.set_style(*id, style),
        Operation::SetText { id, text } => tree.set_text(*id, text),
        Operation::SetEventFlag { id, event, enabled } => {
            tree.set_event_flag(*id, *event, *enabled)
        }
        Operation::SetRoot { id } => tree.set_root(*id),
        Operation::SetCustomProperty { id, key, value } => {
            tree.set_custom_property(*id, key, value)
        }
    }
    Vec::new()
}
