//! One update cycle's operation queue and its flush protocol.

use treeline_core::{encode_batch, BridgeError, NodeId, Operation, RemoteTree};

use crate::registry::EventRegistry;

/// Accumulates queued operations between flushes.
///
/// In batched mode the whole queue crosses the boundary in one
/// `apply_batch` call per update cycle. In immediate mode (the remote
/// reports no bulk support) the bridge calls through per operation and the
/// queue stays empty; only the commit signal remains per cycle.
#[derive(Default)]
pub struct BatchBuffer {
    queue: Vec<Operation>,
    immediate: bool,
}

impl BatchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_immediate(&mut self, immediate: bool) {
        self.immediate = immediate;
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub fn enqueue(&mut self, op: Operation) {
        self.queue.push(op);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn ops(&self) -> &[Operation] {
        &self.queue
    }

    /// Drops all queued operations without applying them, returning them so
    /// the caller can undo bookkeeping tied to the abandoned cycle.
    pub fn discard(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.queue)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Flushes the cycle: at most one bulk call, registry cleanup driven by
    /// the returned destroyed ids, then the separate commit signal.
    ///
    /// On failure the queue is left exactly as it was: operation order is
    /// significant and the remote's partial-application state is unknown,
    /// so nothing is retried or dropped here.
    pub fn flush(
        &mut self,
        remote: &mut dyn RemoteTree,
        registry: &mut EventRegistry,
    ) -> Result<(), BridgeError> {
        if self.queue.is_empty() {
            remote.commit();
            return Ok(());
        }
        let ops_json = encode_batch(&self.queue).map_err(|err| BridgeError::BatchRejected {
            reason: err.to_string(),
        })?;
        let destroyed: Vec<NodeId> =
            remote
                .apply_batch(&ops_json)
                .map_err(|err| BridgeError::BatchRejected {
                    reason: err.to_string(),
                })?;
        log::debug!(
            "flushed {} ops in one batch; {} nodes destroyed",
            self.queue.len(),
            destroyed.len()
        );
        for id in destroyed {
            registry.unregister_node(id);
        }
        self.queue.clear();
        remote.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use treeline_testing::MockTree;

    use super::*;
    use treeline_core::EventKind;

    fn create_op(id: NodeId) -> Operation {
        Operation::CreateNode {
            id,
            kind: "box".to_string(),
        }
    }

    #[test]
    fn empty_flush_still_commits_without_a_bulk_call() {
        let mut buffer = BatchBuffer::new();
        let mut registry = EventRegistry::new();
        let mut tree = MockTree::new();
        buffer.flush(&mut tree, &mut registry).expect("flush");
        assert_eq!(tree.commit_count(), 1);
        assert_eq!(tree.batch_count(), 0);
    }

    #[test]
    fn flush_sends_one_batch_then_commits() {
        let mut buffer = BatchBuffer::new();
        let mut registry = EventRegistry::new();
        let mut tree = MockTree::new();
        buffer.enqueue(create_op(1));
        buffer.enqueue(Operation::SetStyle {
            id: 1,
            style: json!({ "width": 100 }),
        });
        buffer.flush(&mut tree, &mut registry).expect("flush");
        assert!(buffer.is_empty());
        assert_eq!(tree.batch_count(), 1);
        assert_eq!(
            tree.op_log(),
            [
                "createNode(1, box)",
                "setStyle(1, {\"width\":100})",
                "commit()",
            ]
        );
    }

    #[test]
    fn failed_flush_preserves_the_queue() {
        let mut buffer = BatchBuffer::new();
        let mut registry = EventRegistry::new();
        let mut tree = MockTree::new();
        buffer.enqueue(create_op(1));
        buffer.enqueue(create_op(2));
        let before = buffer.len();

        tree.fail_next_batch("deterministic failure");
        let err = buffer.flush(&mut tree, &mut registry).unwrap_err();
        assert!(matches!(err, BridgeError::BatchRejected { .. }));
        assert_eq!(buffer.len(), before);
        // No commit signal for the failed cycle.
        assert_eq!(tree.commit_count(), 0);

        // A later flush retries the identical queue.
        buffer.flush(&mut tree, &mut registry).expect("retry");
        assert!(buffer.is_empty());
        assert!(tree.contains(1));
        assert!(tree.contains(2));
    }

    #[test]
    fn destroyed_ids_clean_the_registry_before_commit() {
        let mut buffer = BatchBuffer::new();
        let mut registry = EventRegistry::new();
        let mut tree = MockTree::new();
        buffer.enqueue(create_op(5));
        buffer.flush(&mut tree, &mut registry).expect("create");

        registry.register(5, EventKind::Click, std::rc::Rc::new(|_| {}));
        buffer.enqueue(Operation::DestroyNode { id: 5 });
        buffer.flush(&mut tree, &mut registry).expect("destroy");
        assert!(!registry.has_handlers(5));
        assert!(!tree.contains(5));
    }
}
