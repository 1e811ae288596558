//! Mock remote tree for exercising the bridge without a real renderer.
//!
//! [`MockTree`] stores nodes the way a retained renderer would, records
//! every applied operation in an ordered op log, and lets tests inject
//! buffered events and deterministic batch failures. Its `apply_batch`
//! decodes the wire form and funnels each operation through the same
//! single-call methods, so the op log reflects the exact application order
//! either way.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use treeline_core::{
    apply_operation, decode_batch, BatchError, EventKind, EventPayload, NodeId, RemoteTree,
};

/// One retained node as the mock remembers it.
#[derive(Debug, Clone)]
pub struct MockNode {
    pub id: NodeId,
    pub kind: String,
    pub style: Value,
    pub text: Option<String>,
    pub events: HashSet<EventKind>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub custom: IndexMap<String, Value>,
}

impl MockNode {
    fn new(id: NodeId, kind: &str) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            style: Value::Null,
            text: None,
            events: HashSet::new(),
            children: Vec::new(),
            parent: None,
            custom: IndexMap::new(),
        }
    }

    pub fn has_event(&self, kind: EventKind) -> bool {
        self.events.contains(&kind)
    }
}

/// In-memory [`RemoteTree`] with an op log and event simulation hooks.
#[derive(Debug, Default)]
pub struct MockTree {
    nodes: HashMap<NodeId, MockNode>,
    root: Option<NodeId>,
    op_log: Vec<String>,
    pending: VecDeque<EventPayload>,
    commit_count: usize,
    batch_count: usize,
    fail_next_batch: Option<String>,
    unbatched: bool,
}

impl MockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that reports no bulk-apply support, forcing the bridge into
    /// one-call-per-operation mode.
    pub fn unbatched() -> Self {
        Self {
            unbatched: true,
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> Rc<RefCell<MockTree>> {
        Rc::new(RefCell::new(self))
    }

    /// Makes the next `apply_batch` call fail with the given reason,
    /// without touching any state.
    pub fn fail_next_batch(&mut self, reason: &str) {
        self.fail_next_batch = Some(reason.to_string());
    }

    /// Queues an event as if the remote tree had produced it.
    pub fn emit(&mut self, payload: EventPayload) {
        self.pending.push_back(payload);
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    // ── Inspection ──────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&MockNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root(&self) -> Option<&MockNode> {
        self.root.and_then(|id| self.nodes.get(&id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_kind(&self, kind: &str) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.kind == kind)
            .map(|node| node.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All text content reachable from the root, depth-first.
    pub fn all_text(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_text(root, &mut out);
        }
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut Vec<String>) {
        if let Some(node) = self.nodes.get(&id) {
            if let Some(text) = &node.text {
                out.push(text.clone());
            }
            for child in &node.children {
                self.collect_text(*child, out);
            }
        }
    }

    pub fn op_log(&self) -> &[String] {
        &self.op_log
    }

    pub fn take_op_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.op_log)
    }

    pub fn commit_count(&self) -> usize {
        self.commit_count
    }

    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    // ── Internals ───────────────────────────────────────────────────

    fn log(&mut self, entry: String) {
        self.op_log.push(entry);
    }

    fn detach_from_parent(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes.get(&child).and_then(|node| node.parent) {
            if let Some(parent) = self.nodes.get_mut(&old_parent) {
                parent.children.retain(|c| *c != child);
            }
        }
    }

    fn destroy_recursive(&mut self, id: NodeId, destroyed: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.remove(&id) {
            destroyed.push(id);
            for child in node.children {
                self.destroy_recursive(child, destroyed);
            }
        }
    }
}

impl RemoteTree for MockTree {
    fn create_node(&mut self, id: NodeId, kind: &str) {
        self.log(format!("createNode({id}, {kind})"));
        self.nodes.insert(id, MockNode::new(id, kind));
    }

    fn destroy_node(&mut self, id: NodeId) -> Vec<NodeId> {
        self.log(format!("destroyNode({id})"));
        self.detach_from_parent(id);
        let mut destroyed = Vec::new();
        self.destroy_recursive(id, &mut destroyed);
        if self.root == Some(id) {
            self.root = None;
        }
        destroyed
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.log(format!("appendChild({parent}, {child})"));
        self.detach_from_parent(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.log(format!("removeChild({parent}, {child})"));
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        self.log(format!("insertBefore({parent}, {child}, {before})"));
        self.detach_from_parent(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            // Unknown anchor appends at the end.
            let position = node
                .children
                .iter()
                .position(|c| *c == before)
                .unwrap_or(node.children.len());
            node.children.insert(position, child);
        }
    }

    fn set_style(&mut self, id: NodeId, style: &Value) {
        self.log(format!("setStyle({id}, {style})"));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.style = style.clone();
        }
    }

    fn set_text(&mut self, id: NodeId, text: &str) {
        self.log(format!("setText({id}, {text})"));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = Some(text.to_string());
        }
    }

    fn set_event_flag(&mut self, id: NodeId, event: EventKind, enabled: bool) {
        self.log(format!("setEventFlag({id}, {event}, {enabled})"));
        if let Some(node) = self.nodes.get_mut(&id) {
            if enabled {
                node.events.insert(event);
            } else {
                node.events.remove(&event);
            }
        }
    }

    fn set_custom_property(&mut self, id: NodeId, key: &str, value: &Value) {
        self.log(format!("setCustomProperty({id}, {key}, {value})"));
        if let Some(node) = self.nodes.get_mut(&id) {
            // Null removes the key, mirroring explicit-removal semantics.
            if value.is_null() {
                node.custom.shift_remove(key);
            } else {
                node.custom.insert(key.to_string(), value.clone());
            }
        }
    }

    fn set_root(&mut self, id: NodeId) {
        self.log(format!("setRoot({id})"));
        self.root = Some(id);
    }

    fn commit(&mut self) {
        self.log("commit()".to_string());
        self.commit_count += 1;
    }

    fn apply_batch(&mut self, ops_json: &str) -> Result<Vec<NodeId>, BatchError> {
        self.batch_count += 1;
        if let Some(reason) = self.fail_next_batch.take() {
            return Err(BatchError::Remote { detail: reason });
        }
        let ops = decode_batch(ops_json)?;
        let mut destroyed = Vec::new();
        for op in &ops {
            destroyed.extend(apply_operation(self, op));
        }
        Ok(destroyed)
    }

    fn drain_events(&mut self) -> Vec<EventPayload> {
        self.pending.drain(..).collect()
    }

    fn supports_batching(&self) -> bool {
        !self.unbatched
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn destroy_cascades_and_reports_all_ids() {
        let mut tree = MockTree::new();
        tree.create_node(1, "box");
        tree.create_node(2, "box");
        tree.create_node(3, "text");
        tree.append_child(1, 2);
        tree.append_child(2, 3);
        tree.set_root(1);

        let destroyed = tree.destroy_node(1);
        assert_eq!(destroyed, vec![1, 2, 3]);
        assert!(tree.is_empty());
        assert_eq!(tree.root_id(), None);
    }

    #[test]
    fn destroying_a_subtree_detaches_it_from_its_parent() {
        let mut tree = MockTree::new();
        tree.create_node(1, "box");
        tree.create_node(2, "box");
        tree.append_child(1, 2);

        tree.destroy_node(2);
        assert_eq!(tree.node(1).map(|n| n.children.clone()), Some(vec![]));
    }

    #[test]
    fn insert_before_unknown_anchor_appends() {
        let mut tree = MockTree::new();
        tree.create_node(1, "box");
        tree.create_node(2, "box");
        tree.create_node(3, "box");
        tree.append_child(1, 2);
        tree.insert_before(1, 3, 99);
        assert_eq!(tree.node(1).map(|n| n.children.clone()), Some(vec![2, 3]));
    }

    #[test]
    fn reparenting_moves_the_child() {
        let mut tree = MockTree::new();
        tree.create_node(1, "box");
        tree.create_node(2, "box");
        tree.create_node(3, "text");
        tree.append_child(1, 3);
        tree.append_child(2, 3);
        assert_eq!(tree.node(1).map(|n| n.children.clone()), Some(vec![]));
        assert_eq!(tree.node(2).map(|n| n.children.clone()), Some(vec![3]));
        assert_eq!(tree.node(3).and_then(|n| n.parent), Some(2));
    }

    #[test]
    fn null_custom_property_removes_the_key() {
        let mut tree = MockTree::new();
        tree.create_node(1, "image");
        tree.set_custom_property(1, "src", &json!("logo.png"));
        assert_eq!(tree.node(1).and_then(|n| n.custom.get("src")).cloned(), Some(json!("logo.png")));
        tree.set_custom_property(1, "src", &Value::Null);
        assert!(tree.node(1).map(|n| n.custom.is_empty()).unwrap_or(false));
    }

    #[test]
    fn apply_batch_applies_in_order_and_logs_each_op() {
        let mut tree = MockTree::new();
        let batch = r#"[["createNode",1,"box"],["setStyle",1,{"width":100}],["setRoot",1]]"#;
        let destroyed = tree.apply_batch(batch).expect("batch applies");
        assert!(destroyed.is_empty());
        assert_eq!(
            tree.op_log(),
            [
                "createNode(1, box)",
                "setStyle(1, {\"width\":100})",
                "setRoot(1)",
            ]
        );
        assert_eq!(tree.root_id(), Some(1));
    }

    #[test]
    fn failed_batch_leaves_state_untouched() {
        let mut tree = MockTree::new();
        tree.fail_next_batch("remote panicked");
        let err = tree
            .apply_batch(r#"[["createNode",1,"box"]]"#)
            .unwrap_err();
        assert!(matches!(err, BatchError::Remote { .. }));
        assert!(tree.is_empty());
        assert_eq!(tree.batch_count(), 1);
    }

    #[test]
    fn all_text_walks_depth_first() {
        let mut tree = MockTree::new();
        tree.create_node(1, "box");
        tree.create_node(2, "text");
        tree.create_node(3, "text");
        tree.set_text(2, "first");
        tree.set_text(3, "second");
        tree.append_child(1, 2);
        tree.append_child(1, 3);
        tree.set_root(1);
        assert_eq!(tree.all_text(), ["first", "second"]);
    }
}
