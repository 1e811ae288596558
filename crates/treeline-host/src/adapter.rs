//! The mutation bridge: tree-edit callbacks in, queued operations out.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use treeline_core::{
    apply_operation, BridgeError, IdAllocator, NodeId, Operation, RemoteTree,
};

use crate::batch::BatchBuffer;
use crate::props::Props;
use crate::registry::EventRegistry;

/// Local shadow of one remote node, owned by the diffing client.
///
/// Holds the last props the bridge sent so the next `commit_update` can
/// diff handlers and custom properties against them. The remote node's
/// lifetime is governed separately, by the operation log.
///
/// Clones are cheap handles to the same remote node; keep updates flowing
/// through one clone, since each carries its own props snapshot.
#[derive(Clone, Debug)]
pub struct Instance {
    id: NodeId,
    kind: String,
    props: Props,
}

impl Instance {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }
}

pub(crate) struct BridgeInner {
    remote: RefCell<Option<Rc<RefCell<dyn RemoteTree>>>>,
    pub(crate) ids: IdAllocator,
    pub(crate) registry: RefCell<EventRegistry>,
    pub(crate) buffer: RefCell<BatchBuffer>,
}

/// The host adapter's context object.
///
/// Owns the identity allocator, the event registry, and the batching
/// buffer; cloning hands out another handle to the same bridge, which is
/// how event handlers re-enter it. Everything is single-threaded.
#[derive(Clone)]
pub struct Bridge {
    pub(crate) inner: Rc<BridgeInner>,
}

impl Bridge {
    /// A bridge with no remote attached yet. Every mutating call fails with
    /// [`BridgeError::MissingRemote`] until [`Bridge::attach_remote`] runs.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BridgeInner {
                remote: RefCell::new(None),
                ids: IdAllocator::new(),
                registry: RefCell::new(EventRegistry::new()),
                buffer: RefCell::new(BatchBuffer::new()),
            }),
        }
    }

    pub fn with_remote(remote: Rc<RefCell<dyn RemoteTree>>) -> Self {
        let bridge = Self::new();
        bridge.attach_remote(remote);
        bridge
    }

    /// Attaches the remote tree and picks the buffering mode from its
    /// declared bulk-apply support.
    pub fn attach_remote(&self, remote: Rc<RefCell<dyn RemoteTree>>) {
        let batched = remote.borrow().supports_batching();
        self.inner.buffer.borrow_mut().set_immediate(!batched);
        if !batched {
            log::debug!("remote reports no bulk apply; using one call per operation");
        }
        *self.inner.remote.borrow_mut() = Some(remote);
    }

    pub(crate) fn remote(&self) -> Result<Rc<RefCell<dyn RemoteTree>>, BridgeError> {
        self.inner
            .remote
            .borrow()
            .clone()
            .ok_or(BridgeError::MissingRemote)
    }

    /// Queues one operation, or calls straight through in immediate mode.
    fn queue_op(&self, op: Operation) -> Result<(), BridgeError> {
        let remote = self.remote()?;
        if self.inner.buffer.borrow().is_immediate() {
            let destroyed = apply_operation(&mut *remote.borrow_mut(), &op);
            if !destroyed.is_empty() {
                let mut registry = self.inner.registry.borrow_mut();
                for id in destroyed {
                    registry.unregister_node(id);
                }
            }
        } else {
            self.inner.buffer.borrow_mut().enqueue(op);
        }
        Ok(())
    }

    // ── Create ──────────────────────────────────────────────────────

    /// Allocates an identity and queues the node's creation followed by its
    /// initial property set: style, then event flags, then custom
    /// properties, in that order.
    pub fn create_instance(&self, kind: &str, props: Props) -> Result<Instance, BridgeError> {
        let id = self.inner.ids.next_id();
        self.queue_op(Operation::CreateNode {
            id,
            kind: kind.to_string(),
        })?;
        self.send_style(id, &props)?;
        for (event, handler) in &props.handlers {
            // Registry first: an event racing the flag update must always
            // find its handler.
            self.inner
                .registry
                .borrow_mut()
                .register(id, *event, handler.clone());
            self.queue_op(Operation::SetEventFlag {
                id,
                event: *event,
                enabled: true,
            })?;
        }
        for (key, value) in &props.custom {
            self.queue_op(Operation::SetCustomProperty {
                id,
                key: key.clone(),
                value: value.clone(),
            })?;
        }
        Ok(Instance {
            id,
            kind: kind.to_string(),
            props,
        })
    }

    pub fn create_text_instance(&self, text: &str) -> Result<Instance, BridgeError> {
        let id = self.inner.ids.next_id();
        self.queue_op(Operation::CreateNode {
            id,
            kind: "text".to_string(),
        })?;
        self.queue_op(Operation::SetText {
            id,
            text: text.to_string(),
        })?;
        Ok(Instance {
            id,
            kind: "text".to_string(),
            props: Props::new(),
        })
    }

    // ── Structure ───────────────────────────────────────────────────

    pub fn append_child(&self, parent: &Instance, child: &Instance) -> Result<(), BridgeError> {
        self.queue_op(Operation::AppendChild {
            parent: parent.id,
            child: child.id,
        })
    }

    pub fn remove_child(&self, parent: &Instance, child: &Instance) -> Result<(), BridgeError> {
        self.queue_op(Operation::RemoveChild {
            parent: parent.id,
            child: child.id,
        })
    }

    pub fn insert_before(
        &self,
        parent: &Instance,
        child: &Instance,
        before: &Instance,
    ) -> Result<(), BridgeError> {
        self.queue_op(Operation::InsertBefore {
            parent: parent.id,
            child: child.id,
            before: before.id,
        })
    }

    pub fn set_root(&self, root: &Instance) -> Result<(), BridgeError> {
        self.queue_op(Operation::SetRoot { id: root.id })
    }

    // ── Update ──────────────────────────────────────────────────────

    /// Applies a property-set change: the style object is always resent in
    /// full, handlers and custom properties are diffed key by key.
    pub fn commit_update(
        &self,
        instance: &mut Instance,
        new_props: Props,
    ) -> Result<(), BridgeError> {
        self.send_style(instance.id, &new_props)?;
        self.diff_handlers(instance.id, &instance.props, &new_props)?;
        self.diff_custom(instance.id, &instance.props, &new_props)?;
        instance.props = new_props;
        Ok(())
    }

    pub fn commit_text_update(&self, instance: &Instance, text: &str) -> Result<(), BridgeError> {
        self.queue_op(Operation::SetText {
            id: instance.id,
            text: text.to_string(),
        })
    }

    /// Resends the full style object. Diffing a style bag risks missing
    /// updates when the client mutates a reused object in place; the bag is
    /// small, so resending wins. Absent style is sent as `{}` so removal
    /// takes effect remotely.
    fn send_style(&self, id: NodeId, props: &Props) -> Result<(), BridgeError> {
        let style = props.style.clone().unwrap_or_else(|| json!({}));
        self.queue_op(Operation::SetStyle { id, style })
    }

    fn diff_handlers(&self, id: NodeId, old: &Props, new: &Props) -> Result<(), BridgeError> {
        for (event, old_handler) in &old.handlers {
            match new.handlers.get(event) {
                None => {
                    self.inner.registry.borrow_mut().unregister(id, *event);
                    self.queue_op(Operation::SetEventFlag {
                        id,
                        event: *event,
                        enabled: false,
                    })?;
                }
                Some(new_handler) if !Rc::ptr_eq(old_handler, new_handler) => {
                    // Changed callback: swap the registration, flag is
                    // already enabled remotely.
                    self.inner
                        .registry
                        .borrow_mut()
                        .register(id, *event, new_handler.clone());
                }
                Some(_) => {}
            }
        }
        for (event, handler) in &new.handlers {
            if !old.handlers.contains_key(event) {
                self.inner
                    .registry
                    .borrow_mut()
                    .register(id, *event, handler.clone());
                self.queue_op(Operation::SetEventFlag {
                    id,
                    event: *event,
                    enabled: true,
                })?;
            }
        }
        Ok(())
    }

    fn diff_custom(&self, id: NodeId, old: &Props, new: &Props) -> Result<(), BridgeError> {
        for (key, value) in &new.custom {
            if old.custom.get(key) != Some(value) {
                self.queue_op(Operation::SetCustomProperty {
                    id,
                    key: key.clone(),
                    value: value.clone(),
                })?;
            }
        }
        for key in old.custom.keys() {
            if !new.custom.contains_key(key) {
                // Removal must be explicit: null clears the key remotely.
                self.queue_op(Operation::SetCustomProperty {
                    id,
                    key: key.clone(),
                    value: Value::Null,
                })?;
            }
        }
        Ok(())
    }

    // ── Destroy ─────────────────────────────────────────────────────

    /// Queues the node's destruction. Registrations are left in place until
    /// the flush reports the id as destroyed; the remote side decides what
    /// a destroy actually cascades to.
    pub fn destroy_instance(&self, instance: &Instance) -> Result<(), BridgeError> {
        self.queue_op(Operation::DestroyNode { id: instance.id })
    }

    // ── Cycle boundary ──────────────────────────────────────────────

    /// Ends the update cycle: flushes the queue as one boundary call and
    /// fires the commit signal. Call exactly once per cycle.
    pub fn commit(&self) -> Result<(), BridgeError> {
        let remote = self.remote()?;
        let mut buffer = self.inner.buffer.borrow_mut();
        let mut registry = self.inner.registry.borrow_mut();
        let mut remote_tree = remote.borrow_mut();
        buffer.flush(&mut *remote_tree, &mut registry)
    }

    /// Abandons the current cycle: drops every unflushed operation and the
    /// registrations added for nodes those operations would have created.
    /// Ids are not reclaimed. Registrations touched for already-flushed
    /// nodes are kept even though their queued `SetEventFlag` ops are
    /// dropped; the next cycle that updates those nodes resends the flags.
    pub fn discard_pending(&self) {
        let dropped = self.inner.buffer.borrow_mut().discard();
        if dropped.is_empty() {
            return;
        }
        let mut registry = self.inner.registry.borrow_mut();
        for op in &dropped {
            if let Some(id) = op.created_id() {
                registry.unregister_node(id);
            }
        }
        log::debug!("discarded {} ops from an abandoned cycle", dropped.len());
    }

    /// Clears registry, buffer, and identity state for a fresh top-level
    /// render. Must not run while instances from the old session are still
    /// in use.
    pub fn reset(&self) {
        self.inner.registry.borrow_mut().clear();
        self.inner.buffer.borrow_mut().clear();
        self.inner.ids.reset();
    }

    /// Number of operations queued and not yet flushed.
    pub fn pending_ops(&self) -> usize {
        self.inner.buffer.borrow().len()
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/adapter_tests.rs"]
mod tests;
