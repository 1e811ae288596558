//! Replaying remotely produced events into local callbacks.

use crate::adapter::Bridge;
use treeline_core::BridgeError;

impl Bridge {
    /// Drains and dispatches events until the remote side reports none.
    ///
    /// Each drained payload is looked up in the registry and its callback
    /// invoked synchronously, in the order the remote produced them. A
    /// callback may re-enter the bridge (queue operations, commit, even
    /// dispatch) and anything that work makes the remote tree produce is
    /// picked up by the next drain, so this returns only once the system
    /// has settled. Termination relies on the remote eventually yielding an
    /// empty drain.
    ///
    /// Events naming an unknown node or an unregistered kind are dropped:
    /// the handler may legitimately have been removed in the same cycle
    /// that produced the event.
    pub fn dispatch_pending(&self) -> Result<(), BridgeError> {
        let remote = self.remote()?;
        loop {
            let events = remote.borrow_mut().drain_events();
            if events.is_empty() {
                return Ok(());
            }
            for event in events {
                // Clone the handler out so the registry borrow is released
                // before user code runs.
                let handler = self
                    .inner
                    .registry
                    .borrow()
                    .lookup(event.node_id, event.kind);
                match handler {
                    Some(handler) => handler(&event),
                    None => {
                        log::debug!(
                            "dropping {} event for node {} with no registered handler",
                            event.kind,
                            event.node_id
                        );
                    }
                }
            }
        }
    }
}
