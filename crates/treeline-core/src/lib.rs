//! Contracts shared by both sides of the Treeline mutation bridge.
//!
//! This crate defines everything the host adapter and a remote retained
//! tree need to agree on without sharing memory: node identity, the closed
//! set of mutation operations and their JSON wire form, event payloads,
//! and the [`RemoteTree`] call boundary.

pub mod event;
pub mod op;
pub mod remote;

pub use event::{EventKind, EventModifiers, EventPayload};
pub use op::{decode_batch, encode_batch, Operation};
pub use remote::{apply_operation, RemoteTree};

use std::cell::Cell;
use std::fmt;

/// Process-unique node identity shared with the remote tree.
///
/// Never reused within a session; crosses the wire as a bare JSON number.
pub type NodeId = u64;

/// Issues strictly increasing [`NodeId`]s, starting at 1.
///
/// `reset` must only be called when nothing references previously issued
/// ids, in practice at the start of a fresh session or test run.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: Cell<NodeId>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> NodeId {
        let id = self.next.get() + 1;
        self.next.set(id);
        id
    }

    pub fn reset(&self) {
        self.next.set(0);
    }
}

/// Errors surfaced by the host adapter to the diffing client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No remote tree has been attached; initialization-order bug.
    MissingRemote,
    /// The remote rejected a bulk apply; the queue is preserved and the
    /// current cycle's effect is "nothing applied".
    BatchRejected { reason: String },
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::MissingRemote => {
                write!(f, "no remote tree attached; attach one before mutating")
            }
            BridgeError::BatchRejected { reason } => {
                write!(f, "remote rejected batch: {reason}")
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Errors a remote tree reports from [`RemoteTree::apply_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The ops payload could not be decoded.
    Malformed { detail: String },
    /// The remote failed while applying a decoded batch.
    Remote { detail: String },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Malformed { detail } => write!(f, "malformed batch: {detail}"),
            BatchError::Remote { detail } => write!(f, "remote apply failed: {detail}"),
        }
    }
}

impl std::error::Error for BatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_from_one() {
        let alloc = IdAllocator::new();
        let ids: Vec<NodeId> = (0..64).map(|_| alloc.next_id()).collect();
        assert_eq!(ids[0], 1);
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let alloc = IdAllocator::new();
        alloc.next_id();
        alloc.next_id();
        alloc.reset();
        assert_eq!(alloc.next_id(), 1);
    }
}
