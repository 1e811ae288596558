//! Host adapter for the Treeline mutation bridge.
//!
//! The [`Bridge`] turns the tree-edit callbacks a diffing client issues
//! into an ordered operation log, batches one update cycle's operations
//! into a single boundary call, keeps the event registry in sync with the
//! remote tree's node lifetimes, and replays remotely produced events back
//! into the client through [`Bridge::dispatch_pending`].

pub mod adapter;
pub mod batch;
pub mod dispatch;
pub mod props;
pub mod registry;

pub use adapter::{Bridge, Instance};
pub use batch::BatchBuffer;
pub use props::{EventHandler, Props};
pub use registry::EventRegistry;

pub use treeline_core::{
    BatchError, BridgeError, EventKind, EventModifiers, EventPayload, NodeId, Operation,
    RemoteTree,
};
