//! The closed operation set and its JSON wire codec.
//!
//! Every mutation the bridge can queue is one variant here; the remote side
//! applies a batch strictly in queue order. The wire form of one operation
//! is a JSON array `["tag", ...args]`, and a batch is a JSON array of those
//! arrays. Nothing is reordered, coalesced, or deduplicated.

use serde_json::{json, Value};

use crate::{BatchError, EventKind, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateNode { id: NodeId, kind: String },
    DestroyNode { id: NodeId },
    AppendChild { parent: NodeId, child: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
    InsertBefore { parent: NodeId, child: NodeId, before: NodeId },
    SetStyle { id: NodeId, style: Value },
    SetText { id: NodeId, text: String },
    SetEventFlag { id: NodeId, event: EventKind, enabled: bool },
    SetRoot { id: NodeId },
    SetCustomProperty { id: NodeId, key: String, value: Value },
}

impl Operation {
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::CreateNode { .. } => "createNode",
            Operation::DestroyNode { .. } => "destroyNode",
            Operation::AppendChild { .. } => "appendChild",
            Operation::RemoveChild { .. } => "removeChild",
            Operation::InsertBefore { .. } => "insertBefore",
            Operation::SetStyle { .. } => "setStyle",
            Operation::SetText { .. } => "setText",
            Operation::SetEventFlag { .. } => "setEventFlag",
            Operation::SetRoot { .. } => "setRoot",
            Operation::SetCustomProperty { .. } => "setCustomProperty",
        }
    }

    /// The id whose creation this operation announces, if any.
    pub fn created_id(&self) -> Option<NodeId> {
        match self {
            Operation::CreateNode { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn to_wire(&self) -> Value {
        match self {
            Operation::CreateNode { id, kind } => json!([self.tag(), id, kind]),
            Operation::DestroyNode { id } => json!([self.tag(), id]),
            Operation::AppendChild { parent, child } => json!([self.tag(), parent, child]),
            Operation::RemoveChild { parent, child } => json!([self.tag(), parent, child]),
            Operation::InsertBefore {
                parent,
                child,
                before,
            } => json!([self.tag(), parent, child, before]),
            Operation::SetStyle { id, style } => json!([self.tag(), id, style]),
            Operation::SetText { id, text } => json!([self.tag(), id, text]),
            Operation::SetEventFlag { id, event, enabled } => {
                json!([self.tag(), id, event.as_str(), enabled])
            }
            Operation::SetRoot { id } => json!([self.tag(), id]),
            Operation::SetCustomProperty { id, key, value } => {
                json!([self.tag(), id, key, value])
            }
        }
    }

    pub fn from_wire(value: &Value) -> Result<Operation, BatchError> {
        let parts = value
            .as_array()
            .ok_or_else(|| malformed("operation is not an array"))?;
        let tag = parts
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("operation has no string tag"))?;
        let op = match tag {
            "createNode" => Operation::CreateNode {
                id: arg_id(parts, 1)?,
                kind: arg_str(parts, 2)?.to_string(),
            },
            "destroyNode" => Operation::DestroyNode {
                id: arg_id(parts, 1)?,
            },
            "appendChild" => Operation::AppendChild {
                parent: arg_id(parts, 1)?,
                child: arg_id(parts, 2)?,
            },
            "removeChild" => Operation::RemoveChild {
                parent: arg_id(parts, 1)?,
                child: arg_id(parts, 2)?,
            },
            "insertBefore" => Operation::InsertBefore {
                parent: arg_id(parts, 1)?,
                child: arg_id(parts, 2)?,
                before: arg_id(parts, 3)?,
            },
            "setStyle" => Operation::SetStyle {
                id: arg_id(parts, 1)?,
                style: arg_value(parts, 2)?,
            },
            "setText" => Operation::SetText {
                id: arg_id(parts, 1)?,
                text: arg_str(parts, 2)?.to_string(),
            },
            "setEventFlag" => Operation::SetEventFlag {
                id: arg_id(parts, 1)?,
                event: arg_event(parts, 2)?,
                enabled: arg_bool(parts, 3)?,
            },
            "setRoot" => Operation::SetRoot {
                id: arg_id(parts, 1)?,
            },
            "setCustomProperty" => Operation::SetCustomProperty {
                id: arg_id(parts, 1)?,
                key: arg_str(parts, 2)?.to_string(),
                value: arg_value(parts, 3)?,
            },
            other => return Err(malformed(&format!("unknown operation tag `{other}`"))),
        };
        Ok(op)
    }
}

/// Encodes a batch in queue order into its single-call wire form.
pub fn encode_batch(ops: &[Operation]) -> Result<String, BatchError> {
    let wire: Vec<Value> = ops.iter().map(Operation::to_wire).collect();
    serde_json::to_string(&wire).map_err(|err| malformed(&err.to_string()))
}

/// Decodes a wire batch back into operations, preserving order.
pub fn decode_batch(ops_json: &str) -> Result<Vec<Operation>, BatchError> {
    let wire: Value =
        serde_json::from_str(ops_json).map_err(|err| malformed(&err.to_string()))?;
    let items = wire
        .as_array()
        .ok_or_else(|| malformed("batch is not an array"))?;
    items.iter().map(Operation::from_wire).collect()
}

fn malformed(detail: &str) -> BatchError {
    BatchError::Malformed {
        detail: detail.to_string(),
    }
}

fn arg(parts: &[Value], index: usize) -> Result<&Value, BatchError> {
    parts
        .get(index)
        .ok_or_else(|| malformed(&format!("missing argument {index}")))
}

fn arg_id(parts: &[Value], index: usize) -> Result<NodeId, BatchError> {
    arg(parts, index)?
        .as_u64()
        .ok_or_else(|| malformed(&format!("argument {index} is not a node id")))
}

fn arg_str<'a>(parts: &'a [Value], index: usize) -> Result<&'a str, BatchError> {
    arg(parts, index)?
        .as_str()
        .ok_or_else(|| malformed(&format!("argument {index} is not a string")))
}

fn arg_bool(parts: &[Value], index: usize) -> Result<bool, BatchError> {
    arg(parts, index)?
        .as_bool()
        .ok_or_else(|| malformed(&format!("argument {index} is not a bool")))
}

fn arg_value(parts: &[Value], index: usize) -> Result<Value, BatchError> {
    Ok(arg(parts, index)?.clone())
}

fn arg_event(parts: &[Value], index: usize) -> Result<EventKind, BatchError> {
    let name = arg_str(parts, index)?;
    EventKind::parse(name).ok_or_else(|| malformed(&format!("unknown event kind `{name}`")))
}

#[cfg(test)]
#[path = "tests/op_tests.rs"]
mod tests;
