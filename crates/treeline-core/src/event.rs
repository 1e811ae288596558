//! Interaction events produced by the remote tree and replayed locally.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// The closed set of interaction kinds a node can listen for.
///
/// Wire names are camelCase strings, matching the `setEventFlag` and
/// event-payload JSON forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Click,
    MouseDown,
    MouseDownOutside,
    MouseUp,
    MouseEnter,
    MouseLeave,
    MouseMove,
    KeyDown,
    KeyUp,
    Focus,
    Blur,
    Scroll,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::Click,
        EventKind::MouseDown,
        EventKind::MouseDownOutside,
        EventKind::MouseUp,
        EventKind::MouseEnter,
        EventKind::MouseLeave,
        EventKind::MouseMove,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::Focus,
        EventKind::Blur,
        EventKind::Scroll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::MouseDown => "mouseDown",
            EventKind::MouseDownOutside => "mouseDownOutside",
            EventKind::MouseUp => "mouseUp",
            EventKind::MouseEnter => "mouseEnter",
            EventKind::MouseLeave => "mouseLeave",
            EventKind::MouseMove => "mouseMove",
            EventKind::KeyDown => "keyDown",
            EventKind::KeyUp => "keyUp",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::Scroll => "scroll",
        }
    }

    pub fn parse(name: &str) -> Option<EventKind> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier keys held when an event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub cmd: bool,
}

/// One occurred interaction, as described by the remote tree.
///
/// Produced remotely, drained by the dispatch loop, consumed exactly once.
/// Optional fields are kind-specific: pointer events carry coordinates,
/// key events carry the key identity, scroll events carry deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub node_id: NodeId,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<EventModifiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_y: Option<f64>,
}

impl EventPayload {
    pub fn new(node_id: NodeId, kind: EventKind) -> Self {
        Self {
            node_id,
            kind,
            x: None,
            y: None,
            key: None,
            modifiers: None,
            delta_x: None,
            delta_y: None,
        }
    }

    pub fn pointer(node_id: NodeId, kind: EventKind, x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::new(node_id, kind)
        }
    }

    pub fn key(node_id: NodeId, kind: EventKind, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(node_id, kind)
        }
    }

    pub fn scroll(node_id: NodeId, x: f64, y: f64, delta_x: f64, delta_y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            delta_x: Some(delta_x),
            delta_y: Some(delta_y),
            ..Self::new(node_id, EventKind::Scroll)
        }
    }

    pub fn with_modifiers(mut self, modifiers: EventModifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }
}
