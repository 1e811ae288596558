//! Property bags the diffing client hands to the bridge.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use treeline_core::{EventKind, EventPayload};

/// Local callback invoked when the remote tree replays a matching event.
pub type EventHandler = Rc<dyn Fn(&EventPayload)>;

/// One node's property set: a style object, event handlers, and custom
/// properties for non-built-in node kinds.
///
/// Styles and custom values are serialized at construction time; a value
/// that cannot be encoded becomes a null sentinel rather than failing the
/// commit (logged, not raised). Handler identity is the `Rc` pointer, which
/// is what update diffing compares.
#[derive(Clone, Default)]
pub struct Props {
    pub(crate) style: Option<Value>,
    pub(crate) handlers: IndexMap<EventKind, EventHandler>,
    pub(crate) custom: IndexMap<String, Value>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: impl Serialize) -> Self {
        self.style = Some(to_value_or_null("style", style));
        self
    }

    pub fn on(mut self, kind: EventKind, handler: impl Fn(&EventPayload) + 'static) -> Self {
        self.handlers.insert(kind, Rc::new(handler));
        self
    }

    /// Installs an already-shared handler, preserving its identity so an
    /// unchanged callback does not count as a handler change on update.
    pub fn on_shared(mut self, kind: EventKind, handler: EventHandler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn custom(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        let value = to_value_or_null(&key, value);
        self.custom.insert(key, value);
        self
    }

    pub fn handler(&self, kind: EventKind) -> Option<&EventHandler> {
        self.handlers.get(&kind)
    }

    pub fn style_value(&self) -> Option<&Value> {
        self.style.as_ref()
    }

    pub fn custom_value(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("style", &self.style)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("custom", &self.custom)
            .finish()
    }
}

fn to_value_or_null(what: &str, value: impl Serialize) -> Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("failed to serialize property `{what}`; sending null: {err}");
            Value::Null
        }
    }
}
