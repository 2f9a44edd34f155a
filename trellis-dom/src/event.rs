use std::sync::Arc;

use serde_json::Value;

use crate::dom::NodeId;

/// Callback attached to a node for a named event.
pub type Listener = Arc<dyn Fn(&DomEvent) + Send + Sync>;

/// An event dispatched on a document node.
///
/// Custom events carry an arbitrary JSON payload in `detail`, mirroring the
/// browser `CustomEvent` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    /// Event type name (e.g. `click`, `tabulatorRowClick`).
    pub name: String,
    /// Node the event was dispatched on. Set by `Dom::dispatch_event`.
    pub target: Option<NodeId>,
    /// Node whose listener is currently running.
    pub current_target: Option<NodeId>,
    /// Payload.
    pub detail: Value,
    /// Whether the event propagates to ancestors after the target.
    pub bubbles: bool,
}

impl DomEvent {
    /// Create a non-bubbling custom event with the given payload.
    pub fn custom(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            target: None,
            current_target: None,
            detail,
            bubbles: false,
        }
    }

    /// Create an event without a payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self::custom(name, Value::Null)
    }

    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }
}
