use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::Content;
use crate::dom::{Dom, NodeId};
use crate::event::{DomEvent, Listener};

/// Lifecycle callback receiving the document and the real node.
pub type Hook = Arc<dyn Fn(&Dom, NodeId) + Send + Sync>;

/// Lifecycle hooks of a virtual node.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Called once the node is attached to the document.
    pub insert: Option<Hook>,
    /// Called right before the node is removed from the document.
    pub destroy: Option<Hook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("insert", &self.insert.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

/// Immutable description of one element (or text node) for a render pass.
#[derive(Clone, Default)]
pub struct VNode {
    // Identity
    pub tag: String,
    pub key: Option<String>,

    // Content
    pub content: Content,

    // Attributes
    pub attrs: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,

    // Behaviour
    pub handlers: BTreeMap<String, Listener>,
    pub hooks: Hooks,

    /// The subtree below this node is owned by someone else (an external
    /// widget). The reconciler keeps the node itself in sync but never
    /// creates, patches or removes its children.
    pub external: bool,
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("content", &self.content)
            .field("attrs", &self.attrs)
            .field("classes", &self.classes)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks)
            .field("external", &self.external)
            .finish()
    }
}

pub(crate) const TEXT_TAG: &str = "#text";

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::element("div")
    }

    pub fn span() -> Self {
        Self::element("span")
    }

    /// A bare text node.
    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            content: Content::Text(text.into()),
            ..Default::default()
        }
    }

    pub fn is_text_node(&self) -> bool {
        self.tag == TEXT_TAG
    }

    // Identity
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    // Content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn child(mut self, child: VNode) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            _ => self.content = Content::Children(vec![child]),
        }
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        for child in children {
            self = self.child(child);
        }
        self
    }

    // Attributes
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.extend(classes.into_iter().map(Into::into));
        self
    }

    // Behaviour
    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        self.handlers.insert(event.into(), Arc::new(handler));
        self
    }

    pub fn on_insert<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Dom, NodeId) + Send + Sync + 'static,
    {
        self.hooks.insert = Some(Arc::new(hook));
        self
    }

    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Dom, NodeId) + Send + Sync + 'static,
    {
        self.hooks.destroy = Some(Arc::new(hook));
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Whether `other` can be patched in place of `self` (same tag and key).
    pub fn same_node(&self, other: &VNode) -> bool {
        self.tag == other.tag && self.key == other.key
    }

    /// Text content of this node if it only holds text.
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn child_nodes(&self) -> &[VNode] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }
}
