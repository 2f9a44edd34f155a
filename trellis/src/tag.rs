//! Leaf widget rendering a single element.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use trellis_dom::{DomEvent, Listener, VNode};

use crate::state::{Observable, observable};
use crate::widget::{RenderContext, Widget, WidgetBase};

/// Text content of a `Tag`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagContent {
    #[default]
    Empty,
    /// Rendered verbatim.
    Text(String),
    /// Looked up in the translator for the current locale.
    Translated(String),
}

/// An element with observable text, attributes and classes.
#[derive(Clone)]
pub struct Tag {
    base: WidgetBase,
    tag: String,
    content: Observable<TagContent>,
    attrs: Observable<BTreeMap<String, String>>,
    classes: Observable<BTreeSet<String>>,
    handlers: Arc<RwLock<BTreeMap<String, Listener>>>,
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("id", &self.base.id())
            .field("tag", &self.tag)
            .field("content", &self.content.get())
            .finish_non_exhaustive()
    }
}

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_base(WidgetBase::new(), tag)
    }

    pub fn with_base(base: WidgetBase, tag: impl Into<String>) -> Self {
        let on_change = base.invalidator();
        Self {
            content: observable(TagContent::Empty, on_change.callback()),
            attrs: observable(BTreeMap::new(), on_change.callback()),
            classes: observable(BTreeSet::new(), on_change.callback()),
            handlers: Arc::new(RwLock::new(BTreeMap::new())),
            tag: tag.into(),
            base,
        }
    }

    pub fn span(text: impl Into<String>) -> Self {
        Self::new("span").text(text)
    }

    // Builders

    pub fn text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn translated(self, key: impl Into<String>) -> Self {
        self.content.set(TagContent::Translated(key.into()));
        self
    }

    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn on<F>(self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(event.into(), Arc::new(handler));
        self.base.invalidate();
        self
    }

    // Setters

    pub fn set_text(&self, text: impl Into<String>) {
        self.content.set(TagContent::Text(text.into()));
    }

    pub fn set_content(&self, content: TagContent) {
        self.content.set(content);
    }

    pub fn content(&self) -> TagContent {
        self.content.get()
    }

    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        if self.attrs.with(|a| a.get(&name) != Some(&value)) {
            self.attrs.update(|a| {
                a.insert(name, value);
            });
        }
    }

    pub fn remove_attr(&self, name: &str) {
        if self.attrs.with(|a| a.contains_key(name)) {
            self.attrs.update(|a| {
                a.remove(name);
            });
        }
    }

    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        if !self.classes.with(|c| c.contains(&class)) {
            self.classes.update(|c| {
                c.insert(class);
            });
        }
    }

    pub fn remove_class(&self, class: &str) {
        if self.classes.with(|c| c.contains(class)) {
            self.classes.update(|c| {
                c.remove(class);
            });
        }
    }
}

impl Widget for Tag {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn render(&self, cx: &RenderContext) -> VNode {
        let mut node = VNode::element(&self.tag).classes(self.classes.get());
        node.attrs = self.attrs.get();
        node.handlers = self
            .handlers
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        match self.content.get() {
            TagContent::Empty => node,
            TagContent::Text(text) => node.text(text),
            TagContent::Translated(key) => node.text(cx.tr(&key)),
        }
    }
}
