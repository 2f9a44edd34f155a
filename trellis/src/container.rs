//! Widget that owns an ordered list of child widgets.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, RwLock};

use log::debug;
use trellis_dom::VNode;

use crate::id::WidgetId;
use crate::state::{Observable, observable};
use crate::widget::{self, RenderContext, Widget, WidgetBase};

/// Element wrapping child widgets, rendered in insertion order.
///
/// Adding a child hands its ownership to the container; removing it detaches
/// the child's subtree (child-first) and gives ownership back to the caller.
/// Every structural change invalidates the container.
#[derive(Clone)]
pub struct Container {
    base: WidgetBase,
    tag: String,
    classes: Observable<BTreeSet<String>>,
    children: Arc<RwLock<Vec<Arc<dyn Widget>>>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.base.id())
            .field("tag", &self.tag)
            .field("children", &self.len())
            .finish()
    }
}

impl Container {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_base(WidgetBase::new(), tag)
    }

    /// A `div` container.
    pub fn div() -> Self {
        Self::new("div")
    }

    /// Build on a caller-supplied base (for explicit ids).
    pub fn with_base(base: WidgetBase, tag: impl Into<String>) -> Self {
        let classes = observable(BTreeSet::new(), base.invalidator().callback());
        Self {
            base,
            tag: tag.into(),
            classes,
            children: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
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

    /// Append `child`, taking ownership of it.
    pub fn add(&self, child: Arc<dyn Widget>) {
        self.write().push(Arc::clone(&child));
        if let Some(link) = self.base.link() {
            widget::attach(&child, &link);
        }
        debug!("{} added child {}", self.base.id(), child.id());
        self.base.invalidate();
    }

    pub fn add_all(&self, children: impl IntoIterator<Item = Arc<dyn Widget>>) {
        for child in children {
            self.add(child);
        }
    }

    /// Remove `child` if it is owned by this container.
    pub fn remove(&self, child: &dyn Widget) -> Option<Arc<dyn Widget>> {
        let index = self.position(child.id())?;
        self.remove_at(index)
    }

    pub fn remove_at(&self, index: usize) -> Option<Arc<dyn Widget>> {
        let removed = {
            let mut children = self.write();
            (index < children.len()).then(|| children.remove(index))
        }?;
        widget::detach(&removed);
        debug!("{} removed child {}", self.base.id(), removed.id());
        self.base.invalidate();
        Some(removed)
    }

    /// Remove every child, detaching them last-to-first.
    pub fn clear_content(&self) -> Vec<Arc<dyn Widget>> {
        let removed = std::mem::take(&mut *self.write());
        if removed.is_empty() {
            return removed;
        }
        for child in removed.iter().rev() {
            widget::detach(child);
        }
        debug!("{} cleared {} children", self.base.id(), removed.len());
        self.base.invalidate();
        removed
    }

    pub fn position(&self, id: WidgetId) -> Option<usize> {
        self.read().iter().position(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn Widget>>> {
        self.children.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn Widget>>> {
        self.children.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Widget for Container {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn render(&self, cx: &RenderContext) -> VNode {
        let children = self.children();
        VNode::element(&self.tag)
            .classes(self.classes.get())
            .children(children.iter().map(|c| widget::render_widget(&**c, cx)))
    }

    fn children(&self) -> Vec<Arc<dyn Widget>> {
        self.read().clone()
    }
}
