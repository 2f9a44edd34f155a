//! Reconciler: applies the difference between two virtual trees to a `Dom`.
//!
//! The previous render is kept as a `MountedNode` tree which pairs every
//! virtual node with the real node it produced. `patch` walks the old and the
//! new tree together and issues only the document mutations needed to make
//! the real tree match the new description.
//!
//! Hook ordering:
//! - insert hooks fire after the whole patch, parent before child
//! - destroy hooks fire right before removal, child before parent

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::dom::{Dom, ListenerId, NodeId};
use crate::error::Result;
use crate::event::{DomEvent, Listener};
use crate::vnode::{Content, Hook, Hooks, VNode};

type HandlerSlot = Arc<RwLock<Listener>>;

/// A virtual node that has been materialized in a document.
pub struct MountedNode {
    node: NodeId,
    tag: String,
    key: Option<String>,
    text: Option<String>,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    handlers: BTreeMap<String, (ListenerId, HandlerSlot)>,
    hooks: Hooks,
    external: bool,
    children: Vec<MountedNode>,
}

impl std::fmt::Debug for MountedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedNode")
            .field("node", &self.node)
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl MountedNode {
    /// The real document node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn children(&self) -> &[MountedNode] {
        &self.children
    }

    /// Find the mounted node carrying `key` in this subtree.
    pub fn find_by_key(&self, key: &str) -> Option<&MountedNode> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_key(key))
    }
}

/// Materialize `vnode` and append it to `parent`.
pub fn mount(dom: &Dom, parent: NodeId, vnode: &VNode) -> Result<MountedNode> {
    let mut patcher = Patcher::new(dom);
    let mounted = patcher.create(vnode)?;
    dom.append_child(parent, mounted.node)?;
    patcher.finish();
    Ok(mounted)
}

/// Reconcile `old` against `new`, returning the new mounted tree.
///
/// When the root tag or key differs the old tree is replaced in its parent.
pub fn patch(dom: &Dom, old: MountedNode, new: &VNode) -> Result<MountedNode> {
    let mut patcher = Patcher::new(dom);
    let mounted = if same_node(&old, new) {
        patcher.patch_node(old, new)?
    } else {
        let parent = dom.parent(old.node);
        let created = patcher.create(new)?;
        if let Some(parent) = parent {
            dom.insert_before(parent, created.node, Some(old.node))?;
        }
        patcher.remove(old)?;
        created
    };
    patcher.finish();
    Ok(mounted)
}

/// Remove a mounted tree from the document, running destroy hooks.
pub fn unmount(dom: &Dom, old: MountedNode) -> Result<()> {
    let mut patcher = Patcher::new(dom);
    patcher.remove(old)
}

fn same_node(old: &MountedNode, new: &VNode) -> bool {
    old.tag == new.tag && old.key == new.key
}

/// Children of `vnode` as the reconciler sees them: element text content
/// becomes a single text child.
fn child_list(vnode: &VNode) -> Cow<'_, [VNode]> {
    if vnode.is_text_node() {
        return Cow::Borrowed(&[]);
    }
    match &vnode.content {
        Content::None => Cow::Borrowed(&[]),
        Content::Text(text) => Cow::Owned(vec![VNode::text_node(text.clone())]),
        Content::Children(children) => Cow::Borrowed(children),
    }
}

struct Patcher<'a> {
    dom: &'a Dom,
    inserted: Vec<(Hook, NodeId)>,
}

impl<'a> Patcher<'a> {
    fn new(dom: &'a Dom) -> Self {
        Self {
            dom,
            inserted: Vec::new(),
        }
    }

    fn finish(self) {
        for (hook, node) in self.inserted {
            hook(self.dom, node);
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn create(&mut self, vnode: &VNode) -> Result<MountedNode> {
        if vnode.is_text_node() {
            let text = vnode.text_content().unwrap_or_default().to_string();
            let node = self.dom.create_text(&text);
            return Ok(MountedNode {
                node,
                tag: vnode.tag.clone(),
                key: vnode.key.clone(),
                text: Some(text),
                attrs: BTreeMap::new(),
                classes: BTreeSet::new(),
                handlers: BTreeMap::new(),
                hooks: vnode.hooks.clone(),
                external: false,
                children: Vec::new(),
            });
        }

        let node = self.dom.create_element(&vnode.tag);
        for (name, value) in &vnode.attrs {
            self.dom.set_attribute(node, name, value)?;
        }
        for class in &vnode.classes {
            self.dom.add_class(node, class)?;
        }
        let mut handlers = BTreeMap::new();
        for (name, handler) in &vnode.handlers {
            handlers.insert(name.clone(), self.attach_handler(node, name, handler)?);
        }
        if let Some(hook) = &vnode.hooks.insert {
            self.inserted.push((Arc::clone(hook), node));
        }

        let mut children = Vec::new();
        if !vnode.external {
            for child in child_list(vnode).iter() {
                let mounted = self.create(child)?;
                self.dom.append_child(node, mounted.node)?;
                children.push(mounted);
            }
        }

        Ok(MountedNode {
            node,
            tag: vnode.tag.clone(),
            key: vnode.key.clone(),
            text: None,
            attrs: vnode.attrs.clone(),
            classes: vnode.classes.clone(),
            handlers,
            hooks: vnode.hooks.clone(),
            external: vnode.external,
            children,
        })
    }

    /// Register a trampoline listener that forwards to a swappable slot, so a
    /// re-render only replaces the slot content instead of the listener.
    fn attach_handler(
        &self,
        node: NodeId,
        name: &str,
        handler: &Listener,
    ) -> Result<(ListenerId, HandlerSlot)> {
        let slot: HandlerSlot = Arc::new(RwLock::new(Arc::clone(handler)));
        let forward = Arc::clone(&slot);
        let id = self.dom.add_event_listener(
            node,
            name,
            Arc::new(move |event: &DomEvent| {
                let current = forward
                    .read()
                    .map(|guard| Arc::clone(&*guard))
                    .unwrap_or_else(|p| Arc::clone(&*p.into_inner()));
                current(event);
            }),
        )?;
        Ok((id, slot))
    }

    // =========================================================================
    // Removal
    // =========================================================================

    fn run_destroy_hooks(&self, mounted: &MountedNode) {
        for child in &mounted.children {
            self.run_destroy_hooks(child);
        }
        if let Some(hook) = &mounted.hooks.destroy {
            hook(self.dom, mounted.node);
        }
    }

    fn remove(&mut self, mounted: MountedNode) -> Result<()> {
        self.run_destroy_hooks(&mounted);
        if self.dom.contains(mounted.node) {
            self.dom.remove(mounted.node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Patching
    // =========================================================================

    fn patch_node(&mut self, mut old: MountedNode, new: &VNode) -> Result<MountedNode> {
        let node = old.node;

        if new.is_text_node() {
            let text = new.text_content().unwrap_or_default();
            if old.text.as_deref() != Some(text) {
                self.dom.set_text(node, text)?;
                old.text = Some(text.to_string());
            }
            old.hooks = new.hooks.clone();
            return Ok(old);
        }

        // Attributes
        for name in old.attrs.keys() {
            if !new.attrs.contains_key(name) {
                self.dom.remove_attribute(node, name)?;
            }
        }
        for (name, value) in &new.attrs {
            if old.attrs.get(name) != Some(value) {
                self.dom.set_attribute(node, name, value)?;
            }
        }
        old.attrs = new.attrs.clone();

        // Classes
        for class in old.classes.difference(&new.classes) {
            self.dom.remove_class(node, class)?;
        }
        for class in new.classes.difference(&old.classes) {
            self.dom.add_class(node, class)?;
        }
        old.classes = new.classes.clone();

        // Handlers
        let mut handlers = BTreeMap::new();
        for (name, (id, slot)) in std::mem::take(&mut old.handlers) {
            match new.handlers.get(&name) {
                Some(handler) => {
                    match slot.write() {
                        Ok(mut guard) => *guard = Arc::clone(handler),
                        Err(poisoned) => *poisoned.into_inner() = Arc::clone(handler),
                    }
                    handlers.insert(name, (id, slot));
                }
                None => self.dom.remove_event_listener(node, id)?,
            }
        }
        for (name, handler) in &new.handlers {
            if !handlers.contains_key(name) {
                handlers.insert(name.clone(), self.attach_handler(node, name, handler)?);
            }
        }
        old.handlers = handlers;
        old.hooks = new.hooks.clone();

        // Children
        let children = std::mem::take(&mut old.children);
        old.children = match (old.external, new.external) {
            (_, true) => {
                for child in children {
                    self.remove(child)?;
                }
                Vec::new()
            }
            (true, false) => {
                self.dom.clear_children(node)?;
                let mut created = Vec::new();
                for child in child_list(new).iter() {
                    let mounted = self.create(child)?;
                    self.dom.append_child(node, mounted.node)?;
                    created.push(mounted);
                }
                created
            }
            (false, false) => self.patch_children(node, children, &child_list(new))?,
        };
        old.external = new.external;

        Ok(old)
    }

    fn patch_children(
        &mut self,
        parent: NodeId,
        old: Vec<MountedNode>,
        new: &[VNode],
    ) -> Result<Vec<MountedNode>> {
        let mut slots: Vec<Option<MountedNode>> = old.into_iter().map(Some).collect();
        let mut keyed: HashMap<String, usize> = slots
            .iter()
            .enumerate()
            .filter_map(|(i, m)| Some((m.as_ref()?.key.clone()?, i)))
            .collect();
        let mut unkeyed_cursor = 0;

        let mut result = Vec::with_capacity(new.len());
        for vnode in new {
            let matched = match &vnode.key {
                Some(key) => keyed.remove(key).filter(|&i| {
                    slots[i].as_ref().is_some_and(|m| m.tag == vnode.tag)
                }),
                None => {
                    let found = (unkeyed_cursor..slots.len()).find(|&i| {
                        slots[i]
                            .as_ref()
                            .is_some_and(|m| m.key.is_none() && m.tag == vnode.tag)
                    });
                    if let Some(i) = found {
                        unkeyed_cursor = i + 1;
                    }
                    found
                }
            };
            let mounted = match matched.and_then(|i| slots[i].take()) {
                Some(old) => self.patch_node(old, vnode)?,
                None => self.create(vnode)?,
            };
            result.push(mounted);
        }

        for leftover in slots.into_iter().flatten() {
            self.remove(leftover)?;
        }

        // Move nodes into the desired order, touching only misplaced ones.
        let mut current = self.dom.children(parent);
        for (i, mounted) in result.iter().enumerate() {
            let id = mounted.node;
            if current.get(i) != Some(&id) {
                self.dom.insert_before(parent, id, current.get(i).copied())?;
                current.retain(|c| *c != id);
                current.insert(i, id);
            }
        }

        Ok(result)
    }
}
