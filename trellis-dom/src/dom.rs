//! In-memory document.
//!
//! `Dom` is a cheap-to-clone handle to a shared node arena. It stands in for
//! the browser document: the reconciler applies mutations through it, and
//! external widgets build their own subtrees inside it.
//!
//! No lock is held while listeners run, so a listener may freely mutate the
//! document or dispatch further events.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{DomError, Result};
use crate::event::{DomEvent, Listener};

/// Identifier of a node in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(String),
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    listeners: Vec<(ListenerId, String, Listener)>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
            classes: BTreeSet::new(),
            children: Vec::new(),
            parent: None,
            listeners: Vec::new(),
        }
    }
}

struct Document {
    nodes: HashMap<NodeId, NodeData>,
    body: NodeId,
    next_node: u64,
    next_listener: u64,
    mutations: u64,
}

impl Document {
    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(&id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(&id).ok_or(DomError::NodeNotFound(id))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, NodeData::new(kind));
        id
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: NodeId) -> Result<()> {
        if let Some(parent) = self.node(child)?.parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != child);
            }
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }
}

/// Shared handle to an in-memory document.
#[derive(Clone)]
pub struct Dom {
    inner: Arc<RwLock<Document>>,
}

impl fmt::Debug for Dom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.read();
        f.debug_struct("Dom")
            .field("nodes", &doc.nodes.len())
            .field("mutations", &doc.mutations)
            .finish()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a document containing only a `body` element.
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: HashMap::new(),
            body: NodeId(0),
            next_node: 0,
            next_listener: 0,
            mutations: 0,
        };
        doc.body = doc.alloc(NodeKind::Element("body".into()));
        Self {
            inner: Arc::new(RwLock::new(doc)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }

    pub fn body(&self) -> NodeId {
        self.read().body
    }

    // Creation

    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut doc = self.write();
        doc.mutations += 1;
        doc.alloc(NodeKind::Element(tag.to_string()))
    }

    pub fn create_text(&self, text: &str) -> NodeId {
        let mut doc = self.write();
        doc.mutations += 1;
        doc.alloc(NodeKind::Text(text.to_string()))
    }

    // Tree structure

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let mut doc = self.write();
        if matches!(doc.node(parent)?.kind, NodeKind::Text(_)) {
            return Err(DomError::NotAnElement(parent));
        }
        doc.node(child)?;
        if doc.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(r) = reference {
            if doc.node(r)?.parent != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
        }
        doc.detach(child)?;
        let p = doc.node_mut(parent)?;
        let index = reference
            .and_then(|r| p.children.iter().position(|c| *c == r))
            .unwrap_or(p.children.len());
        p.children.insert(index, child);
        doc.node_mut(child)?.parent = Some(parent);
        doc.mutations += 1;
        Ok(())
    }

    /// Detach `child` from `parent` and drop its subtree from the document.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut doc = self.write();
        if doc.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        doc.detach(child)?;
        doc.drop_subtree(child);
        doc.mutations += 1;
        Ok(())
    }

    /// Drop a node and its subtree, detaching it from its parent first.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        let mut doc = self.write();
        doc.detach(node)?;
        doc.drop_subtree(node);
        doc.mutations += 1;
        Ok(())
    }

    /// Remove every child of `node`.
    pub fn clear_children(&self, node: NodeId) -> Result<()> {
        let mut doc = self.write();
        let children = std::mem::take(&mut doc.node_mut(node)?.children);
        if !children.is_empty() {
            doc.mutations += 1;
        }
        for child in children {
            doc.drop_subtree(child);
        }
        Ok(())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read().nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.read().nodes.contains_key(&node)
    }

    /// Whether the node is attached below `body`.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let doc = self.read();
        doc.nodes.contains_key(&node) && doc.is_ancestor(doc.body, node)
    }

    // Node data

    /// Tag name of an element, `None` for text nodes or unknown ids.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.read().nodes.get(&node)?.kind {
            NodeKind::Element(tag) => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Replace the content of a text node.
    pub fn set_text(&self, node: NodeId, text: &str) -> Result<()> {
        let mut doc = self.write();
        let changed = match &mut doc.node_mut(node)?.kind {
            NodeKind::Text(current) => {
                let changed = current != text;
                if changed {
                    *current = text.to_string();
                }
                changed
            }
            NodeKind::Element(_) => return Err(DomError::NotText(node)),
        };
        if changed {
            doc.mutations += 1;
        }
        Ok(())
    }

    /// Concatenated text of the node and all descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        fn collect(doc: &Document, id: NodeId, out: &mut String) {
            if let Some(n) = doc.nodes.get(&id) {
                match &n.kind {
                    NodeKind::Text(t) => out.push_str(t),
                    NodeKind::Element(_) => {
                        for child in &n.children {
                            collect(doc, *child, out);
                        }
                    }
                }
            }
        }
        let mut out = String::new();
        collect(&self.read(), node, &mut out);
        out
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let mut doc = self.write();
        let n = doc.node_mut(node)?;
        if n.attrs.get(name).map(String::as_str) == Some(value) {
            return Ok(());
        }
        n.attrs.insert(name.to_string(), value.to_string());
        doc.mutations += 1;
        Ok(())
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        let mut doc = self.write();
        if doc.node_mut(node)?.attrs.remove(name).is_some() {
            doc.mutations += 1;
        }
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.read().nodes.get(&node)?.attrs.get(name).cloned()
    }

    pub fn add_class(&self, node: NodeId, class: &str) -> Result<()> {
        let mut doc = self.write();
        if doc.node_mut(node)?.classes.insert(class.to_string()) {
            doc.mutations += 1;
        }
        Ok(())
    }

    pub fn remove_class(&self, node: NodeId, class: &str) -> Result<()> {
        let mut doc = self.write();
        if doc.node_mut(node)?.classes.remove(class) {
            doc.mutations += 1;
        }
        Ok(())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.read()
            .nodes
            .get(&node)
            .is_some_and(|n| n.classes.contains(class))
    }

    /// Find the first connected element whose `id` attribute matches.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        fn find(doc: &Document, node: NodeId, id: &str) -> Option<NodeId> {
            let n = doc.nodes.get(&node)?;
            if n.attrs.get("id").map(String::as_str) == Some(id) {
                return Some(node);
            }
            n.children.iter().find_map(|c| find(doc, *c, id))
        }
        let doc = self.read();
        find(&doc, doc.body, id)
    }

    /// Total number of mutations applied to the document so far.
    pub fn mutation_count(&self) -> u64 {
        self.read().mutations
    }

    // Events

    pub fn add_event_listener(
        &self,
        node: NodeId,
        name: &str,
        listener: Listener,
    ) -> Result<ListenerId> {
        let mut doc = self.write();
        let id = ListenerId(doc.next_listener);
        doc.next_listener += 1;
        doc.node_mut(node)?
            .listeners
            .push((id, name.to_string(), listener));
        Ok(id)
    }

    pub fn remove_event_listener(&self, node: NodeId, listener: ListenerId) -> Result<()> {
        let mut doc = self.write();
        doc.node_mut(node)?.listeners.retain(|(id, _, _)| *id != listener);
        Ok(())
    }

    /// Dispatch an event on `target`, walking up to ancestors when it bubbles.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, target: NodeId, mut event: DomEvent) -> Result<usize> {
        let path: Vec<(NodeId, Vec<Listener>)> = {
            let doc = self.read();
            doc.node(target)?;
            let mut path = Vec::new();
            let mut current = Some(target);
            while let Some(id) = current {
                let Some(node) = doc.nodes.get(&id) else {
                    break;
                };
                let listeners = node
                    .listeners
                    .iter()
                    .filter(|(_, name, _)| *name == event.name)
                    .map(|(_, _, l)| Arc::clone(l))
                    .collect();
                path.push((id, listeners));
                if !event.bubbles {
                    break;
                }
                current = node.parent;
            }
            path
        };

        event.target = Some(target);
        let mut invoked = 0;
        for (node, listeners) in path {
            event.current_target = Some(node);
            for listener in listeners {
                listener(&event);
                invoked += 1;
            }
        }
        log::trace!("dispatched {} on {target}: {invoked} listeners", event.name);
        Ok(invoked)
    }

    /// Serialize a subtree to HTML-like markup, for debugging and assertions.
    pub fn outer_html(&self, node: NodeId) -> String {
        fn write_node(doc: &Document, id: NodeId, out: &mut String) {
            let Some(n) = doc.nodes.get(&id) else {
                return;
            };
            match &n.kind {
                NodeKind::Text(t) => out.push_str(t),
                NodeKind::Element(tag) => {
                    out.push('<');
                    out.push_str(tag);
                    for (k, v) in &n.attrs {
                        out.push_str(&format!(" {k}=\"{v}\""));
                    }
                    if !n.classes.is_empty() {
                        let classes: Vec<&str> = n.classes.iter().map(String::as_str).collect();
                        out.push_str(&format!(" class=\"{}\"", classes.join(" ")));
                    }
                    out.push('>');
                    for child in &n.children {
                        write_node(doc, *child, out);
                    }
                    out.push_str(&format!("</{tag}>"));
                }
            }
        }
        let mut out = String::new();
        write_node(&self.read(), node, &mut out);
        out
    }
}
