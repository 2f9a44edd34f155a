//! Widget trait and the shared per-widget bookkeeping.
//!
//! Widgets are cheap-to-clone handles over shared state that:
//! - Produce a `VNode` from their current state (`render`)
//! - Hold observable properties whose writes invalidate the widget
//! - Own child widgets (containers) and propagate attach/detach
//!
//! The root re-renders the whole tree once per scheduler tick; the
//! reconciler turns the new tree into minimal document mutations.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use trellis_dom::VNode;

use crate::i18n::{NoTranslations, Translator};
use crate::id::{IdGenerator, MonotonicIds, RootId, WidgetId};
use crate::scheduler::Scheduler;

// =============================================================================
// RenderContext
// =============================================================================

/// Ambient values available while rendering.
#[derive(Clone)]
pub struct RenderContext {
    locale: String,
    translator: Arc<dyn Translator>,
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new("en", Arc::new(NoTranslations))
    }
}

impl RenderContext {
    pub fn new(locale: impl Into<String>, translator: Arc<dyn Translator>) -> Self {
        Self {
            locale: locale.into(),
            translator,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Translate `key` for the current locale, falling back to the key itself.
    pub fn tr(&self, key: &str) -> String {
        self.translator
            .translate(&self.locale, key)
            .unwrap_or_else(|| key.to_string())
    }
}

// =============================================================================
// Link / Invalidator
// =============================================================================

/// Connection of an attached widget to its root and scheduler.
#[derive(Clone, Debug)]
pub(crate) struct Link {
    pub(crate) scheduler: Scheduler,
    pub(crate) root: RootId,
}

type LinkCell = Arc<RwLock<Option<Link>>>;

/// Cloneable handle that marks one widget dirty.
///
/// While the widget is attached, invalidation is forwarded to the scheduler;
/// while unattached it only sets the dirty flag (the initial render of the
/// tree picks the latest values up anyway).
#[derive(Clone)]
pub struct Invalidator {
    widget: WidgetId,
    link: LinkCell,
    dirty: Arc<AtomicBool>,
}

impl fmt::Debug for Invalidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invalidator")
            .field("widget", &self.widget)
            .finish_non_exhaustive()
    }
}

impl Invalidator {
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        let link = self.link.read().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(link) = link {
            link.scheduler.invalidate(link.root, self.widget);
        }
    }

    /// The invalidation as a plain callback, for `observable`.
    pub fn callback(&self) -> impl Fn() + Send + Sync + 'static {
        let this = self.clone();
        move || this.invalidate()
    }
}

// =============================================================================
// WidgetBase
// =============================================================================

/// Identity, dirty tracking and tree linkage shared by every widget.
#[derive(Clone)]
pub struct WidgetBase {
    id: WidgetId,
    link: LinkCell,
    dirty: Arc<AtomicBool>,
    renders: Arc<AtomicU64>,
    snapshot: Arc<RwLock<Option<VNode>>>,
}

impl fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBase")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .field("dirty", &self.is_dirty())
            .field("renders", &self.render_count())
            .finish()
    }
}

impl Default for WidgetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetBase {
    /// Create a base with an id from the process-wide generator.
    pub fn new() -> Self {
        Self::from_generator(MonotonicIds::global())
    }

    pub fn from_generator(ids: &dyn IdGenerator) -> Self {
        Self::with_id(ids.next_id())
    }

    /// Create a base with a caller-supplied id.
    pub fn with_id(id: WidgetId) -> Self {
        Self {
            id,
            link: Arc::new(RwLock::new(None)),
            dirty: Arc::new(AtomicBool::new(true)),
            renders: Arc::new(AtomicU64::new(0)),
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn invalidator(&self) -> Invalidator {
        Invalidator {
            widget: self.id,
            link: Arc::clone(&self.link),
            dirty: Arc::clone(&self.dirty),
        }
    }

    pub fn invalidate(&self) {
        self.invalidator().invalidate();
    }

    pub fn is_attached(&self) -> bool {
        self.link.read().map(|l| l.is_some()).unwrap_or(false)
    }

    /// Root this widget is attached to, if any.
    pub fn root(&self) -> Option<RootId> {
        self.link().map(|l| l.root)
    }

    /// Check if the widget has been invalidated since its last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Number of times the widget has been rendered.
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::SeqCst)
    }

    /// The tree produced by the last render.
    pub fn last_render(&self) -> Option<VNode> {
        self.snapshot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub(crate) fn link(&self) -> Option<Link> {
        self.link.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn set_link(&self, link: Option<Link>) {
        *self.link.write().unwrap_or_else(|p| p.into_inner()) = link;
    }

    fn record_render(&self, vnode: &VNode) {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.dirty.store(false, Ordering::SeqCst);
        *self.snapshot.write().unwrap_or_else(|p| p.into_inner()) = Some(vnode.clone());
    }
}

// =============================================================================
// Widget
// =============================================================================

/// A node of the widget tree.
///
/// `render` must be a pure function of the widget's current state. Work that
/// has to happen around a render (for example rebuilding an external widget
/// after a locale change) belongs in `before_render`.
pub trait Widget: Send + Sync + fmt::Debug {
    fn base(&self) -> &WidgetBase;

    /// Describe the widget's current state as a virtual tree.
    fn render(&self, cx: &RenderContext) -> VNode;

    /// Owned child widgets, in insertion order.
    fn children(&self) -> Vec<Arc<dyn Widget>> {
        Vec::new()
    }

    /// Called right before `render` during a render pass.
    fn before_render(&self, cx: &RenderContext) {
        let _ = cx;
    }

    /// Called after the widget joined an attached tree (before its children).
    fn on_attach(&self) {}

    /// Called before the widget leaves an attached tree (after its children).
    fn on_detach(&self) {}

    fn id(&self) -> WidgetId {
        self.base().id()
    }
}

/// Render a widget, keying the result by widget id and caching the snapshot.
pub fn render_widget(widget: &dyn Widget, cx: &RenderContext) -> VNode {
    widget.before_render(cx);
    let mut vnode = widget.render(cx);
    if vnode.key.is_none() {
        vnode.key = Some(widget.id().to_string());
    }
    widget.base().record_render(&vnode);
    log::trace!("rendered {}", widget.id());
    vnode
}

/// Attach a subtree: parent first, then children in order.
pub(crate) fn attach(widget: &Arc<dyn Widget>, link: &Link) {
    widget.base().set_link(Some(link.clone()));
    widget.on_attach();
    for child in widget.children() {
        attach(&child, link);
    }
}

/// Detach a subtree: children last-to-first, then the widget itself.
///
/// Pending invalidations of detached widgets are cancelled, so a render that
/// was queued for them becomes a no-op.
pub(crate) fn detach(widget: &Arc<dyn Widget>) {
    for child in widget.children().iter().rev() {
        detach(child);
    }
    widget.on_detach();
    if let Some(link) = widget.base().link() {
        link.scheduler.cancel(link.root, widget.id());
    }
    widget.base().set_link(None);
}
