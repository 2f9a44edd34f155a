//! Binding of a widget tree to a document element.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use log::{debug, info};
use trellis_dom::{Dom, MountedNode, NodeId};

use crate::error::{Error, Result};
use crate::i18n::{NoTranslations, Translator};
use crate::id::RootId;
use crate::scheduler::{RenderTarget, Scheduler};
use crate::widget::{self, Link, RenderContext, Widget};

/// Configuration of a mounted root.
#[derive(Clone)]
pub struct RootConfig {
    /// Locale the tree is first rendered with.
    pub locale: String,
    /// Lookup used by `RenderContext::tr`.
    pub translator: Arc<dyn Translator>,
}

impl fmt::Debug for RootConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootConfig")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            translator: Arc::new(NoTranslations),
        }
    }
}

impl RootConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }
}

struct RootInner {
    id: RootId,
    dom: Dom,
    container: NodeId,
    widget: Arc<dyn Widget>,
    scheduler: Scheduler,
    mounted: Mutex<Option<MountedNode>>,
    locale: RwLock<String>,
    translator: Arc<dyn Translator>,
    unmounted: AtomicBool,
}

impl RenderTarget for RootInner {
    fn render_pass(&self) -> Result<()> {
        if self.unmounted.load(Ordering::SeqCst) {
            return Ok(());
        }
        let locale = self.locale.read().unwrap_or_else(|p| p.into_inner()).clone();
        let cx = RenderContext::new(locale, Arc::clone(&self.translator));
        let vnode = widget::render_widget(&*self.widget, &cx);

        // Hooks run during the patch; the slot must not stay locked meanwhile
        let previous = self.mounted.lock().unwrap_or_else(|p| p.into_inner()).take();
        let next = match previous {
            Some(old) => trellis_dom::patch(&self.dom, old, &vnode)?,
            None => trellis_dom::mount(&self.dom, self.container, &vnode)?,
        };
        *self.mounted.lock().unwrap_or_else(|p| p.into_inner()) = Some(next);
        Ok(())
    }
}

/// A widget tree mounted into an element of a document.
#[derive(Clone)]
pub struct Root {
    inner: Arc<RootInner>,
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("id", &self.inner.id)
            .field("container", &self.inner.container)
            .field("widget", &self.inner.widget.id())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl Root {
    /// Attach `widget` under `element` and render it once.
    ///
    /// Fails with `Error::MissingContext` when `element` is not part of `dom`.
    pub fn mount(
        dom: &Dom,
        element: NodeId,
        widget: Arc<dyn Widget>,
        scheduler: &Scheduler,
        config: RootConfig,
    ) -> Result<Self> {
        if !dom.contains(element) {
            return Err(Error::missing(format!("mount element {element}")));
        }

        let inner = Arc::new(RootInner {
            id: RootId::new(),
            dom: dom.clone(),
            container: element,
            widget,
            scheduler: scheduler.clone(),
            mounted: Mutex::new(None),
            locale: RwLock::new(config.locale),
            translator: config.translator,
            unmounted: AtomicBool::new(false),
        });
        let weak = Arc::downgrade(&inner);
        let target: Weak<dyn RenderTarget> = weak;
        scheduler.register(inner.id, target);

        let link = Link {
            scheduler: scheduler.clone(),
            root: inner.id,
        };
        widget::attach(&inner.widget, &link);
        inner.render_pass()?;

        info!("mounted root {} at {}", inner.id, element);
        Ok(Self { inner })
    }

    /// Like `mount`, locating the element by its `id` attribute.
    pub fn mount_by_id(
        dom: &Dom,
        element_id: &str,
        widget: Arc<dyn Widget>,
        scheduler: &Scheduler,
        config: RootConfig,
    ) -> Result<Self> {
        let element = dom
            .get_element_by_id(element_id)
            .ok_or_else(|| Error::missing(format!("element #{element_id}")))?;
        Self::mount(dom, element, widget, scheduler, config)
    }

    pub fn id(&self) -> RootId {
        self.inner.id
    }

    pub fn dom(&self) -> &Dom {
        &self.inner.dom
    }

    pub fn widget(&self) -> &Arc<dyn Widget> {
        &self.inner.widget
    }

    /// The element the tree is mounted into.
    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    /// The document node rendered for the root widget.
    pub fn node(&self) -> Option<NodeId> {
        self.inner
            .mounted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(MountedNode::node)
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.unmounted.load(Ordering::SeqCst)
    }

    pub fn locale(&self) -> String {
        self.inner
            .locale
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Switch the locale and schedule a re-render of the tree.
    pub fn set_locale(&self, locale: impl Into<String>) {
        let locale = locale.into();
        {
            let mut current = self.inner.locale.write().unwrap_or_else(|p| p.into_inner());
            if *current == locale {
                return;
            }
            debug!("root {} locale {} -> {}", self.inner.id, current, locale);
            *current = locale;
        }
        self.inner.widget.base().invalidate();
    }

    /// Render immediately, outside the scheduler.
    pub fn render_now(&self) -> Result<()> {
        self.inner.render_pass()
    }

    /// Remove the rendered tree from the document and detach every widget.
    ///
    /// DOM destroy hooks run child-first before removal, then widget detach
    /// hooks run child-first. Calling this twice is a no-op.
    pub fn unmount(&self) -> Result<()> {
        if self.inner.unmounted.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.scheduler.unregister(self.inner.id);
        let mounted = self
            .inner
            .mounted
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(mounted) = mounted {
            trellis_dom::unmount(&self.inner.dom, mounted)?;
        }
        widget::detach(&self.inner.widget);
        info!("unmounted root {}", self.inner.id);
        Ok(())
    }
}
