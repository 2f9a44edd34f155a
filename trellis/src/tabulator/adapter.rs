//! Widget bridging a typed record collection to an external table.
//!
//! The host element is rendered as an external subtree: the reconciler keeps
//! the element itself but never touches what the table draws inside it.
//! Lifecycle is driven by the host's DOM hooks:
//!
//! ```text
//! Unattached --insert--> Attaching --create--> Attached
//!     ^                      ^                    |
//!     |                      +--forced refresh----+
//!     +------- Detaching <------destroy/detach----+
//! ```
//!
//! Paging is captured before the instance is destroyed and reapplied right
//! after the next one is created. Every pass-through returns a documented
//! default while no instance exists.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use log::{debug, error, trace, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use trellis_dom::{Dom, DomEvent, Listener, NodeId, VNode};

use super::codec::{Codec, JsonCodec};
use super::events::TableEvent;
use super::instance::{
    ExternalTable, Navigation, NativeCallback, NativeFilter, NativeOptions, TableFactory,
};
use super::options::{SortDir, Sorter, TableOptions};
use crate::collection::{ObservableList, Subscription};
use crate::error::Result;
use crate::widget::{RenderContext, Widget, WidgetBase};

/// Lifecycle state of the external instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Unattached,
    Attaching,
    Attached,
    Detaching,
}

/// Records shown by the table.
#[derive(Clone)]
pub enum DataSource<T> {
    /// Plain records supplied once.
    Snapshot(Vec<T>),
    /// Shared list; the table follows its updates.
    Observable(ObservableList<T>),
}

impl<T: Clone> DataSource<T> {
    pub fn records(&self) -> Vec<T> {
        match self {
            Self::Snapshot(records) => records.clone(),
            Self::Observable(list) => list.to_vec(),
        }
    }
}

impl<T> Default for DataSource<T> {
    fn default() -> Self {
        Self::Snapshot(Vec::new())
    }
}

impl<T> fmt::Debug for DataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(records) => write!(f, "Snapshot({} records)", records.len()),
            Self::Observable(list) => write!(f, "Observable({} subscribers)", list.subscriber_count()),
        }
    }
}

/// Typed row predicate.
pub type FilterPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Page position captured across instance rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u32,
    pub size: u32,
}

/// Adapter configuration.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Write user edits back into an observable source.
    pub auto_sync: bool,
    /// Tag of the host element.
    pub host_tag: String,
    /// Optional `id` attribute of the host element.
    pub host_id: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            auto_sync: false,
            host_tag: "div".to_string(),
            host_id: None,
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_sync(mut self, enabled: bool) -> Self {
        self.auto_sync = enabled;
        self
    }

    pub fn host_tag(mut self, tag: impl Into<String>) -> Self {
        self.host_tag = tag.into();
        self
    }

    pub fn host_id(mut self, id: impl Into<String>) -> Self {
        self.host_id = Some(id.into());
        self
    }
}

// =============================================================================
// Inner state
// =============================================================================

struct Live {
    state: AdapterState,
    instance: Option<Arc<dyn ExternalTable>>,
    dom: Option<Dom>,
    host: Option<NodeId>,
    paging: Option<Paging>,
    built_locale: Option<String>,
    built_revision: u64,
    cx: Option<RenderContext>,
}

impl Live {
    fn new() -> Self {
        Self {
            state: AdapterState::Unattached,
            instance: None,
            dom: None,
            host: None,
            paging: None,
            built_locale: None,
            built_revision: 0,
            cx: None,
        }
    }
}

struct AdapterInner<T> {
    base: WidgetBase,
    factory: Arc<dyn TableFactory>,
    codec: Option<Arc<dyn Codec<T>>>,
    config: AdapterConfig,
    options: RwLock<TableOptions>,
    options_revision: AtomicU64,
    handlers: RwLock<BTreeMap<String, Listener>>,
    source: RwLock<DataSource<T>>,
    native: RwLock<Option<Value>>,
    filter: RwLock<Option<FilterPredicate<T>>>,
    filter_applied: AtomicBool,
    subscription: Mutex<Option<(ObservableList<T>, Subscription)>>,
    writing_back: AtomicBool,
    live: Mutex<Live>,
}

impl<T> Drop for AdapterInner<T> {
    fn drop(&mut self) {
        let subscription = self
            .subscription
            .get_mut()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some((list, id)) = subscription {
            list.unsubscribe(id);
        }
    }
}

/// Clears the write-back flag when dropped.
struct WriteBack<'a>(&'a AtomicBool);

impl<'a> WriteBack<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for WriteBack<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn capture_paging(instance: &dyn ExternalTable) -> Option<Paging> {
    let page = instance.get_page()?;
    let size = instance.get_page_size()?;
    Some(Paging { page, size })
}

fn dispatch(dom: &Dom, host: NodeId, event: TableEvent, payload: &Value) {
    let custom = DomEvent::custom(event.dom_event_name(), payload.clone()).bubbles(true);
    match dom.dispatch_event(host, custom) {
        Ok(listeners) => trace!("{} reached {} listeners", event.dom_event_name(), listeners),
        Err(e) => debug!("dropping {}: {}", event.dom_event_name(), e),
    }
}

impl<T> AdapterInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn live(&self) -> MutexGuard<'_, Live> {
        self.live.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// The current instance, cloned out so no lock is held while calling it.
    fn instance(&self) -> Option<Arc<dyn ExternalTable>> {
        self.live().instance.clone()
    }

    fn encode(&self, records: &[T]) -> Result<Option<Value>> {
        match &self.codec {
            Some(codec) => Ok(Some(codec.encode(records)?)),
            None => {
                debug!("{}: no codec, records not pushed", self.base.id());
                Ok(None)
            }
        }
    }

    fn store_native(&self, native: Option<Value>) {
        *self.native.write().unwrap_or_else(|p| p.into_inner()) = native;
    }

    /// Keep the native copy in step after an operation that changed the
    /// instance's rows directly.
    fn sync_native(&self, instance: &dyn ExternalTable) {
        self.store_native(Some(instance.get_data(false)));
    }

    fn native_for_build(&self) -> Result<Value> {
        if let Some(native) = self.native.read().unwrap_or_else(|p| p.into_inner()).clone() {
            return Ok(native);
        }
        let records = self
            .source
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .records();
        match self.encode(&records)? {
            Some(native) => {
                self.store_native(Some(native.clone()));
                Ok(native)
            }
            None => Ok(Value::Array(Vec::new())),
        }
    }

    // =========================================================================
    // Data
    // =========================================================================

    fn push(&self, records: &[T], replace: bool) -> Result<()> {
        if let DataSource::Snapshot(snapshot) =
            &mut *self.source.write().unwrap_or_else(|p| p.into_inner())
        {
            *snapshot = records.to_vec();
        }
        let Some(native) = self.encode(records)? else {
            return Ok(());
        };
        self.store_native(Some(native.clone()));
        match self.instance() {
            Some(instance) if replace => instance.replace_data(native),
            Some(instance) => instance.set_data(native),
            None => Ok(()),
        }
    }

    fn on_source_update(&self, records: &[T]) {
        if self.writing_back.load(Ordering::SeqCst) {
            trace!("{}: skipping echo of written-back edit", self.base.id());
            return;
        }
        if let Err(e) = self.push(records, true) {
            error!("{}: failed to push source update: {}", self.base.id(), e);
        }
    }

    fn on_data_edited(&self, payload: &Value) -> Result<()> {
        self.store_native(Some(payload.clone()));
        let Some(codec) = &self.codec else {
            return Ok(());
        };
        let records = codec.decode(payload)?;
        if !self.config.auto_sync {
            return Ok(());
        }
        let list = match &*self.source.read().unwrap_or_else(|p| p.into_inner()) {
            DataSource::Observable(list) => list.clone(),
            DataSource::Snapshot(_) => return Ok(()),
        };
        debug!("{}: writing {} edited records back", self.base.id(), records.len());
        let _guard = WriteBack::start(&self.writing_back);
        list.replace_all(records);
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn native_options(
        self: &Arc<Self>,
        dom: &Dom,
        host: NodeId,
        cx: &RenderContext,
    ) -> Result<NativeOptions> {
        let options = self.options.read().unwrap_or_else(|p| p.into_inner()).clone();
        let config = options.to_native(cx)?;

        let mut callbacks: BTreeMap<TableEvent, NativeCallback> = BTreeMap::new();
        for event in TableEvent::ALL {
            let slot: NativeCallback = match options.callbacks.get(event) {
                Some(callback) => Arc::clone(callback),
                None => {
                    let dom = dom.clone();
                    Arc::new(move |payload: &Value| {
                        dispatch(&dom, host, event, payload);
                        Ok(())
                    })
                }
            };
            let slot: NativeCallback = if event == TableEvent::DataEdited {
                let inner = Arc::downgrade(self);
                Arc::new(move |payload: &Value| {
                    if let Some(inner) = inner.upgrade() {
                        inner.on_data_edited(payload)?;
                    }
                    slot(payload)
                })
            } else {
                slot
            };
            callbacks.insert(event, slot);
        }

        Ok(NativeOptions { config, callbacks })
    }

    fn attach_instance(self: &Arc<Self>, dom: &Dom, host: NodeId) {
        let cx = {
            let mut live = self.live();
            if live.state != AdapterState::Unattached {
                debug!("{}: insert while {:?}, ignored", self.base.id(), live.state);
                return;
            }
            live.state = AdapterState::Attaching;
            live.dom = Some(dom.clone());
            live.host = Some(host);
            live.cx.clone().unwrap_or_default()
        };
        if let Err(e) = self.build(dom, host, &cx) {
            error!("{}: failed to create table: {}", self.base.id(), e);
            self.live().state = AdapterState::Unattached;
        }
    }

    /// Create the instance while `Attaching` and move to `Attached`.
    fn build(self: &Arc<Self>, dom: &Dom, host: NodeId, cx: &RenderContext) -> Result<()> {
        let data = self.native_for_build()?;
        let options = self.native_options(dom, host, cx)?;
        let locale = self
            .options
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .effective_locale(cx);
        let revision = self.options_revision.load(Ordering::SeqCst);

        let instance = self.factory.create(dom, host, data, options)?;

        let restore = {
            let mut live = self.live();
            if live.state == AdapterState::Attaching {
                live.state = AdapterState::Attached;
                live.instance = Some(Arc::clone(&instance));
                live.built_locale = Some(locale.clone());
                live.built_revision = revision;
                Some(live.paging.take())
            } else {
                None
            }
        };
        let Some(paging) = restore else {
            // Detached while the instance was being constructed
            instance.destroy();
            return Ok(());
        };

        if let Some(paging) = paging {
            instance.set_page_size(paging.size);
            instance.set_page(paging.page);
            debug!(
                "{}: restored page {} (size {})",
                self.base.id(),
                paging.page,
                paging.size
            );
        }
        if self.filter_applied.load(Ordering::SeqCst)
            && let Some(filter) = self.native_filter()
        {
            instance.set_filter(filter);
        }
        debug!("{}: table attached ({})", self.base.id(), locale);
        Ok(())
    }

    /// Destroy the instance, keeping its paging for the next one.
    fn teardown(&self) {
        let instance = {
            let mut live = self.live();
            match live.state {
                AdapterState::Attached => {
                    live.state = AdapterState::Detaching;
                    live.instance.take()
                }
                AdapterState::Attaching => {
                    live.state = AdapterState::Unattached;
                    None
                }
                AdapterState::Unattached | AdapterState::Detaching => return,
            }
        };
        let paging = instance.as_ref().and_then(|t| capture_paging(&**t));
        if let Some(instance) = instance {
            instance.destroy();
        }

        // The host is kept so a re-attach before the next patch can reuse it
        let mut live = self.live();
        live.paging = paging;
        live.state = AdapterState::Unattached;
        live.built_locale = None;
        debug!("{}: table detached", self.base.id());
    }

    /// Rebuild an attached instance for `cx`. Returns whether it was rebuilt.
    fn refresh_with(self: &Arc<Self>, cx: &RenderContext) -> bool {
        let (instance, dom, host) = {
            let mut live = self.live();
            if live.state != AdapterState::Attached {
                return false;
            }
            let (Some(dom), Some(host)) = (live.dom.clone(), live.host) else {
                return false;
            };
            let Some(instance) = live.instance.take() else {
                return false;
            };
            live.state = AdapterState::Attaching;
            (instance, dom, host)
        };

        let paging = capture_paging(&*instance);
        instance.destroy();
        self.live().paging = paging;
        debug!("{}: forced refresh, paging {:?}", self.base.id(), paging);

        if let Err(e) = self.build(&dom, host, cx) {
            error!("{}: failed to rebuild table: {}", self.base.id(), e);
            self.live().state = AdapterState::Unattached;
        }
        true
    }

    fn native_filter(&self) -> Option<NativeFilter> {
        let predicate = self.filter.read().unwrap_or_else(|p| p.into_inner()).clone()?;
        let codec = self.codec.clone()?;
        Some(Arc::new(move |row: &Value| match codec.decode_one(row) {
            Ok(record) => predicate(&record),
            Err(e) => {
                warn!("filter skipped undecodable row: {}", e);
                false
            }
        }))
    }
}

// =============================================================================
// Tabulator
// =============================================================================

/// Table widget backed by an external imperative table.
///
/// # Example
///
/// ```ignore
/// let people = ObservableList::new(load_people());
/// let table = Tabulator::json(HeadlessFactory::new())
///     .options(TableOptions::new().paginate(10).column(ColumnDefinition::new("Name", "name")))
///     .observable(people.clone())
///     .config(AdapterConfig::new().auto_sync(true))
///     .build();
/// container.add(Arc::new(table.clone()));
/// ```
pub struct Tabulator<T> {
    inner: Arc<AdapterInner<T>>,
}

impl<T> Clone for Tabulator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Tabulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.inner.live.lock().unwrap_or_else(|p| p.into_inner());
        f.debug_struct("Tabulator")
            .field("id", &self.inner.base.id())
            .field("state", &live.state)
            .field("has_codec", &self.inner.codec.is_some())
            .field("paging", &live.paging)
            .finish_non_exhaustive()
    }
}

/// Builder for `Tabulator`.
pub struct TabulatorBuilder<T> {
    base: Option<WidgetBase>,
    factory: Arc<dyn TableFactory>,
    codec: Option<Arc<dyn Codec<T>>>,
    options: TableOptions,
    source: DataSource<T>,
    config: AdapterConfig,
}

impl<T> TabulatorBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn codec(mut self, codec: impl Codec<T> + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a fixed snapshot of records.
    pub fn data(mut self, records: Vec<T>) -> Self {
        self.source = DataSource::Snapshot(records);
        self
    }

    /// Follow an observable list.
    pub fn observable(mut self, list: ObservableList<T>) -> Self {
        self.source = DataSource::Observable(list);
        self
    }

    pub fn source(mut self, source: DataSource<T>) -> Self {
        self.source = source;
        self
    }

    /// Use a caller-supplied base (for explicit ids).
    pub fn base(mut self, base: WidgetBase) -> Self {
        self.base = Some(base);
        self
    }

    pub fn build(self) -> Tabulator<T> {
        let inner = Arc::new(AdapterInner {
            base: self.base.unwrap_or_default(),
            factory: self.factory,
            codec: self.codec,
            config: self.config,
            options: RwLock::new(self.options),
            options_revision: AtomicU64::new(0),
            handlers: RwLock::new(BTreeMap::new()),
            source: RwLock::new(DataSource::Snapshot(Vec::new())),
            native: RwLock::new(None),
            filter: RwLock::new(None),
            filter_applied: AtomicBool::new(false),
            subscription: Mutex::new(None),
            writing_back: AtomicBool::new(false),
            live: Mutex::new(Live::new()),
        });
        let table = Tabulator { inner };
        table.install_source(self.source);
        table
    }
}

impl<T> Tabulator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start building a table created by `factory`.
    pub fn builder(factory: impl TableFactory + 'static) -> TabulatorBuilder<T> {
        TabulatorBuilder {
            base: None,
            factory: Arc::new(factory),
            codec: None,
            options: TableOptions::default(),
            source: DataSource::default(),
            config: AdapterConfig::default(),
        }
    }

    /// Start building a table using `JsonCodec`.
    pub fn json(factory: impl TableFactory + 'static) -> TabulatorBuilder<T>
    where
        T: Serialize + DeserializeOwned,
    {
        Self::builder(factory).codec(JsonCodec::new())
    }

    fn install_source(&self, source: DataSource<T>) {
        let previous = self
            .inner
            .subscription
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some((list, id)) = previous {
            list.unsubscribe(id);
        }

        if let DataSource::Observable(list) = &source {
            let weak = Arc::downgrade(&self.inner);
            let id = list.on_update(move |records: &[T]| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_source_update(records);
                }
            });
            *self
                .inner
                .subscription
                .lock()
                .unwrap_or_else(|p| p.into_inner()) = Some((list.clone(), id));
        }
        *self.inner.source.write().unwrap_or_else(|p| p.into_inner()) = source;
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn state(&self) -> AdapterState {
        self.inner.live().state
    }

    pub fn is_attached(&self) -> bool {
        self.state() == AdapterState::Attached
    }

    /// Host element while attached.
    pub fn host(&self) -> Option<NodeId> {
        let live = self.inner.live();
        live.host.filter(|_| live.state == AdapterState::Attached)
    }

    /// Paging captured from the last destroyed instance, not yet reapplied.
    pub fn captured_paging(&self) -> Option<Paging> {
        self.inner.live().paging
    }

    pub fn has_codec(&self) -> bool {
        self.inner.codec.is_some()
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.inner.config
    }

    pub fn options(&self) -> TableOptions {
        self.inner
            .options
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Replace the options; the instance is rebuilt on the next render.
    pub fn set_options(&self, options: TableOptions) {
        *self.inner.options.write().unwrap_or_else(|p| p.into_inner()) = options;
        self.inner.options_revision.fetch_add(1, Ordering::SeqCst);
        self.inner.base.invalidate();
    }

    /// Listen to a custom table event on the host element.
    pub fn on_event<F>(&self, event: TableEvent, handler: F)
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        self.inner
            .handlers
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(event.dom_event_name().to_string(), Arc::new(handler));
        self.inner.base.invalidate();
    }

    /// Rebuild the instance now, with the context of the last render.
    pub fn refresh(&self) -> bool {
        let cx = self.inner.live().cx.clone().unwrap_or_default();
        self.inner.refresh_with(&cx)
    }

    // =========================================================================
    // Data sync
    // =========================================================================

    /// Swap the data source and push its records.
    pub fn set_source(&self, source: DataSource<T>) -> Result<()> {
        let records = source.records();
        self.install_source(source);
        self.inner.push(&records, false)
    }

    pub fn source(&self) -> DataSource<T> {
        self.inner
            .source
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Load `records`, resetting the table's view state.
    pub fn set_data(&self, records: &[T]) -> Result<()> {
        self.inner.push(records, false)
    }

    /// Swap in `records`, keeping the table's view state.
    pub fn replace_data(&self, records: &[T]) -> Result<()> {
        self.inner.push(records, true)
    }

    /// Rows from the table; `active_only` restricts to filtered rows.
    pub fn get_data(&self, active_only: bool) -> Result<Vec<T>> {
        let (Some(instance), Some(codec)) = (self.inner.instance(), self.inner.codec.as_ref())
        else {
            return Ok(Vec::new());
        };
        codec.decode(&instance.get_data(active_only))
    }

    pub fn get_selected_data(&self) -> Result<Vec<T>> {
        let (Some(instance), Some(codec)) = (self.inner.instance(), self.inner.codec.as_ref())
        else {
            return Ok(Vec::new());
        };
        codec.decode(&instance.get_selected_data())
    }

    /// The native rows last pushed to or edited in the table.
    pub fn native_data(&self) -> Value {
        self.inner
            .native
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .unwrap_or_else(|| Value::Array(Vec::new()))
    }

    /// Decode an event payload holding one row. `None` without a codec.
    pub fn decode_row(&self, payload: &Value) -> Result<Option<T>> {
        match &self.inner.codec {
            Some(codec) => codec.decode_one(payload).map(Some),
            None => Ok(None),
        }
    }

    /// Decode an event payload holding a list of rows. Empty without a codec.
    pub fn decode_rows(&self, payload: &Value) -> Result<Vec<T>> {
        match &self.inner.codec {
            Some(codec) => codec.decode(payload),
            None => Ok(Vec::new()),
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn set_filter<F>(&self, predicate: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        *self.inner.filter.write().unwrap_or_else(|p| p.into_inner()) = Some(Arc::new(predicate));
    }

    /// Install the predicate as a native filter.
    ///
    /// Requires a predicate, a codec and an instance; returns whether the
    /// filter was installed. Rows that fail to decode are reported here
    /// rather than silently filtered out.
    pub fn apply_filter(&self) -> Result<bool> {
        let (Some(filter), Some(codec)) = (self.inner.native_filter(), self.inner.codec.as_ref())
        else {
            debug!("{}: filter needs a predicate and a codec", self.inner.base.id());
            return Ok(false);
        };
        let Some(instance) = self.inner.instance() else {
            return Ok(false);
        };
        codec.decode(&instance.get_data(false))?;
        instance.set_filter(filter);
        self.inner.filter_applied.store(true, Ordering::SeqCst);
        Ok(true)
    }

    /// Drop the predicate and remove the native filter.
    pub fn clear_filter(&self) {
        *self.inner.filter.write().unwrap_or_else(|p| p.into_inner()) = None;
        self.inner.filter_applied.store(false, Ordering::SeqCst);
        if let Some(instance) = self.inner.instance() {
            instance.clear_filter();
        }
    }

    // =========================================================================
    // Pass-through
    // =========================================================================

    pub fn redraw(&self, force: bool) {
        if let Some(instance) = self.inner.instance() {
            instance.redraw(force);
        }
    }

    pub fn set_height(&self, height: &str) {
        if let Some(instance) = self.inner.instance() {
            instance.set_height(height);
        }
    }

    /// Go to `page`; `false` when detached or out of range.
    pub fn set_page(&self, page: u32) -> bool {
        self.inner.instance().is_some_and(|t| t.set_page(page))
    }

    /// Current page, `-1` when detached or not paginated.
    pub fn get_page(&self) -> i64 {
        self.inner
            .instance()
            .and_then(|t| t.get_page())
            .map_or(-1, i64::from)
    }

    /// Page size, `-1` when detached or not paginated.
    pub fn get_page_size(&self) -> i64 {
        self.inner
            .instance()
            .and_then(|t| t.get_page_size())
            .map_or(-1, i64::from)
    }

    /// Last page number, `-1` when detached or not paginated.
    pub fn get_page_max(&self) -> i64 {
        self.inner
            .instance()
            .and_then(|t| t.get_page_max())
            .map_or(-1, i64::from)
    }

    pub fn set_page_size(&self, size: u32) {
        if let Some(instance) = self.inner.instance() {
            instance.set_page_size(size);
        }
    }

    pub fn previous_page(&self) -> bool {
        self.inner.instance().is_some_and(|t| t.previous_page())
    }

    pub fn next_page(&self) -> bool {
        self.inner.instance().is_some_and(|t| t.next_page())
    }

    pub fn set_sort(&self, column: impl Into<String>, dir: SortDir) {
        self.set_sorters(vec![Sorter {
            column: column.into(),
            dir,
        }]);
    }

    pub fn set_sorters(&self, sorters: Vec<Sorter>) {
        if let Some(instance) = self.inner.instance() {
            instance.set_sort(&sorters);
        }
    }

    pub fn clear_sort(&self) {
        if let Some(instance) = self.inner.instance() {
            instance.clear_sort();
        }
    }

    /// Active sorters, empty when detached.
    pub fn get_sorters(&self) -> Vec<Sorter> {
        self.inner
            .instance()
            .map(|t| t.get_sorters())
            .unwrap_or_default()
    }

    /// Undo the last edit; `false` when detached or nothing to undo.
    pub fn undo(&self) -> Result<bool> {
        let Some(instance) = self.inner.instance() else {
            return Ok(false);
        };
        let undone = instance.undo()?;
        if undone {
            self.inner.sync_native(&*instance);
        }
        Ok(undone)
    }

    /// Redo the last undone edit; `false` when detached or nothing to redo.
    pub fn redo(&self) -> Result<bool> {
        let Some(instance) = self.inner.instance() else {
            return Ok(false);
        };
        let redone = instance.redo()?;
        if redone {
            self.inner.sync_native(&*instance);
        }
        Ok(redone)
    }

    pub fn get_history_undo_size(&self) -> usize {
        self.inner
            .instance()
            .map_or(0, |t| t.get_history_undo_size())
    }

    pub fn get_history_redo_size(&self) -> usize {
        self.inner
            .instance()
            .map_or(0, |t| t.get_history_redo_size())
    }

    pub fn clear_history(&self) {
        if let Some(instance) = self.inner.instance() {
            instance.clear_history();
        }
    }

    pub fn select_row(&self, index: impl Into<Value>) -> Result<()> {
        match self.inner.instance() {
            Some(instance) => instance.select_row(&index.into()),
            None => Ok(()),
        }
    }

    pub fn deselect_row(&self, index: impl Into<Value>) -> Result<()> {
        match self.inner.instance() {
            Some(instance) => instance.deselect_row(&index.into()),
            None => Ok(()),
        }
    }

    pub fn scroll_to_row(&self, index: impl Into<Value>) -> bool {
        self.inner
            .instance()
            .is_some_and(|t| t.scroll_to_row(&index.into()))
    }

    fn navigate(&self, direction: Navigation) -> bool {
        self.inner.instance().is_some_and(|t| t.navigate(direction))
    }

    pub fn navigate_up(&self) -> bool {
        self.navigate(Navigation::Up)
    }

    pub fn navigate_down(&self) -> bool {
        self.navigate(Navigation::Down)
    }

    pub fn navigate_left(&self) -> bool {
        self.navigate(Navigation::Left)
    }

    pub fn navigate_right(&self) -> bool {
        self.navigate(Navigation::Right)
    }

    pub fn navigate_next(&self) -> bool {
        self.navigate(Navigation::Next)
    }

    pub fn navigate_prev(&self) -> bool {
        self.navigate(Navigation::Previous)
    }

    /// Number of rows, `0` when detached.
    pub fn get_row_count(&self, active_only: bool) -> usize {
        self.inner
            .instance()
            .map_or(0, |t| t.get_row_count(active_only))
    }

    pub fn add_row(&self, record: &T, at_top: bool) -> Result<()> {
        let Some(instance) = self.inner.instance() else {
            return Ok(());
        };
        let Some(codec) = &self.inner.codec else {
            return Ok(());
        };
        instance.add_row(codec.encode_one(record)?, at_top);
        self.inner.sync_native(&*instance);
        Ok(())
    }

    /// Update rows matching by index, adding the others.
    pub fn update_or_add_data(&self, records: &[T]) -> Result<()> {
        let Some(instance) = self.inner.instance() else {
            return Ok(());
        };
        let Some(codec) = &self.inner.codec else {
            return Ok(());
        };
        instance.update_or_add_data(codec.encode(records)?);
        self.inner.sync_native(&*instance);
        Ok(())
    }

    pub fn delete_row(&self, index: impl Into<Value>) -> bool {
        let Some(instance) = self.inner.instance() else {
            return false;
        };
        let deleted = instance.delete_row(&index.into());
        if deleted {
            self.inner.sync_native(&*instance);
        }
        deleted
    }

    pub fn clear_data(&self) {
        if let Some(instance) = self.inner.instance() {
            instance.clear_data();
            self.inner.sync_native(&*instance);
        }
    }
}

impl<T> Widget for Tabulator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn base(&self) -> &WidgetBase {
        &self.inner.base
    }

    fn render(&self, _cx: &RenderContext) -> VNode {
        let inserted = Arc::downgrade(&self.inner);
        let destroyed = Arc::downgrade(&self.inner);

        let mut host = VNode::element(&self.inner.config.host_tag)
            .class("tabulator-host")
            .external()
            .on_insert(move |dom, node| {
                if let Some(inner) = inserted.upgrade() {
                    inner.attach_instance(dom, node);
                }
            })
            .on_destroy(move |_, _| {
                if let Some(inner) = destroyed.upgrade() {
                    inner.teardown();
                }
            });
        if let Some(id) = &self.inner.config.host_id {
            host = host.id(id);
        }
        host.handlers = self
            .inner
            .handlers
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        host
    }

    fn before_render(&self, cx: &RenderContext) {
        let locale = self
            .inner
            .options
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .effective_locale(cx);
        let revision = self.inner.options_revision.load(Ordering::SeqCst);
        let stale = {
            let mut live = self.inner.live();
            live.cx = Some(cx.clone());
            live.state == AdapterState::Attached
                && (live.built_locale.as_deref() != Some(locale.as_str())
                    || live.built_revision != revision)
        };
        if stale {
            self.inner.refresh_with(cx);
        }
    }

    fn on_attach(&self) {
        // Re-added before the old host was patched away: no insert hook will
        // fire, so attach to the existing host directly
        let target = {
            let live = self.inner.live();
            match (live.state, &live.dom, live.host) {
                (AdapterState::Unattached, Some(dom), Some(host)) => Some((dom.clone(), host)),
                _ => None,
            }
        };
        if let Some((dom, host)) = target
            && dom.is_connected(host)
        {
            self.inner.attach_instance(&dom, host);
        }
    }

    fn on_detach(&self) {
        self.inner.teardown();
    }
}
