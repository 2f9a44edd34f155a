//! Render scheduler: coalesces invalidations into one render per root per tick.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use log::{debug, trace};

use crate::error::Result;
use crate::id::{RootId, WidgetId};
use crate::wakeup::{WakeupHandle, WakeupSender};

/// Something the scheduler can re-render; implemented by mounted roots.
pub(crate) trait RenderTarget: Send + Sync {
    /// Render the whole tree and patch the document.
    fn render_pass(&self) -> Result<()>;
}

/// Outcome of one scheduler flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sequence number of the tick, starting at 1.
    pub tick: u64,
    /// Roots that were rendered.
    pub rendered: usize,
    /// Pending roots that were unmounted or dropped before the flush.
    pub skipped: usize,
    /// Distinct widgets invalidated during the tick.
    pub invalidations: usize,
}

impl TickReport {
    /// Whether the tick had nothing to do.
    pub fn is_idle(&self) -> bool {
        self.rendered == 0 && self.skipped == 0
    }
}

#[derive(Default)]
struct SchedulerState {
    tick: u64,
    targets: HashMap<RootId, Weak<dyn RenderTarget>>,
    /// Roots with pending work, in first-invalidation order.
    queue: Vec<RootId>,
    pending: HashMap<RootId, BTreeSet<WidgetId>>,
}

/// Shared handle to the render queue.
///
/// `invalidate` may be called any number of times between flushes; every
/// pending root is rendered exactly once by the next `flush`, which reads
/// the property values current at that moment.
#[derive(Clone, Default)]
pub struct Scheduler {
    state: Arc<Mutex<SchedulerState>>,
    wakeup: WakeupHandle,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        f.debug_struct("Scheduler")
            .field("tick", &state.tick)
            .field("roots", &state.targets.len())
            .field("queued", &state.queue)
            .finish()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the sender signalled by the first invalidation of each tick.
    pub fn install_wakeup(&self, sender: WakeupSender) {
        self.wakeup.install(sender);
    }

    pub(crate) fn register(&self, root: RootId, target: Weak<dyn RenderTarget>) {
        let mut state = self.lock();
        state.targets.insert(root, target);
        debug!("registered root {}", root);
    }

    /// Forget a root; pending work for it is dropped.
    pub(crate) fn unregister(&self, root: RootId) {
        let mut state = self.lock();
        state.targets.remove(&root);
        state.pending.remove(&root);
        state.queue.retain(|r| *r != root);
        debug!("unregistered root {}", root);
    }

    /// Mark `widget` of `root` as needing a render.
    pub fn invalidate(&self, root: RootId, widget: WidgetId) {
        let wake = {
            let mut state = self.lock();
            if !state.targets.contains_key(&root) {
                trace!("ignoring invalidation of {} for unknown root {}", widget, root);
                return;
            }
            let was_idle = state.queue.is_empty();
            state.pending.entry(root).or_default().insert(widget);
            if !state.queue.contains(&root) {
                state.queue.push(root);
            }
            was_idle
        };
        if wake {
            self.wakeup.send();
        }
    }

    /// Drop a pending invalidation of a widget that left the tree.
    pub(crate) fn cancel(&self, root: RootId, widget: WidgetId) {
        let mut state = self.lock();
        let empty = match state.pending.get_mut(&root) {
            Some(widgets) => {
                widgets.remove(&widget);
                widgets.is_empty()
            }
            None => return,
        };
        if empty {
            state.pending.remove(&root);
            state.queue.retain(|r| *r != root);
        }
    }

    /// Whether any root is waiting to be rendered.
    pub fn has_pending(&self) -> bool {
        !self.lock().queue.is_empty()
    }

    /// Whether `widget` is waiting to be rendered.
    pub fn is_pending(&self, root: RootId, widget: WidgetId) -> bool {
        self.lock()
            .pending
            .get(&root)
            .is_some_and(|w| w.contains(&widget))
    }

    /// Number of ticks flushed so far.
    pub fn tick(&self) -> u64 {
        self.lock().tick
    }

    /// Render every pending root once.
    ///
    /// The queue is taken before rendering starts, so invalidations raised by
    /// render passes (hooks, adapters) are picked up by the next tick.
    pub fn flush(&self) -> Result<TickReport> {
        let (tick, work, invalidations) = {
            let mut state = self.lock();
            state.tick += 1;
            let queue = std::mem::take(&mut state.queue);
            let pending = std::mem::take(&mut state.pending);
            let invalidations = pending.values().map(BTreeSet::len).sum();
            let work: Vec<(RootId, Option<Arc<dyn RenderTarget>>)> = queue
                .into_iter()
                .map(|root| {
                    let target = state.targets.get(&root).and_then(Weak::upgrade);
                    (root, target)
                })
                .collect();
            (state.tick, work, invalidations)
        };

        let mut report = TickReport {
            tick,
            invalidations,
            ..TickReport::default()
        };
        for (root, target) in work {
            match target {
                Some(target) => {
                    target.render_pass()?;
                    report.rendered += 1;
                }
                None => {
                    trace!("skipping stale root {}", root);
                    report.skipped += 1;
                    self.lock().targets.remove(&root);
                }
            }
        }

        if !report.is_idle() {
            debug!(
                "tick {}: rendered {} skipped {} ({} invalidations)",
                report.tick, report.rendered, report.skipped, report.invalidations
            );
        }
        Ok(report)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}
