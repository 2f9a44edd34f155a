//! Reactive widget core.
//!
//! Widgets hold observable properties; writing one invalidates the widget,
//! the scheduler coalesces invalidations into one render per tick, and each
//! render is reconciled against the previous tree by `trellis_dom::patch`.

pub mod collection;
pub mod container;
pub mod error;
pub mod i18n;
pub mod id;
pub mod root;
pub mod runtime;
pub mod scheduler;
pub mod state;
pub mod tabulator;
pub mod tag;
pub mod wakeup;
pub mod widget;

pub mod prelude;

pub use error::{Error, Result};
pub use root::{Root, RootConfig};
pub use runtime::{Runtime, RuntimeConfig};
pub use scheduler::{Scheduler, TickReport};
