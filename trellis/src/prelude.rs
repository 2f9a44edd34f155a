//! Prelude module for convenient imports.
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```

// Core
pub use crate::error::{Error, Result};
pub use crate::id::{IdGenerator, MonotonicIds, RootId, WidgetId};
pub use crate::root::{Root, RootConfig};
pub use crate::runtime::{Runtime, RuntimeConfig};
pub use crate::scheduler::{Scheduler, TickReport};
pub use crate::state::{Observable, observable, observable_always};
pub use crate::widget::{Invalidator, RenderContext, Widget, WidgetBase, render_widget};

// Widgets
pub use crate::collection::ObservableList;
pub use crate::container::Container;
pub use crate::i18n::{Catalog, Translator};
pub use crate::tag::{Tag, TagContent};
pub use crate::tabulator::{
    AdapterConfig, ColumnDefinition, DataSource, HeadlessFactory, JsonCodec, TableEvent,
    TableOptions, Tabulator,
};

// Document
pub use trellis_dom::{Dom, DomEvent, NodeId, VNode};
