//! Contract of the external table widget the adapter drives.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use trellis_dom::{Dom, NodeId};

use super::events::TableEvent;
use super::options::Sorter;
use crate::error::Result;

/// Native callback receiving the event payload.
///
/// An error returned from a callback propagates to whoever triggered the
/// native event.
pub type NativeCallback = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// Native row filter.
pub type NativeFilter = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Options handed to the factory: serialized configuration plus a callback
/// for every event slot.
#[derive(Clone, Default)]
pub struct NativeOptions {
    pub config: Value,
    pub callbacks: BTreeMap<TableEvent, NativeCallback>,
}

impl fmt::Debug for NativeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeOptions")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Cell movement for the `navigate_*` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Up,
    Down,
    Left,
    Right,
    Next,
    Previous,
}

/// A live external table bound to a host element.
///
/// The table owns the DOM subtree below its host element. Row arguments
/// (`index`) are values of the configured index field.
pub trait ExternalTable: Send + Sync {
    // Data
    fn set_data(&self, data: Value) -> Result<()>;
    fn replace_data(&self, data: Value) -> Result<()>;
    fn get_data(&self, active_only: bool) -> Value;
    fn get_selected_data(&self) -> Value;
    fn get_row_count(&self, active_only: bool) -> usize;
    fn add_row(&self, row: Value, at_top: bool);
    fn update_or_add_data(&self, rows: Value);
    fn delete_row(&self, index: &Value) -> bool;
    fn clear_data(&self);

    // Filtering
    fn set_filter(&self, filter: NativeFilter);
    fn clear_filter(&self);

    // Layout
    fn redraw(&self, force: bool);
    fn set_height(&self, height: &str);

    // Paging; `None` means paging is disabled.
    fn get_page(&self) -> Option<u32>;
    fn get_page_size(&self) -> Option<u32>;
    fn get_page_max(&self) -> Option<u32>;
    fn set_page(&self, page: u32) -> bool;
    fn set_page_size(&self, size: u32);
    fn previous_page(&self) -> bool;
    fn next_page(&self) -> bool;

    // Sorting
    fn set_sort(&self, sorters: &[Sorter]);
    fn clear_sort(&self);
    fn get_sorters(&self) -> Vec<Sorter>;

    // History
    fn undo(&self) -> Result<bool>;
    fn redo(&self) -> Result<bool>;
    fn get_history_undo_size(&self) -> usize;
    fn get_history_redo_size(&self) -> usize;
    fn clear_history(&self);

    // Selection and navigation
    fn select_row(&self, index: &Value) -> Result<()>;
    fn deselect_row(&self, index: &Value) -> Result<()>;
    fn scroll_to_row(&self, index: &Value) -> bool;
    fn navigate(&self, direction: Navigation) -> bool;

    /// Tear the table down and release its DOM subtree.
    fn destroy(&self);
}

/// Constructs external tables.
pub trait TableFactory: Send + Sync {
    fn create(
        &self,
        dom: &Dom,
        host: NodeId,
        data: Value,
        options: NativeOptions,
    ) -> Result<Arc<dyn ExternalTable>>;
}
