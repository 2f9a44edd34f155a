//! In-memory table backend.
//!
//! `HeadlessTable` implements the external table contract without a browser:
//! it keeps rows as native JSON, supports filtering, sorting, paging,
//! selection, history and cell navigation, draws a simplified table markup
//! below its host element and fires the native callbacks. It also exposes
//! user-interaction simulation (`click_row`, `edit_cell`, ...).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{trace, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use trellis_dom::{Dom, DomError, NodeId};

use super::events::TableEvent;
use super::instance::{
    ExternalTable, Navigation, NativeCallback, NativeFilter, NativeOptions, TableFactory,
};
use super::options::{SortDir, Sorter};
use crate::error::{Error, Result};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct PageState {
    page: u32,
    size: u32,
}

struct Column {
    title: String,
    field: String,
}

struct Grid {
    rows: Vec<Value>,
    columns: Vec<Column>,
    index_field: String,
    placeholder: Option<String>,
    height: Option<String>,
    filter: Option<NativeFilter>,
    sorters: Vec<Sorter>,
    paging: Option<PageState>,
    selected: Vec<Value>,
    history: bool,
    undo: Vec<Vec<Value>>,
    redo: Vec<Vec<Value>>,
    cursor: Option<(usize, usize)>,
    redraws: usize,
    table_node: Option<NodeId>,
    destroyed: bool,
}

impl Grid {
    fn from_config(config: &Value) -> Result<Self> {
        let columns = config
            .get("columns")
            .and_then(Value::as_array)
            .map(|cols| {
                cols.iter()
                    .filter_map(|c| {
                        Some(Column {
                            field: c.get("field")?.as_str()?.to_string(),
                            title: c
                                .get("title")
                                .and_then(Value::as_str)
                                .unwrap_or_default()
                                .to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        let sorters = match config.get("initialSort") {
            Some(value) => Vec::<Sorter>::deserialize(value)?,
            None => Vec::new(),
        };
        let paging = (config.get("pagination").and_then(Value::as_bool) == Some(true)).then(|| {
            let number = |key: &str| {
                config
                    .get(key)
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
            };
            PageState {
                page: number("paginationInitialPage").unwrap_or(1).max(1),
                size: number("paginationSize").unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            }
        });
        let text = |key: &str| config.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            rows: Vec::new(),
            columns,
            index_field: text("index").unwrap_or_else(|| "id".to_string()),
            placeholder: text("placeholder"),
            height: text("height"),
            filter: None,
            sorters,
            paging,
            selected: Vec::new(),
            history: config.get("history").and_then(Value::as_bool) == Some(true),
            undo: Vec::new(),
            redo: Vec::new(),
            cursor: None,
            redraws: 0,
            table_node: None,
            destroyed: false,
        })
    }

    fn index_of(&self, row: &Value) -> Value {
        row.get(&self.index_field).cloned().unwrap_or(Value::Null)
    }

    fn position(&self, index: &Value) -> Option<usize> {
        self.rows.iter().position(|r| self.index_of(r) == *index)
    }

    /// Rows after filtering and sorting.
    fn active(&self) -> Vec<Value> {
        let mut rows: Vec<Value> = match &self.filter {
            Some(filter) => self.rows.iter().filter(|r| filter(r)).cloned().collect(),
            None => self.rows.clone(),
        };
        if !self.sorters.is_empty() {
            rows.sort_by(|a, b| {
                for sorter in &self.sorters {
                    let null = Value::Null;
                    let ord = compare(
                        a.get(&sorter.column).unwrap_or(&null),
                        b.get(&sorter.column).unwrap_or(&null),
                    );
                    let ord = match sorter.dir {
                        SortDir::Asc => ord,
                        SortDir::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        rows
    }

    /// Rows on the current page.
    fn visible(&self) -> Vec<Value> {
        let active = self.active();
        match self.paging {
            Some(p) => {
                let start = ((p.page - 1) * p.size) as usize;
                active.into_iter().skip(start).take(p.size as usize).collect()
            }
            None => active,
        }
    }

    fn page_max(&self) -> Option<u32> {
        let p = self.paging?;
        let count = u32::try_from(self.active().len()).unwrap_or(u32::MAX);
        Some(count.div_ceil(p.size).max(1))
    }

    fn clamp_page(&mut self) {
        if let Some(max) = self.page_max()
            && let Some(p) = self.paging.as_mut()
        {
            p.page = p.page.clamp(1, max);
        }
    }

    fn reset_page(&mut self) {
        if let Some(p) = self.paging.as_mut() {
            p.page = 1;
        }
    }

    fn checkpoint(&mut self) {
        if self.history {
            self.undo.push(self.rows.clone());
            self.redo.clear();
        }
    }

    fn selected_rows(&self) -> Vec<Value> {
        self.selected
            .iter()
            .filter_map(|index| self.position(index).map(|i| self.rows[i].clone()))
            .collect()
    }

    fn column_position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn rows_of(data: Value) -> Result<Vec<Value>> {
    match data {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        _ => Err(Error::malformed("table data must be an array of rows")),
    }
}

/// Snapshot of what to draw, taken under the grid lock.
struct View {
    titles: Vec<String>,
    fields: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
    placeholder: Option<String>,
    height: Option<String>,
    previous: Option<NodeId>,
}

struct TableInner {
    dom: Dom,
    host: NodeId,
    callbacks: BTreeMap<TableEvent, NativeCallback>,
    grid: Mutex<Grid>,
    calls: AtomicUsize,
}

/// In-memory external table.
#[derive(Clone)]
pub struct HeadlessTable {
    inner: Arc<TableInner>,
}

impl fmt::Debug for HeadlessTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid();
        f.debug_struct("HeadlessTable")
            .field("host", &self.inner.host)
            .field("rows", &grid.rows.len())
            .field("paging", &grid.paging)
            .field("destroyed", &grid.destroyed)
            .finish()
    }
}

impl HeadlessTable {
    /// Build a table under `host`, firing `dataLoading` and `dataLoaded`.
    pub fn create(dom: &Dom, host: NodeId, data: Value, options: NativeOptions) -> Result<Self> {
        let grid = Grid::from_config(&options.config)?;
        let table = Self {
            inner: Arc::new(TableInner {
                dom: dom.clone(),
                host,
                callbacks: options.callbacks,
                grid: Mutex::new(grid),
                calls: AtomicUsize::new(0),
            }),
        };
        // Clamp rather than reset so `paginationInitialPage` survives the first load.
        table.load(data, false)?;
        Ok(table)
    }

    fn grid(&self) -> MutexGuard<'_, Grid> {
        self.inner.grid.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn count_call(&self) {
        self.inner.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn fire(&self, event: TableEvent, payload: &Value) -> Result<()> {
        match self.inner.callbacks.get(&event) {
            Some(callback) => {
                trace!("firing {}", event);
                callback(payload)
            }
            None => Ok(()),
        }
    }

    fn load(&self, data: Value, reset_page: bool) -> Result<()> {
        self.fire(TableEvent::DataLoading, &data)?;
        let rows = rows_of(data.clone())?;
        {
            let mut grid = self.grid();
            grid.rows = rows;
            grid.selected.clear();
            grid.cursor = None;
            if reset_page {
                grid.reset_page();
            } else {
                grid.clamp_page();
            }
        }
        self.draw();
        self.fire(TableEvent::DataLoaded, &data)
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    fn draw(&self) {
        let view = {
            let mut grid = self.grid();
            if grid.destroyed {
                return;
            }
            grid.redraws += 1;
            View {
                titles: grid.columns.iter().map(|c| c.title.clone()).collect(),
                fields: grid.columns.iter().map(|c| c.field.clone()).collect(),
                rows: grid
                    .visible()
                    .iter()
                    .map(|row| {
                        let cells = grid
                            .columns
                            .iter()
                            .map(|c| cell_text(row.get(&c.field)))
                            .collect();
                        (cell_text(Some(&grid.index_of(row))), cells)
                    })
                    .collect(),
                placeholder: grid.placeholder.clone(),
                height: grid.height.clone(),
                previous: grid.table_node.take(),
            }
        };
        match self.draw_view(view) {
            Ok(node) => self.grid().table_node = Some(node),
            Err(e) => warn!("headless table draw failed: {}", e),
        }
    }

    fn draw_view(&self, view: View) -> std::result::Result<NodeId, DomError> {
        let dom = &self.inner.dom;
        if let Some(previous) = view.previous
            && dom.contains(previous)
        {
            dom.remove(previous)?;
        }

        let element = |tag: &str, class: &str| -> std::result::Result<NodeId, DomError> {
            let node = dom.create_element(tag);
            dom.add_class(node, class)?;
            Ok(node)
        };

        let table = element("div", "tabulator")?;
        if let Some(height) = &view.height {
            dom.set_attribute(table, "style", &format!("height: {height}"))?;
        }

        let header = element("div", "tabulator-header")?;
        for (title, field) in view.titles.iter().zip(&view.fields) {
            let col = element("div", "tabulator-col")?;
            dom.set_attribute(col, "tabulator-field", field)?;
            dom.append_child(col, dom.create_text(title))?;
            dom.append_child(header, col)?;
        }
        dom.append_child(table, header)?;

        let holder = element("div", "tabulator-tableholder")?;
        if view.rows.is_empty()
            && let Some(placeholder) = &view.placeholder
        {
            let empty = element("div", "tabulator-placeholder")?;
            dom.append_child(empty, dom.create_text(placeholder))?;
            dom.append_child(holder, empty)?;
        }
        for (index, cells) in &view.rows {
            let row = element("div", "tabulator-row")?;
            dom.set_attribute(row, "data-index", index)?;
            for (text, field) in cells.iter().zip(&view.fields) {
                let cell = element("div", "tabulator-cell")?;
                dom.set_attribute(cell, "tabulator-field", field)?;
                dom.append_child(cell, dom.create_text(text))?;
                dom.append_child(row, cell)?;
            }
            dom.append_child(holder, row)?;
        }
        dom.append_child(table, holder)?;

        dom.append_child(self.inner.host, table)?;
        Ok(table)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn host(&self) -> NodeId {
        self.inner.host
    }

    /// All rows in load order.
    pub fn rows(&self) -> Vec<Value> {
        self.grid().rows.clone()
    }

    /// Rows on the current page, in display order.
    pub fn visible_rows(&self) -> Vec<Value> {
        self.grid().visible()
    }

    pub fn is_destroyed(&self) -> bool {
        self.grid().destroyed
    }

    /// Number of calls received through the `ExternalTable` interface.
    pub fn call_count(&self) -> usize {
        self.inner.calls.load(AtomicOrdering::SeqCst)
    }

    pub fn redraw_count(&self) -> usize {
        self.grid().redraws
    }

    /// Root node of the drawn table markup.
    pub fn table_node(&self) -> Option<NodeId> {
        self.grid().table_node
    }

    /// Cell currently being edited: active row position and field.
    pub fn cursor(&self) -> Option<(usize, String)> {
        let grid = self.grid();
        let (row, col) = grid.cursor?;
        Some((row, grid.columns.get(col)?.field.clone()))
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    fn active_row(&self, position: usize) -> Option<Value> {
        self.grid().active().get(position).cloned()
    }

    /// Simulate a click on the row at `position` of the active rows.
    pub fn click_row(&self, position: usize) -> Result<bool> {
        match self.active_row(position) {
            Some(row) => self.fire(TableEvent::RowClick, &row).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn double_click_row(&self, position: usize) -> Result<bool> {
        match self.active_row(position) {
            Some(row) => self.fire(TableEvent::RowDblClick, &row).map(|_| true),
            None => Ok(false),
        }
    }

    /// Toggle selection of the row at `position` of the active rows.
    pub fn toggle_select(&self, position: usize) -> Result<bool> {
        let Some(row) = self.active_row(position) else {
            return Ok(false);
        };
        let index = self.grid().index_of(&row);
        let selected = self.grid().selected.contains(&index);
        if selected {
            self.change_selection(&index, false)?;
        } else {
            self.change_selection(&index, true)?;
        }
        Ok(true)
    }

    pub fn click_cell(&self, position: usize, field: &str) -> Result<bool> {
        self.fire_cell(TableEvent::CellClick, position, field)
    }

    pub fn double_click_cell(&self, position: usize, field: &str) -> Result<bool> {
        self.fire_cell(TableEvent::CellDblClick, position, field)
    }

    /// Put the edit cursor on a cell without changing it.
    pub fn focus_cell(&self, position: usize, field: &str) -> bool {
        let mut grid = self.grid();
        match grid.column_position(field) {
            Some(col) if position < grid.active().len() => {
                grid.cursor = Some((position, col));
                true
            }
            _ => false,
        }
    }

    /// Simulate a user edit: `cellEditing`, the change, `cellEdited`, then
    /// `dataEdited` with every row.
    pub fn edit_cell(&self, position: usize, field: &str, value: Value) -> Result<bool> {
        let Some(row) = self.active_row(position) else {
            return Ok(false);
        };
        self.focus_cell(position, field);
        self.fire(TableEvent::CellEditing, &cell_payload(field, &row))?;

        let (edited, all) = {
            let mut grid = self.grid();
            let index = grid.index_of(&row);
            let Some(i) = grid.position(&index) else {
                return Ok(false);
            };
            grid.checkpoint();
            if let Value::Object(fields) = &mut grid.rows[i] {
                fields.insert(field.to_string(), value);
            }
            (grid.rows[i].clone(), Value::Array(grid.rows.clone()))
        };
        self.draw();

        self.fire(TableEvent::CellEdited, &cell_payload(field, &edited))?;
        self.fire(TableEvent::DataEdited, &all)?;
        Ok(true)
    }

    /// Simulate an edit the user abandoned.
    pub fn cancel_edit(&self, position: usize, field: &str) -> Result<bool> {
        let Some(row) = self.active_row(position) else {
            return Ok(false);
        };
        let payload = cell_payload(field, &row);
        self.fire(TableEvent::CellEditing, &payload)?;
        self.fire(TableEvent::CellEditCancelled, &payload)?;
        Ok(true)
    }

    fn fire_cell(&self, event: TableEvent, position: usize, field: &str) -> Result<bool> {
        match self.active_row(position) {
            Some(row) => self.fire(event, &cell_payload(field, &row)).map(|_| true),
            None => Ok(false),
        }
    }

    fn change_selection(&self, index: &Value, select: bool) -> Result<()> {
        let (row, selection) = {
            let mut grid = self.grid();
            let Some(i) = grid.position(index) else {
                return Ok(());
            };
            let already = grid.selected.contains(index);
            if already == select {
                return Ok(());
            }
            if select {
                grid.selected.push(index.clone());
            } else {
                grid.selected.retain(|s| s != index);
            }
            (grid.rows[i].clone(), Value::Array(grid.selected_rows()))
        };
        let event = if select {
            TableEvent::RowSelected
        } else {
            TableEvent::RowDeselected
        };
        self.fire(event, &row)?;
        self.fire(TableEvent::RowSelectionChanged, &selection)
    }

    fn restore(&self, undo: bool) -> Result<bool> {
        let all = {
            let mut grid = self.grid();
            let snapshot = if undo { grid.undo.pop() } else { grid.redo.pop() };
            let Some(snapshot) = snapshot else {
                return Ok(false);
            };
            let current = std::mem::replace(&mut grid.rows, snapshot);
            if undo {
                grid.redo.push(current);
            } else {
                grid.undo.push(current);
            }
            grid.clamp_page();
            Value::Array(grid.rows.clone())
        };
        self.draw();
        self.fire(TableEvent::DataEdited, &all)?;
        Ok(true)
    }
}

fn cell_payload(field: &str, row: &Value) -> Value {
    json!({
        "field": field,
        "value": row.get(field).cloned().unwrap_or(Value::Null),
        "row": row,
    })
}

impl ExternalTable for HeadlessTable {
    fn set_data(&self, data: Value) -> Result<()> {
        self.count_call();
        self.load(data, true)
    }

    fn replace_data(&self, data: Value) -> Result<()> {
        self.count_call();
        self.load(data, false)
    }

    fn get_data(&self, active_only: bool) -> Value {
        self.count_call();
        let grid = self.grid();
        Value::Array(if active_only {
            grid.active()
        } else {
            grid.rows.clone()
        })
    }

    fn get_selected_data(&self) -> Value {
        self.count_call();
        Value::Array(self.grid().selected_rows())
    }

    fn get_row_count(&self, active_only: bool) -> usize {
        self.count_call();
        let grid = self.grid();
        if active_only {
            grid.active().len()
        } else {
            grid.rows.len()
        }
    }

    fn add_row(&self, row: Value, at_top: bool) {
        self.count_call();
        {
            let mut grid = self.grid();
            grid.checkpoint();
            if at_top {
                grid.rows.insert(0, row);
            } else {
                grid.rows.push(row);
            }
        }
        self.draw();
    }

    fn update_or_add_data(&self, rows: Value) {
        self.count_call();
        let rows = match rows {
            Value::Array(rows) => rows,
            single => vec![single],
        };
        {
            let mut grid = self.grid();
            grid.checkpoint();
            for row in rows {
                let index = grid.index_of(&row);
                match grid.position(&index) {
                    Some(i) => match (&mut grid.rows[i], row) {
                        (Value::Object(existing), Value::Object(update)) => existing.extend(update),
                        (slot, row) => *slot = row,
                    },
                    None => grid.rows.push(row),
                }
            }
        }
        self.draw();
    }

    fn delete_row(&self, index: &Value) -> bool {
        self.count_call();
        let deleted = {
            let mut grid = self.grid();
            match grid.position(index) {
                Some(i) => {
                    grid.checkpoint();
                    grid.rows.remove(i);
                    grid.selected.retain(|s| s != index);
                    grid.clamp_page();
                    true
                }
                None => false,
            }
        };
        if deleted {
            self.draw();
        }
        deleted
    }

    fn clear_data(&self) {
        self.count_call();
        {
            let mut grid = self.grid();
            grid.rows.clear();
            grid.selected.clear();
            grid.cursor = None;
            grid.reset_page();
        }
        self.draw();
    }

    fn set_filter(&self, filter: NativeFilter) {
        self.count_call();
        {
            let mut grid = self.grid();
            grid.filter = Some(filter);
            grid.reset_page();
        }
        self.draw();
    }

    fn clear_filter(&self) {
        self.count_call();
        {
            let mut grid = self.grid();
            grid.filter = None;
            grid.clamp_page();
        }
        self.draw();
    }

    fn redraw(&self, _force: bool) {
        self.count_call();
        self.draw();
    }

    fn set_height(&self, height: &str) {
        self.count_call();
        self.grid().height = Some(height.to_string());
        self.draw();
    }

    fn get_page(&self) -> Option<u32> {
        self.count_call();
        self.grid().paging.map(|p| p.page)
    }

    fn get_page_size(&self) -> Option<u32> {
        self.count_call();
        self.grid().paging.map(|p| p.size)
    }

    fn get_page_max(&self) -> Option<u32> {
        self.count_call();
        self.grid().page_max()
    }

    fn set_page(&self, page: u32) -> bool {
        self.count_call();
        let changed = {
            let mut grid = self.grid();
            let max = grid.page_max();
            match (grid.paging.as_mut(), max) {
                (Some(p), Some(max)) if (1..=max).contains(&page) => {
                    p.page = page;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.draw();
        }
        changed
    }

    fn set_page_size(&self, size: u32) {
        self.count_call();
        {
            let mut grid = self.grid();
            let Some(p) = grid.paging.as_mut() else {
                return;
            };
            p.size = size.max(1);
            grid.clamp_page();
        }
        self.draw();
    }

    fn previous_page(&self) -> bool {
        self.count_call();
        let page = self.grid().paging.map(|p| p.page);
        match page {
            Some(page) if page > 1 => self.set_page(page - 1),
            _ => false,
        }
    }

    fn next_page(&self) -> bool {
        self.count_call();
        let page = self.grid().paging.map(|p| p.page);
        match page {
            Some(page) => self.set_page(page + 1),
            None => false,
        }
    }

    fn set_sort(&self, sorters: &[Sorter]) {
        self.count_call();
        self.grid().sorters = sorters.to_vec();
        self.draw();
    }

    fn clear_sort(&self) {
        self.count_call();
        self.grid().sorters.clear();
        self.draw();
    }

    fn get_sorters(&self) -> Vec<Sorter> {
        self.count_call();
        self.grid().sorters.clone()
    }

    fn undo(&self) -> Result<bool> {
        self.count_call();
        self.restore(true)
    }

    fn redo(&self) -> Result<bool> {
        self.count_call();
        self.restore(false)
    }

    fn get_history_undo_size(&self) -> usize {
        self.count_call();
        self.grid().undo.len()
    }

    fn get_history_redo_size(&self) -> usize {
        self.count_call();
        self.grid().redo.len()
    }

    fn clear_history(&self) {
        self.count_call();
        let mut grid = self.grid();
        grid.undo.clear();
        grid.redo.clear();
    }

    fn select_row(&self, index: &Value) -> Result<()> {
        self.count_call();
        self.change_selection(index, true)
    }

    fn deselect_row(&self, index: &Value) -> Result<()> {
        self.count_call();
        self.change_selection(index, false)
    }

    fn scroll_to_row(&self, index: &Value) -> bool {
        self.count_call();
        let target = {
            let mut grid = self.grid();
            let active = grid.active();
            let Some(position) = active.iter().position(|r| grid.index_of(r) == *index) else {
                return false;
            };
            if let Some(p) = grid.paging.as_mut() {
                let page = u32::try_from(position).unwrap_or(u32::MAX) / p.size + 1;
                if p.page == page {
                    return true;
                }
                p.page = page;
            }
            position
        };
        trace!("scrolled to active row {}", target);
        self.draw();
        true
    }

    fn navigate(&self, direction: Navigation) -> bool {
        self.count_call();
        let mut grid = self.grid();
        let Some((row, col)) = grid.cursor else {
            return false;
        };
        let (rows, cols) = (grid.active().len(), grid.columns.len());
        let next = match direction {
            Navigation::Up => row.checked_sub(1).map(|r| (r, col)),
            Navigation::Down => (row + 1 < rows).then_some((row + 1, col)),
            Navigation::Left => col.checked_sub(1).map(|c| (row, c)),
            Navigation::Right => (col + 1 < cols).then_some((row, col + 1)),
            Navigation::Next => {
                if col + 1 < cols {
                    Some((row, col + 1))
                } else {
                    (row + 1 < rows).then_some((row + 1, 0))
                }
            }
            Navigation::Previous => match (col.checked_sub(1), row.checked_sub(1)) {
                (Some(c), _) => Some((row, c)),
                (None, Some(r)) => Some((r, cols.saturating_sub(1))),
                (None, None) => None,
            },
        };
        match next {
            Some(cursor) => {
                grid.cursor = Some(cursor);
                true
            }
            None => false,
        }
    }

    fn destroy(&self) {
        self.count_call();
        let node = {
            let mut grid = self.grid();
            if grid.destroyed {
                return;
            }
            grid.destroyed = true;
            grid.filter = None;
            grid.table_node.take()
        };
        if let Some(node) = node
            && self.inner.dom.contains(node)
            && let Err(e) = self.inner.dom.remove(node)
        {
            warn!("failed to remove table markup: {}", e);
        }
    }
}

/// Factory producing `HeadlessTable`s and keeping every table it built.
#[derive(Clone, Default)]
pub struct HeadlessFactory {
    tables: Arc<Mutex<Vec<HeadlessTable>>>,
}

impl fmt::Debug for HeadlessFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessFactory")
            .field("created", &self.created_count())
            .finish()
    }
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every table created so far, oldest first.
    pub fn instances(&self) -> Vec<HeadlessTable> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// The most recently created table.
    pub fn last(&self) -> Option<HeadlessTable> {
        self.tables
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last()
            .cloned()
    }

    pub fn created_count(&self) -> usize {
        self.tables.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Tables that have not been destroyed.
    pub fn live(&self) -> Vec<HeadlessTable> {
        self.instances()
            .into_iter()
            .filter(|t| !t.is_destroyed())
            .collect()
    }
}

impl TableFactory for HeadlessFactory {
    fn create(
        &self,
        dom: &Dom,
        host: NodeId,
        data: Value,
        options: NativeOptions,
    ) -> Result<Arc<dyn ExternalTable>> {
        let table = HeadlessTable::create(dom, host, data, options)?;
        self.tables
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(table.clone());
        Ok(Arc::new(table))
    }
}
