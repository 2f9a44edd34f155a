//! Typed table options and their native form.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::{Map, Value};

use super::events::TableEvent;
use super::instance::NativeCallback;
use crate::error::Result;
use crate::widget::RenderContext;

/// Column sizing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
    FitData,
    FitDataFill,
    FitDataStretch,
    FitDataTable,
    FitColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    pub column: String,
    pub dir: SortDir,
}

impl Sorter {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Desc,
        }
    }
}

/// Definition of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Header text, or a translation key when `translate_title` is set.
    pub title: String,
    /// Record field shown in the column.
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoz_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_sort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,
    #[serde(skip)]
    pub translate_title: bool,
}

impl ColumnDefinition {
    pub fn new(title: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            field: field.into(),
            width: None,
            hoz_align: None,
            header_sort: None,
            editor: None,
            formatter: None,
            visible: None,
            frozen: None,
            translate_title: false,
        }
    }

    /// Treat the title as a translation key.
    pub fn translated(mut self) -> Self {
        self.translate_title = true;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn hoz_align(mut self, align: impl Into<String>) -> Self {
        self.hoz_align = Some(align.into());
        self
    }

    pub fn header_sort(mut self, enabled: bool) -> Self {
        self.header_sort = Some(enabled);
        self
    }

    pub fn editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    pub fn formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = Some(frozen);
        self
    }
}

/// Caller-supplied callbacks; slots left empty get the adapter's default
/// event dispatch.
#[derive(Clone, Default)]
pub struct TableCallbacks {
    slots: BTreeMap<TableEvent, NativeCallback>,
}

impl fmt::Debug for TableCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.slots.keys()).finish()
    }
}

impl TableCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for `event`.
    pub fn on<F>(mut self, event: TableEvent, callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.slots.insert(
            event,
            Arc::new(move |payload: &Value| {
                callback(payload);
                Ok(())
            }),
        );
        self
    }

    /// Set a fallible callback for `event`.
    pub fn try_on<F>(mut self, event: TableEvent, callback: F) -> Self
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.slots.insert(event, Arc::new(callback));
        self
    }

    pub fn get(&self, event: TableEvent) -> Option<&NativeCallback> {
        self.slots.get(&event)
    }

    pub fn contains(&self, event: TableEvent) -> bool {
        self.slots.contains_key(&event)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Table configuration.
///
/// Every recognized display option is a typed optional field; anything else
/// goes into `extra` and is passed through verbatim. `to_native` is the one
/// place the struct is turned into the native options object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDefinition>,
    /// Field identifying rows; the native default is `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_initial_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movable_columns: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub initial_sort: Vec<Sorter>,
    /// Locale override; the render context locale is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Language tables keyed by locale.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub langs: BTreeMap<String, Value>,
    /// Options without a typed field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub callbacks: TableCallbacks,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDefinition>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn index(mut self, field: impl Into<String>) -> Self {
        self.index = Some(field.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Enable local pagination with the given page size.
    pub fn paginate(mut self, page_size: u32) -> Self {
        self.pagination = Some(true);
        self.pagination_size = Some(page_size);
        self
    }

    pub fn initial_page(mut self, page: u32) -> Self {
        self.pagination_initial_page = Some(page);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = Some(selectable);
        self
    }

    pub fn history(mut self, enabled: bool) -> Self {
        self.history = Some(enabled);
        self
    }

    pub fn movable_columns(mut self, movable: bool) -> Self {
        self.movable_columns = Some(movable);
        self
    }

    pub fn initial_sort(mut self, sorter: Sorter) -> Self {
        self.initial_sort.push(sorter);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn lang(mut self, locale: impl Into<String>, table: Value) -> Self {
        self.langs.insert(locale.into(), table);
        self
    }

    /// Pass an untyped option through.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn callbacks(mut self, callbacks: TableCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Serialize to the native options object for `cx`.
    ///
    /// Translatable column titles are looked up for the context locale and
    /// the locale itself is filled in unless overridden.
    pub fn to_native(&self, cx: &RenderContext) -> Result<Value> {
        let mut resolved = self.clone();
        for column in &mut resolved.columns {
            if column.translate_title {
                column.title = cx.tr(&column.title);
            }
        }
        if resolved.locale.is_none() {
            resolved.locale = Some(cx.locale().to_string());
        }
        Ok(serde_json::to_value(&resolved)?)
    }

    /// Locale the native table is built with under `cx`.
    pub fn effective_locale(&self, cx: &RenderContext) -> String {
        self.locale
            .clone()
            .unwrap_or_else(|| cx.locale().to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::i18n::Catalog;

    #[test]
    fn test_native_form_uses_native_keys_and_skips_unset() {
        let options = TableOptions::new()
            .layout(Layout::FitColumns)
            .paginate(10)
            .column(ColumnDefinition::new("Name", "name").header_sort(false))
            .extra("responsiveLayout", json!("hide"));

        let native = options.to_native(&RenderContext::default()).unwrap();

        assert_eq!(
            native,
            json!({
                "layout": "fitColumns",
                "columns": [{"title": "Name", "field": "name", "headerSort": false}],
                "pagination": true,
                "paginationSize": 10,
                "locale": "en",
                "responsiveLayout": "hide",
            })
        );
    }

    #[test]
    fn test_translated_titles_follow_context_locale() {
        let catalog = Catalog::new().entry("de", "Name", "Bezeichnung");
        let cx = RenderContext::new("de", Arc::new(catalog));
        let options = TableOptions::new()
            .column(ColumnDefinition::new("Name", "name").translated())
            .column(ColumnDefinition::new("Name", "raw"));

        let native = options.to_native(&cx).unwrap();

        assert_eq!(native["columns"][0]["title"], "Bezeichnung");
        assert_eq!(native["columns"][1]["title"], "Name");
        assert_eq!(native["locale"], "de");
    }
}
