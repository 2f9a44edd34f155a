//! Adapter for the Tabulator grid.
//!
//! The grid is an imperative widget that owns its DOM subtree. `Tabulator<T>`
//! drives one instance through the `ExternalTable` contract: it serializes
//! typed records with a `Codec`, wires every native callback to a custom DOM
//! event on the host element, and keeps paging across rebuilds.
//! `HeadlessFactory` provides an in-memory implementation of the contract.

mod adapter;
mod codec;
mod events;
mod headless;
mod instance;
mod options;

pub use adapter::{
    AdapterConfig, AdapterState, DataSource, FilterPredicate, Paging, Tabulator, TabulatorBuilder,
};
pub use codec::{Codec, JsonCodec};
pub use events::TableEvent;
pub use headless::{HeadlessFactory, HeadlessTable};
pub use instance::{
    ExternalTable, Navigation, NativeCallback, NativeFilter, NativeOptions, TableFactory,
};
pub use options::{ColumnDefinition, Layout, SortDir, Sorter, TableCallbacks, TableOptions};
