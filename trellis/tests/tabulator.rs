use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde::Serialize;
use serde_json::{Value, json};
use trellis::prelude::*;
use trellis::tabulator::{
    AdapterState, Codec, ExternalTable, HeadlessTable, Paging, SortDir, Sorter, TableCallbacks,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    id: u32,
    name: String,
    age: u32,
}

fn person(id: u32) -> Person {
    Person {
        id,
        name: format!("p{id}"),
        age: 20 + id,
    }
}

fn people(n: u32) -> Vec<Person> {
    (0..n).map(person).collect()
}

fn columns() -> TableOptions {
    TableOptions::new()
        .column(ColumnDefinition::new("Id", "id"))
        .column(ColumnDefinition::new("Name", "name").editor("input"))
        .column(ColumnDefinition::new("Age", "age"))
}

struct Harness {
    dom: Dom,
    scheduler: Scheduler,
    root: Root,
    page: Container,
}

/// Mount `table` inside a container under the document body.
fn mount(table: &Tabulator<Person>) -> Harness {
    mount_with(table, RootConfig::default())
}

fn mount_with(table: &Tabulator<Person>, config: RootConfig) -> Harness {
    let dom = Dom::new();
    let scheduler = Scheduler::new();
    let page = Container::div();
    page.add(Arc::new(table.clone()));
    let root = Root::mount(&dom, dom.body(), Arc::new(page.clone()), &scheduler, config).unwrap();
    Harness {
        dom,
        scheduler,
        root,
        page,
    }
}

/// Collect the `detail` of every `name` event reaching `node`.
fn capture(dom: &Dom, node: NodeId, name: &str) -> Arc<Mutex<Vec<Value>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    dom.add_event_listener(
        node,
        name,
        Arc::new(move |event: &DomEvent| sink.lock().unwrap().push(event.detail.clone())),
    )
    .unwrap();
    seen
}

fn instance(factory: &HeadlessFactory) -> HeadlessTable {
    factory.last().unwrap()
}

// ============================================================================
// Codec
// ============================================================================

#[test]
fn test_json_codec_round_trip() {
    let codec = JsonCodec::<Person>::new();
    let records = people(2);

    let native = codec.encode(&records).unwrap();

    assert_eq!(native[1], json!({"id": 1, "name": "p1", "age": 21}));
    assert_eq!(codec.decode(&native).unwrap(), records);
    assert_eq!(codec.decode_text(&codec.encode_text(&records).unwrap()).unwrap(), records);
}

#[test]
fn test_json_codec_rejects_malformed_data() {
    let codec = JsonCodec::<Person>::new();

    assert!(matches!(
        codec.decode(&json!({"id": 1})),
        Err(Error::Malformed(_))
    ));
    assert!(matches!(
        codec.decode(&json!([{"id": "one", "name": "x", "age": 1}])),
        Err(Error::Codec(_))
    ));
    assert!(codec.decode(&Value::Null).unwrap().is_empty());
}

// ============================================================================
// Attach / detach
// ============================================================================

#[test]
fn test_attach_creates_instance_with_records() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(3))
        .build();
    assert_eq!(table.state(), AdapterState::Unattached);

    let h = mount(&table);

    assert!(table.is_attached());
    assert_eq!(factory.created_count(), 1);
    let host = table.host().unwrap();
    assert!(h.dom.has_class(host, "tabulator-host"));
    assert_eq!(instance(&factory).host(), host);
    assert_eq!(instance(&factory).rows().len(), 3);
    assert_eq!(table.get_data(false).unwrap(), people(3));
    assert_eq!(table.get_row_count(false), 3);

    let markup = h.dom.outer_html(host);
    assert!(markup.contains("class=\"tabulator-col\">Name</div>"));
    assert!(markup.contains("data-index=\"2\""));
}

#[test]
fn test_host_tag_and_id_follow_config() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .config(AdapterConfig::new().host_tag("section").host_id("people"))
        .build();

    let h = mount(&table);

    let host = h.dom.get_element_by_id("people").unwrap();
    assert_eq!(h.dom.tag(host).as_deref(), Some("section"));
    assert_eq!(table.host(), Some(host));
}

#[test]
fn test_unmount_destroys_instance() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone()).data(people(2)).build();
    let h = mount(&table);

    h.root.unmount().unwrap();

    assert_eq!(table.state(), AdapterState::Unattached);
    assert!(table.host().is_none());
    assert!(instance(&factory).is_destroyed());
    assert!(factory.live().is_empty());
}

#[test]
fn test_pass_throughs_are_noops_while_detached() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10).history(true))
        .data(people(30))
        .build();

    // Never attached
    assert_eq!(table.get_page(), -1);
    assert_eq!(table.get_page_size(), -1);
    assert_eq!(table.get_page_max(), -1);
    assert!(!table.set_page(2));
    assert!(table.get_data(false).unwrap().is_empty());
    assert_eq!(factory.created_count(), 0);

    let h = mount(&table);
    h.root.unmount().unwrap();
    let destroyed = instance(&factory);
    let calls = destroyed.call_count();
    let mutations = h.dom.mutation_count();

    assert_eq!(table.get_page(), -1);
    assert_eq!(table.get_page_size(), -1);
    assert_eq!(table.get_page_max(), -1);
    assert!(!table.set_page(2));
    assert!(!table.next_page());
    assert!(!table.previous_page());
    table.set_page_size(5);
    table.redraw(true);
    table.set_height("200px");
    assert!(!table.undo().unwrap());
    assert!(!table.redo().unwrap());
    assert_eq!(table.get_history_undo_size(), 0);
    assert_eq!(table.get_history_redo_size(), 0);
    table.clear_history();
    table.select_row(1).unwrap();
    table.deselect_row(1).unwrap();
    assert!(table.get_selected_data().unwrap().is_empty());
    assert!(!table.scroll_to_row(1));
    assert!(!table.navigate_up());
    assert!(!table.navigate_down());
    assert!(!table.navigate_left());
    assert!(!table.navigate_right());
    assert!(!table.navigate_next());
    assert!(!table.navigate_prev());
    table.set_sort("age", SortDir::Asc);
    table.clear_sort();
    assert!(table.get_sorters().is_empty());
    assert_eq!(table.get_row_count(true), 0);
    table.add_row(&person(99), true).unwrap();
    table.update_or_add_data(&[person(98)]).unwrap();
    assert!(!table.delete_row(1));
    table.clear_data();
    table.set_filter(|p: &Person| p.age > 30);
    assert!(!table.apply_filter().unwrap());
    table.clear_filter();
    table.set_data(&people(3)).unwrap();
    assert!(!table.refresh());

    assert_eq!(destroyed.call_count(), calls);
    assert_eq!(h.dom.mutation_count(), mutations);
    assert_eq!(factory.created_count(), 1);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_native_events_become_bubbling_dom_events() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(3))
        .build();
    let dom = Dom::new();
    let loaded = capture(&dom, dom.body(), "tabulatorDataLoaded");
    let clicks = capture(&dom, dom.body(), "tabulatorRowClick");
    let scheduler = Scheduler::new();
    let _root = Root::mount(
        &dom,
        dom.body(),
        Arc::new(table.clone()),
        &scheduler,
        RootConfig::default(),
    )
    .unwrap();

    assert_eq!(loaded.lock().unwrap().len(), 1);
    assert_eq!(table.decode_rows(&loaded.lock().unwrap()[0]).unwrap(), people(3));

    assert!(instance(&factory).click_row(1).unwrap());
    assert!(!instance(&factory).click_row(7).unwrap());

    let clicks = clicks.lock().unwrap();
    assert_eq!(clicks.len(), 1);
    assert_eq!(table.decode_row(&clicks[0]).unwrap(), Some(person(1)));
}

#[test]
fn test_user_callback_replaces_default_dispatch() {
    let factory = HeadlessFactory::new();
    let rows = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&rows);
    let table = Tabulator::json(factory.clone())
        .options(columns().callbacks(
            TableCallbacks::new().on(TableEvent::RowClick, move |row| {
                sink.lock().unwrap().push(row.clone());
            }),
        ))
        .data(people(2))
        .build();
    let h = mount(&table);
    let dispatched = capture(&h.dom, h.dom.body(), "tabulatorRowClick");
    let double = capture(&h.dom, h.dom.body(), "tabulatorRowDblClick");

    instance(&factory).click_row(0).unwrap();
    instance(&factory).double_click_row(0).unwrap();

    assert_eq!(rows.lock().unwrap().len(), 1);
    assert_eq!(rows.lock().unwrap()[0]["name"], "p0");
    assert!(dispatched.lock().unwrap().is_empty());
    assert_eq!(double.lock().unwrap().len(), 1);
}

#[test]
fn test_failing_callback_propagates_error() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().callbacks(TableCallbacks::new().try_on(
            TableEvent::CellClick,
            |_| Err(Error::malformed("rejected")),
        )))
        .data(people(1))
        .build();
    let _h = mount(&table);

    let result = instance(&factory).click_cell(0, "name");

    assert!(matches!(result, Err(Error::Malformed(_))));
}

#[test]
fn test_on_event_listens_on_host() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(2))
        .build();
    let before = Arc::new(AtomicUsize::new(0));
    let b = Arc::clone(&before);
    table.on_event(TableEvent::RowDblClick, move |event| {
        assert_eq!(event.detail["id"], 1);
        b.fetch_add(1, Ordering::SeqCst);
    });
    let h = mount(&table);

    let after = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&after);
    table.on_event(TableEvent::CellEdited, move |event| {
        sink.lock().unwrap().push(event.detail["value"].clone());
    });
    h.scheduler.flush().unwrap();

    instance(&factory).double_click_row(1).unwrap();
    instance(&factory)
        .edit_cell(0, "name", json!("Ann"))
        .unwrap();

    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(*after.lock().unwrap(), vec![json!("Ann")]);
    assert_eq!(factory.created_count(), 1);
}

// ============================================================================
// Paging across rebuilds
// ============================================================================

#[test]
fn test_forced_refresh_keeps_page() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10))
        .data(people(50))
        .build();
    let _h = mount(&table);
    assert_eq!(table.get_page(), 1);
    assert_eq!(table.get_page_max(), 5);

    assert!(table.set_page(3));
    assert!(table.refresh());

    assert_eq!(factory.created_count(), 2);
    assert!(factory.instances()[0].is_destroyed());
    assert_eq!(table.get_page(), 3);
    assert_eq!(table.get_page_size(), 10);
    assert_eq!(instance(&factory).visible_rows()[0]["id"], 20);
    assert!(table.captured_paging().is_none());
}

#[test]
fn test_page_size_survives_refresh() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10))
        .data(people(50))
        .build();
    let _h = mount(&table);

    table.set_page_size(20);
    assert!(table.set_page(2));
    table.refresh();

    assert_eq!(table.get_page(), 2);
    assert_eq!(table.get_page_size(), 20);
    assert_eq!(table.get_page_max(), 3);
}

#[test]
fn test_unpaginated_table_reports_no_page() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone()).data(people(5)).build();
    let _h = mount(&table);

    assert_eq!(table.get_page(), -1);
    assert_eq!(table.get_page_size(), -1);
    assert_eq!(table.get_page_max(), -1);
    assert!(!table.next_page());
    assert!(table.refresh());
    assert_eq!(table.get_page(), -1);
}

#[test]
fn test_replace_data_keeps_page_and_set_data_resets_it() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10))
        .data(people(50))
        .build();
    let _h = mount(&table);
    table.set_page(3);

    table.replace_data(&people(50)).unwrap();
    assert_eq!(table.get_page(), 3);

    table.set_data(&people(50)).unwrap();
    assert_eq!(table.get_page(), 1);
    assert_eq!(factory.created_count(), 1);
}

#[test]
fn test_paging_buttons_move_between_pages() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10))
        .data(people(25))
        .build();
    let _h = mount(&table);

    assert!(!table.previous_page());
    assert!(table.next_page());
    assert!(table.next_page());
    assert!(!table.next_page());
    assert_eq!(table.get_page(), 3);
    assert!(table.scroll_to_row(4));
    assert_eq!(table.get_page(), 1);
}

// ============================================================================
// Locale and options
// ============================================================================

#[test]
fn test_locale_change_rebuilds_with_translated_titles() {
    let factory = HeadlessFactory::new();
    let catalog = Catalog::new()
        .entry("en", "col.name", "Name")
        .entry("de", "col.name", "Bezeichnung");
    let table = Tabulator::json(factory.clone())
        .options(
            TableOptions::new()
                .column(ColumnDefinition::new("col.name", "name").translated())
                .paginate(10),
        )
        .data(people(30))
        .build();
    let h = mount_with(&table, RootConfig::new().translator(catalog));
    let host = table.host().unwrap();
    assert!(h.dom.outer_html(host).contains(">Name</div>"));
    table.set_page(2);

    h.root.set_locale("de");
    h.scheduler.flush().unwrap();

    assert_eq!(factory.created_count(), 2);
    assert_eq!(table.host(), Some(host));
    assert_eq!(h.dom.children(host).len(), 1);
    assert!(h.dom.outer_html(host).contains(">Bezeichnung</div>"));
    assert_eq!(table.get_page(), 2);
}

#[test]
fn test_unrelated_render_does_not_rebuild() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone()).data(people(2)).build();
    let h = mount(&table);

    let redraws = instance(&factory).redraw_count();

    h.page.add(Arc::new(Tag::span("footer")));
    h.scheduler.flush().unwrap();

    assert_eq!(factory.created_count(), 1);
    assert_eq!(instance(&factory).redraw_count(), redraws);
    assert!(table.is_attached());
}

#[test]
fn test_initial_page_option_is_applied() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10).initial_page(3))
        .data(people(50))
        .build();
    let _h = mount(&table);

    assert_eq!(table.get_page(), 3);
    assert_eq!(table.get_page_size(), 10);
    assert_eq!(table.get_page_max(), 5);
}

#[test]
fn test_initial_page_beyond_data_is_clamped() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10).initial_page(9))
        .data(people(25))
        .build();
    let _h = mount(&table);

    assert_eq!(table.get_page(), 3);
}

#[test]
fn test_set_options_rebuilds_on_next_render() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(5))
        .data(people(20))
        .build();
    let h = mount(&table);
    table.set_page(4);

    table.set_options(table.options().placeholder("Nothing here"));
    assert_eq!(factory.created_count(), 1);
    h.scheduler.flush().unwrap();

    assert_eq!(factory.created_count(), 2);
    assert_eq!(table.get_page(), 4);

    table.clear_data();
    let host = table.host().unwrap();
    assert!(h.dom.text_content(host).contains("Nothing here"));
}

// ============================================================================
// Container moves
// ============================================================================

#[test]
fn test_readd_before_flush_reuses_host() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10))
        .data(people(30))
        .build();
    let h = mount(&table);
    let host = table.host().unwrap();
    table.set_page(2);

    let removed = h.page.remove(&table).unwrap();
    assert_eq!(table.state(), AdapterState::Unattached);
    assert_eq!(table.captured_paging(), Some(Paging { page: 2, size: 10 }));

    h.page.add(removed);
    assert!(table.is_attached());
    h.scheduler.flush().unwrap();

    assert_eq!(table.host(), Some(host));
    assert_eq!(factory.created_count(), 2);
    assert_eq!(factory.live().len(), 1);
    assert_eq!(table.get_page(), 2);
}

#[test]
fn test_readd_after_flush_creates_new_host() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().paginate(10))
        .data(people(30))
        .build();
    let h = mount(&table);
    let host = table.host().unwrap();
    table.set_page(3);

    h.page.remove(&table).unwrap();
    h.scheduler.flush().unwrap();
    assert!(!h.dom.contains(host));
    assert!(table.host().is_none());

    h.page.add(Arc::new(table.clone()));
    assert!(!table.is_attached());
    h.scheduler.flush().unwrap();

    assert!(table.is_attached());
    assert_ne!(table.host(), Some(host));
    assert_eq!(factory.created_count(), 2);
    assert_eq!(table.get_page(), 3);
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_applies_typed_predicate() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(5))
        .build();
    let _h = mount(&table);

    table.set_filter(|p: &Person| p.age >= 22);
    assert!(table.apply_filter().unwrap());

    assert_eq!(table.get_row_count(true), 3);
    assert_eq!(table.get_row_count(false), 5);
    assert_eq!(table.get_data(true).unwrap(), vec![person(2), person(3), person(4)]);

    // Reapplied to the rebuilt instance
    table.refresh();
    assert_eq!(table.get_row_count(true), 3);

    table.clear_filter();
    assert_eq!(table.get_row_count(true), 5);
    assert!(!table.apply_filter().unwrap());
}

#[test]
fn test_filter_requires_predicate_and_codec() {
    let factory = HeadlessFactory::new();
    let plain = Tabulator::<Person>::builder(factory.clone()).build();
    let _h = mount(&plain);

    assert!(!plain.has_codec());
    assert!(!plain.apply_filter().unwrap());
    plain.set_filter(|_| true);
    assert!(!plain.apply_filter().unwrap());
    assert!(plain.get_data(false).unwrap().is_empty());
    assert_eq!(plain.decode_row(&json!({"id": 1})).unwrap(), None);
    assert!(plain.decode_rows(&json!([{"id": 1}])).unwrap().is_empty());
}

#[test]
fn test_filter_reports_undecodable_rows() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(2))
        .build();
    let _h = mount(&table);
    instance(&factory).add_row(json!({"id": 9, "name": 5, "age": 1}), false);

    table.set_filter(|_| true);

    assert!(matches!(table.apply_filter(), Err(Error::Codec(_))));
    assert_eq!(table.get_row_count(true), 3);
}

// ============================================================================
// Data sync
// ============================================================================

#[test]
fn test_observable_source_updates_are_pushed() {
    let factory = HeadlessFactory::new();
    let list = ObservableList::new(people(2));
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .observable(list.clone())
        .build();
    let _h = mount(&table);

    list.push(person(2));
    assert_eq!(instance(&factory).rows().len(), 3);

    list.remove(0);
    assert_eq!(table.get_data(false).unwrap(), vec![person(1), person(2)]);
    assert_eq!(table.native_data().as_array().map(Vec::len), Some(2));
}

#[test]
fn test_source_updates_while_detached_apply_on_attach() {
    let factory = HeadlessFactory::new();
    let list = ObservableList::new(people(1));
    let table = Tabulator::json(factory.clone())
        .observable(list.clone())
        .build();

    list.push(person(1));
    let _h = mount(&table);

    assert_eq!(instance(&factory).rows().len(), 2);
}

#[test]
fn test_set_source_switches_subscription() {
    let factory = HeadlessFactory::new();
    let first = ObservableList::new(people(1));
    let second = ObservableList::new(people(3));
    let table = Tabulator::json(factory.clone())
        .observable(first.clone())
        .build();
    let _h = mount(&table);

    table.set_source(DataSource::Observable(second.clone())).unwrap();
    first.push(person(7));

    assert_eq!(first.subscriber_count(), 0);
    assert_eq!(second.subscriber_count(), 1);
    assert_eq!(table.get_row_count(false), 3);
}

#[test]
fn test_dropping_table_unsubscribes() {
    let factory = HeadlessFactory::new();
    let list = ObservableList::new(people(1));
    let table = Tabulator::json(factory).observable(list.clone()).build();
    assert_eq!(list.subscriber_count(), 1);

    drop(table);

    assert_eq!(list.subscriber_count(), 0);
}

#[test]
fn test_edits_are_written_back_with_auto_sync() {
    let factory = HeadlessFactory::new();
    let list = ObservableList::new(people(3));
    let edited = Arc::new(AtomicUsize::new(0));
    let e = Arc::clone(&edited);
    let table = Tabulator::json(factory.clone())
        .options(columns().callbacks(TableCallbacks::new().on(TableEvent::DataEdited, move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })))
        .observable(list.clone())
        .config(AdapterConfig::new().auto_sync(true))
        .build();
    let _h = mount(&table);
    let calls = instance(&factory).call_count();

    assert!(instance(&factory).edit_cell(0, "name", json!("Zed")).unwrap());

    assert_eq!(list.get(0).unwrap().name, "Zed");
    assert_eq!(list.len(), 3);
    assert_eq!(edited.load(Ordering::SeqCst), 1);
    // The write-back is not echoed into the table
    assert_eq!(instance(&factory).call_count(), calls);
    assert_eq!(table.native_data()[0]["name"], "Zed");
}

#[test]
fn test_edits_stay_in_table_without_auto_sync() {
    let factory = HeadlessFactory::new();
    let list = ObservableList::new(people(2));
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .observable(list.clone())
        .build();
    let h = mount(&table);
    let edits = capture(&h.dom, h.dom.body(), "tabulatorDataEdited");

    instance(&factory).edit_cell(1, "age", json!(99)).unwrap();

    assert_eq!(list.get(1).unwrap().age, 21);
    assert_eq!(table.native_data()[1]["age"], 99);
    assert_eq!(edits.lock().unwrap().len(), 1);

    // A rebuild starts from the edited rows
    table.refresh();
    assert_eq!(table.get_data(false).unwrap()[1].age, 99);
}

#[test]
fn test_undecodable_edit_is_an_error() {
    let factory = HeadlessFactory::new();
    let list = ObservableList::new(people(2));
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .observable(list.clone())
        .config(AdapterConfig::new().auto_sync(true))
        .build();
    let _h = mount(&table);

    let result = instance(&factory).edit_cell(0, "age", json!("old"));

    assert!(matches!(result, Err(Error::Codec(_))));
    assert_eq!(list.to_vec(), people(2));
}

// ============================================================================
// Rows, selection, sorting, history, navigation
// ============================================================================

#[test]
fn test_row_operations_keep_native_copy_in_step() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(3))
        .build();
    let _h = mount(&table);

    table.add_row(&person(10), true).unwrap();
    assert_eq!(table.get_data(false).unwrap()[0], person(10));
    assert_eq!(table.native_data().as_array().map(Vec::len), Some(4));

    let renamed = Person {
        name: "renamed".into(),
        ..person(1)
    };
    table.update_or_add_data(&[renamed.clone(), person(11)]).unwrap();
    let rows = table.get_data(false).unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.contains(&renamed));

    assert!(table.delete_row(11));
    assert!(!table.delete_row(42));
    assert_eq!(table.get_row_count(false), 4);

    table.clear_data();
    assert_eq!(table.get_row_count(false), 0);
    assert_eq!(table.native_data(), json!([]));
}

#[test]
fn test_selection_round_trip() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().selectable(true))
        .data(people(3))
        .build();
    let h = mount(&table);
    let changes = capture(&h.dom, h.dom.body(), "tabulatorRowSelectionChanged");

    table.select_row(1).unwrap();
    table.select_row(1).unwrap();
    assert_eq!(table.get_selected_data().unwrap(), vec![person(1)]);

    instance(&factory).toggle_select(2).unwrap();
    assert_eq!(table.get_selected_data().unwrap(), vec![person(1), person(2)]);

    table.deselect_row(1).unwrap();
    assert_eq!(table.get_selected_data().unwrap(), vec![person(2)]);

    let changes = changes.lock().unwrap();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[2].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_sorting() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().initial_sort(Sorter::desc("age")))
        .data(people(3))
        .build();
    let _h = mount(&table);
    let ids = |t: &Tabulator<Person>| -> Vec<u32> {
        t.get_data(true).unwrap().iter().map(|p| p.id).collect()
    };

    assert_eq!(table.get_sorters(), vec![Sorter::desc("age")]);
    assert_eq!(ids(&table), vec![2, 1, 0]);

    table.set_sort("age", SortDir::Asc);
    assert_eq!(ids(&table), vec![0, 1, 2]);

    table.set_sorters(vec![Sorter::desc("name")]);
    assert_eq!(ids(&table), vec![2, 1, 0]);

    table.clear_sort();
    assert!(table.get_sorters().is_empty());
}

#[test]
fn test_history_undo_redo() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns().history(true))
        .data(people(2))
        .build();
    let _h = mount(&table);
    assert!(!table.undo().unwrap());

    instance(&factory).edit_cell(0, "name", json!("Zed")).unwrap();
    assert_eq!(table.get_history_undo_size(), 1);

    assert!(table.undo().unwrap());
    assert_eq!(table.get_data(false).unwrap()[0].name, "p0");
    assert_eq!(table.native_data()[0]["name"], "p0");
    assert_eq!(table.get_history_redo_size(), 1);

    assert!(table.redo().unwrap());
    assert_eq!(table.get_data(false).unwrap()[0].name, "Zed");

    table.clear_history();
    assert_eq!(table.get_history_undo_size(), 0);
    assert!(!table.undo().unwrap());
}

#[test]
fn test_cell_navigation() {
    let factory = HeadlessFactory::new();
    let table = Tabulator::json(factory.clone())
        .options(columns())
        .data(people(3))
        .build();
    let _h = mount(&table);
    let cursor = || instance(&factory).cursor();

    assert!(!table.navigate_down());
    assert!(instance(&factory).focus_cell(0, "id"));

    assert!(table.navigate_right());
    assert_eq!(cursor(), Some((0, "name".to_string())));
    assert!(table.navigate_down());
    assert!(table.navigate_next());
    assert_eq!(cursor(), Some((1, "age".to_string())));
    assert!(table.navigate_next());
    assert_eq!(cursor(), Some((2, "id".to_string())));
    assert!(table.navigate_prev());
    assert_eq!(cursor(), Some((1, "age".to_string())));
    assert!(table.navigate_up());
    assert!(!table.navigate_up());
    assert!(table.navigate_left());
    assert_eq!(cursor(), Some((0, "name".to_string())));
}
