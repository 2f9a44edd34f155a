use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use trellis_dom::{Dom, DomError, DomEvent};

// ============================================================================
// Tree structure
// ============================================================================

#[test]
fn test_append_and_text_content() {
    let dom = Dom::new();
    let div = dom.create_element("div");
    let a = dom.create_text("hello ");
    let b = dom.create_text("world");
    dom.append_child(dom.body(), div).unwrap();
    dom.append_child(div, a).unwrap();
    dom.append_child(div, b).unwrap();

    assert_eq!(dom.text_content(div), "hello world");
    assert_eq!(dom.children(div), vec![a, b]);
    assert_eq!(dom.parent(a), Some(div));
    assert!(dom.is_connected(b));
}

#[test]
fn test_insert_before_moves_existing_child() {
    let dom = Dom::new();
    let list = dom.create_element("ul");
    let first = dom.create_element("li");
    let second = dom.create_element("li");
    dom.append_child(list, first).unwrap();
    dom.append_child(list, second).unwrap();

    dom.insert_before(list, second, Some(first)).unwrap();

    assert_eq!(dom.children(list), vec![second, first]);
}

#[test]
fn test_remove_child_rejects_foreign_node() {
    let dom = Dom::new();
    let a = dom.create_element("div");
    let b = dom.create_element("div");

    let err = dom.remove_child(a, b).unwrap_err();
    assert_eq!(err, DomError::NotAChild { parent: a, child: b });
}

#[test]
fn test_cannot_insert_ancestor_into_descendant() {
    let dom = Dom::new();
    let outer = dom.create_element("div");
    let inner = dom.create_element("div");
    dom.append_child(outer, inner).unwrap();

    let err = dom.append_child(inner, outer).unwrap_err();
    assert!(matches!(err, DomError::HierarchyRequest { .. }));
}

#[test]
fn test_remove_drops_subtree() {
    let dom = Dom::new();
    let outer = dom.create_element("div");
    let inner = dom.create_element("span");
    dom.append_child(dom.body(), outer).unwrap();
    dom.append_child(outer, inner).unwrap();

    dom.remove(outer).unwrap();

    assert!(!dom.contains(outer));
    assert!(!dom.contains(inner));
    assert!(dom.children(dom.body()).is_empty());
}

#[test]
fn test_unchanged_attribute_is_not_a_mutation() {
    let dom = Dom::new();
    let div = dom.create_element("div");
    dom.set_attribute(div, "title", "x").unwrap();
    let before = dom.mutation_count();

    dom.set_attribute(div, "title", "x").unwrap();
    dom.add_class(div, "a").unwrap();
    dom.add_class(div, "a").unwrap();

    assert_eq!(dom.mutation_count(), before + 1);
    assert_eq!(dom.outer_html(div), "<div title=\"x\" class=\"a\"></div>");
}

#[test]
fn test_get_element_by_id() {
    let dom = Dom::new();
    let div = dom.create_element("div");
    dom.set_attribute(div, "id", "grid").unwrap();
    assert_eq!(dom.get_element_by_id("grid"), None);

    dom.append_child(dom.body(), div).unwrap();
    assert_eq!(dom.get_element_by_id("grid"), Some(div));
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_custom_event_carries_detail() {
    let dom = Dom::new();
    let div = dom.create_element("div");
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    dom.add_event_listener(
        div,
        "tabulatorRowClick",
        Arc::new(move |e: &DomEvent| {
            *sink.lock().unwrap() = Some((e.target, e.detail.clone()));
        }),
    )
    .unwrap();

    let invoked = dom
        .dispatch_event(div, DomEvent::custom("tabulatorRowClick", json!({"id": 1})))
        .unwrap();

    assert_eq!(invoked, 1);
    assert_eq!(*seen.lock().unwrap(), Some((Some(div), json!({"id": 1}))));
}

#[test]
fn test_event_bubbles_only_when_requested() {
    let dom = Dom::new();
    let outer = dom.create_element("div");
    let inner = dom.create_element("div");
    dom.append_child(outer, inner).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    dom.add_event_listener(
        outer,
        "ping",
        Arc::new(move |_: &DomEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();

    dom.dispatch_event(inner, DomEvent::new("ping")).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    dom.dispatch_event(inner, DomEvent::new("ping").bubbles(true))
        .unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listener_may_mutate_document() {
    let dom = Dom::new();
    let div = dom.create_element("div");
    let handle = dom.clone();
    dom.add_event_listener(
        div,
        "click",
        Arc::new(move |e: &DomEvent| {
            let target = e.target.unwrap();
            let text = handle.create_text("clicked");
            handle.append_child(target, text).unwrap();
        }),
    )
    .unwrap();

    dom.dispatch_event(div, DomEvent::new("click")).unwrap();

    assert_eq!(dom.text_content(div), "clicked");
}

#[test]
fn test_removed_listener_is_not_called() {
    let dom = Dom::new();
    let div = dom.create_element("div");
    let id = dom
        .add_event_listener(div, "click", Arc::new(|_: &DomEvent| panic!("removed")))
        .unwrap();
    dom.remove_event_listener(div, id).unwrap();

    assert_eq!(dom.dispatch_event(div, DomEvent::new("click")).unwrap(), 0);
}
