//! Tests for containers embedded inside host structures.

use entity_state::{EntityState, Transitions};
use serde_json::{json, Value};

fn some_data() -> Value {
    json!({
        "id": 123,
        "name": "The name",
        "company": {"id": 234, "name": "The company", "location": "The place"}
    })
}

fn structure_with_state() -> Value {
    let state = Transitions::default()
        .load(some_data(), None)
        .with_error(json!("Something went wrong here!"));
    json!({
        "hello": "there",
        "foo": "BAR",
        "something": serde_json::to_value(&state).unwrap(),
    })
}

fn fresh_state_value() -> Value {
    serde_json::to_value(EntityState::new()).unwrap()
}

// --- initialize / load ---

#[test]
fn test_initialize_at() {
    let host = Transitions::default()
        .initialize_at(json!({"bar": "BAR!", "foo": {"bar": "bar"}}), "foo")
        .unwrap();

    assert_eq!(host, json!({"bar": "BAR!", "foo": fresh_state_value()}));
}

#[test]
fn test_load_at_keeps_changes_from_existing_slot() {
    let host = json!({
        "foo": {"bar": "BAR"},
        "something": {
            "error": "Something went wrong.",
            "pathChange": {"write": "this"}
        }
    });

    let host = Transitions::default()
        .load_at(some_data(), host, "something")
        .unwrap();

    assert_eq!(host["foo"], json!({"bar": "BAR"}));
    assert_eq!(host["something"]["data"], some_data());
    assert_eq!(host["something"]["pathChange"], json!({"write": "this"}));
    assert_eq!(host["something"]["pathInitial"], json!({}));
    assert!(host["something"].get("error").is_none());
}

#[test]
fn test_load_at_nested_address() {
    let host = Transitions::default()
        .load_at(json!({"id": 1}), json!({"users": [{}, {}]}), "users[1].state")
        .unwrap();

    assert_eq!(host["users"][0], json!({}));
    assert_eq!(host["users"][1]["state"]["data"], json!({"id": 1}));
}

// --- set ---

#[test]
fn test_set_at() {
    let host = Transitions::default()
        .set_at(
            "email",
            json!("set3@example.com"),
            json!({"hello": "there", "fooBar": structure_with_state()["something"].clone()}),
            "fooBar",
        )
        .unwrap();

    assert_eq!(host["hello"], "there");
    assert_eq!(host["fooBar"]["data"]["email"], "set3@example.com");
    assert_eq!(host["fooBar"]["data"]["id"], 123);
    assert_eq!(host["fooBar"]["error"], "Something went wrong here!");
}

#[test]
fn test_deep_set_at() {
    let original = structure_with_state();
    let host = Transitions::default()
        .set_at("company.location", json!("The other place"), original.clone(), "something")
        .unwrap();

    let mut expected = original;
    expected["something"]["data"]["company"]["location"] = json!("The other place");
    assert_eq!(host, expected);
}

#[test]
fn test_set_at_empty_slot_initializes() {
    let host = Transitions::default()
        .set_at("email", json!("a@b.com"), json!({}), "user")
        .unwrap();
    assert_eq!(host["user"]["data"], json!({"email": "a@b.com"}));
    assert_eq!(host["user"]["pathChange"], json!({}));
}

// --- stage ---

#[test]
fn test_stage_at() {
    let original = structure_with_state();
    let host = Transitions::default()
        .stage_at("email", json!("stage3@example.com"), original.clone(), "something")
        .unwrap();

    let mut expected = original;
    expected["something"]["pathChange"] = json!({"email": "stage3@example.com"});
    expected["something"]["pathInitial"] = json!({"email": null});
    assert_eq!(host, expected);
}

#[test]
fn test_stage_deep_path_at() {
    let host = Transitions::default()
        .stage_at("company.location", json!("Somewhere else"), structure_with_state(), "something")
        .unwrap();

    assert_eq!(
        host["something"]["pathChange"],
        json!({"company.location": "Somewhere else"})
    );
    assert_eq!(
        host["something"]["pathInitial"],
        json!({"company.location": "The place"})
    );
    assert_eq!(host["something"]["data"], some_data());
}

#[test]
fn test_stage_at_keeps_unknown_slot_keys() {
    let host = json!({"user": {"custom": {"tag": 1}, "pathChange": {}}});
    let host = Transitions::default()
        .stage_at("email", json!("a@b.com"), host, "user")
        .unwrap();

    assert_eq!(host["user"]["custom"], json!({"tag": 1}));
    assert_eq!(host["user"]["pathChange"], json!({"email": "a@b.com"}));
}

// --- errors ---

#[test]
fn test_error_at_and_path_error_at() {
    let t = Transitions::default();
    let host = t.error_at(json!({"status": 404}), json!({}), "user").unwrap();
    let host = t.path_error_at("email", json!("invalid"), host, "user").unwrap();

    assert_eq!(host["user"]["error"], json!({"status": 404}));
    assert_eq!(host["user"]["pathError"], json!({"email": "invalid"}));
}

// --- clear / clean ---

#[test]
fn test_clear_at_removes_slot() {
    let host = Transitions::default()
        .clear_at(structure_with_state(), "something")
        .unwrap();
    assert_eq!(host, json!({"hello": "there", "foo": "BAR"}));
    assert!(host.get("something").is_none());
}

#[test]
fn test_clear_at_in_sequence_keeps_positions() {
    let host = Transitions::default()
        .clear_at(json!({"list": [{"data": 1}, {"data": 2}]}), "list[0]")
        .unwrap();
    assert_eq!(host, json!({"list": [null, {"data": 2}]}));
}

#[test]
fn test_clean_at() {
    let t = Transitions::default();
    let host = t.stage_at("name", json!("New"), structure_with_state(), "something").unwrap();
    let host = t.path_error_at("name", json!("bad"), host, "something").unwrap();

    let host = t.clean_at(host, "something").unwrap();

    assert_eq!(host["something"]["pathChange"], json!({}));
    assert_eq!(host["something"]["pathError"], json!({}));
    assert_eq!(host["something"]["pathInitial"], json!({"name": "The name"}));
    assert_eq!(host["something"]["data"], some_data());
    assert_eq!(host["hello"], "there");
}

// --- cleanPath / indent ---

#[test]
fn test_clean_path_at() {
    let t = Transitions::default();
    let host = t.stage_at("company.name", json!("Acme"), json!({}), "s").unwrap();
    let host = t.stage_at("name", json!("Bob"), host, "s").unwrap();

    let host = t.clean_path_at("company", host, "s").unwrap();
    assert_eq!(host["s"]["pathChange"], json!({"name": "Bob"}));
}

#[test]
fn test_indent_at() {
    let t = Transitions::default();
    let host = t.stage_at("x", json!(1), json!({}), "s").unwrap();
    let host = t.indent_at("a", host, "s").unwrap();
    assert_eq!(host["s"]["pathChange"], json!({"a.x": 1}));
}

// --- transparency ---

#[test]
fn test_embedded_equals_bare_then_write_back() {
    let t = Transitions::default();
    let host = structure_with_state();

    let via_host = t.stage_at("name", json!("New"), host.clone(), "something").unwrap();

    let bare = t.extract(&host, "something").unwrap();
    let bare = t.stage("name", json!("New"), bare).unwrap();
    let mut expected = host;
    expected["something"] = serde_json::to_value(&bare).unwrap();

    assert_eq!(via_host, expected);
}

#[test]
fn test_host_input_is_not_mutated() {
    let t = Transitions::default();
    let original = structure_with_state();
    let snapshot = original.clone();

    let _ = t.set_at("id", json!(1), original.clone(), "something").unwrap();
    assert_eq!(original, snapshot);
}
