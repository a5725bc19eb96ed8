//! Tests for #[derive(Action)]

use std::collections::HashSet;

use unistate::{Action, ActionSummary};

#[derive(Action, Clone, Debug)]
#[action(summary)]
enum Todo {
    Add(String),
    Toggle { id: u64 },
    #[action(name = "ClearAll")]
    Clear,
}

#[test]
fn test_name_per_variant() {
    assert_eq!(Todo::Add("x".into()).name(), "Add");
    assert_eq!(Todo::Toggle { id: 1 }.name(), "Toggle");
    assert_eq!(Todo::Clear.name(), "ClearAll");
}

#[test]
fn test_kind_ignores_payload() {
    assert_eq!(Todo::Add("a".into()).kind(), Todo::Add("b".into()).kind());
    assert_eq!(Todo::Toggle { id: 1 }.kind(), TodoKind::Toggle);
    assert_eq!(Todo::Clear.kind(), TodoKind::Clear);
}

#[test]
fn test_kinds_are_distinct() {
    let kinds: HashSet<_> = [
        Todo::Add(String::new()).kind(),
        Todo::Toggle { id: 0 }.kind(),
        Todo::Clear.kind(),
    ]
    .into_iter()
    .collect();
    assert_eq!(kinds.len(), 3);
}

#[test]
fn test_kind_enum_helpers() {
    assert_eq!(
        TodoKind::all(),
        &[TodoKind::Add, TodoKind::Toggle, TodoKind::Clear]
    );
    // Kind names follow the variant, not the name override
    assert_eq!(TodoKind::Clear.name(), "Clear");
}

#[test]
fn test_summary_uses_debug() {
    assert_eq!(Todo::Toggle { id: 7 }.summary(), "Toggle { id: 7 }");
}

#[derive(Action, Clone, Debug)]
#[action(kind = "SignalTag")]
enum Signal {
    Start,
    Stop,
}

#[test]
fn test_custom_kind_name() {
    assert_eq!(Signal::Start.kind(), SignalTag::Start);
    assert_ne!(Signal::Start.kind(), Signal::Stop.kind());
}

#[derive(Action, Clone, Debug)]
enum Wrapped<T: Clone + std::fmt::Debug + 'static> {
    Value(T),
    Empty,
}

#[test]
fn test_generic_action() {
    assert_eq!(Wrapped::Value(3u8).kind(), WrappedKind::Value);
    assert_eq!(Wrapped::<u8>::Empty.name(), "Empty");
}
