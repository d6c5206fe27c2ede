// Tests for the crawl status state machine

use peerscope_core::status::{self, CrawlStatus, StatusError};
use peerscope_core::{GraphStore, Node};

use CrawlStatus::*;

const ALL: [CrawlStatus; 4] = [Unvisited, Loading, Loaded, Failed];

#[test]
fn test_legal_transitions() {
    assert!(Unvisited.can_transition_to(Loading));
    assert!(Loading.can_transition_to(Loaded));
    assert!(Loading.can_transition_to(Failed));
    assert!(Loaded.can_transition_to(Loading));
    assert!(Failed.can_transition_to(Loading));
}

#[test]
fn test_illegal_transitions() {
    let legal = [
        (Unvisited, Loading),
        (Loading, Loaded),
        (Loading, Failed),
        (Loaded, Loading),
        (Failed, Loading),
    ];
    for from in ALL {
        for to in ALL {
            if !legal.contains(&(from, to)) {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }
}

#[test]
fn test_settled_states() {
    assert!(Loaded.is_settled());
    assert!(Failed.is_settled());
    assert!(!Loading.is_settled());
    assert!(!Unvisited.is_settled());
}

#[test]
fn test_begin_creates_missing_node_as_loading() {
    let mut graph = GraphStore::new();

    let previous = status::begin(&mut graph, "new.social").unwrap();

    assert_eq!(previous, Unvisited);
    assert_eq!(graph.node("new.social").unwrap().status, Loading);
}

#[test]
fn test_begin_rejects_node_already_loading() {
    let mut graph = GraphStore::new();
    status::begin(&mut graph, "busy.social").unwrap();

    let err = status::begin(&mut graph, "busy.social").unwrap_err();
    assert_eq!(err, StatusError::AlreadyLoading("busy.social".to_string()));
}

#[test]
fn test_begin_stamps_a_fresh_generation() {
    let mut graph = GraphStore::new();
    status::begin(&mut graph, "a.social").unwrap();
    let first = graph.node("a.social").unwrap().generation;
    assert!(status::is_current(&graph, "a.social", first));

    graph.remove_node("a.social").unwrap();
    assert!(!status::is_current(&graph, "a.social", first));

    status::begin(&mut graph, "a.social").unwrap();
    let second = graph.node("a.social").unwrap().generation;
    assert_ne!(first, second);
    assert!(!status::is_current(&graph, "a.social", first));
    assert!(status::is_current(&graph, "a.social", second));

    status::complete(&mut graph, "a.social").unwrap();
    assert!(!status::is_current(&graph, "a.social", second));
}

#[test]
fn test_full_cycle_with_retry() {
    let mut graph = GraphStore::new();
    status::begin(&mut graph, "flaky.social").unwrap();
    status::fail(&mut graph, "flaky.social").unwrap();
    assert_eq!(graph.node("flaky.social").unwrap().status, Failed);

    assert_eq!(status::begin(&mut graph, "flaky.social").unwrap(), Failed);
    status::complete(&mut graph, "flaky.social").unwrap();
    assert_eq!(graph.node("flaky.social").unwrap().status, Loaded);
}

#[test]
fn test_unvisited_cannot_jump_to_loaded() {
    let mut graph = GraphStore::new();
    graph.add_node(Node::unvisited("a.social")).unwrap();

    let err = status::complete(&mut graph, "a.social").unwrap_err();
    assert_eq!(
        err,
        StatusError::IllegalTransition {
            host: "a.social".to_string(),
            from: Unvisited,
            to: Loaded,
        }
    );
    assert_eq!(graph.node("a.social").unwrap().status, Unvisited);
}

#[test]
fn test_advance_unknown_node() {
    let mut graph = GraphStore::new();
    let err = status::fail(&mut graph, "ghost.social").unwrap_err();
    assert_eq!(err, StatusError::UnknownNode("ghost.social".to_string()));
}

#[test]
fn test_status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Failed).unwrap(), "\"failed\"");
    assert_eq!(Loading.to_string(), "loading");
}
