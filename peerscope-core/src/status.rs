// Crawl status state machine
//
//   Unvisited ──> Loading ──> Loaded
//                  ^   │        │
//                  │   └──> Failed
//                  └────────────┘  (explicit retry / refresh only)

use crate::graph::GraphStore;
use crate::model::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    #[default]
    Unvisited,
    Loading,
    Loaded,
    Failed,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlStatus::Unvisited => "unvisited",
            CrawlStatus::Loading => "loading",
            CrawlStatus::Loaded => "loaded",
            CrawlStatus::Failed => "failed",
        }
    }

    pub fn can_transition_to(self, next: CrawlStatus) -> bool {
        use CrawlStatus::*;
        matches!(
            (self, next),
            (Unvisited, Loading)
                | (Loading, Loaded)
                | (Loading, Failed)
                | (Loaded, Loading)
                | (Failed, Loading)
        )
    }

    /// No automatic transition leaves this state.
    pub fn is_settled(self) -> bool {
        matches!(self, CrawlStatus::Loaded | CrawlStatus::Failed)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("{0} is not part of the graph")]
    UnknownNode(String),

    #[error("{0} is already loading")]
    AlreadyLoading(String),

    #[error("{host}: illegal status transition {from} -> {to}")]
    IllegalTransition {
        host: String,
        from: CrawlStatus,
        to: CrawlStatus,
    },
}

/// Mark `id` as loading, creating it at the origin if it is new, and stamp
/// it with a fresh crawl generation.
///
/// Returns the status the node had before. A node that is already loading
/// is rejected, which is what keeps two discoveries of the same host from
/// racing each other.
pub fn begin(graph: &mut GraphStore, id: &str) -> Result<CrawlStatus, StatusError> {
    if !graph.has_node(id) {
        // Infallible, the id was just checked
        let _ = graph.add_node(Node::unvisited(id));
    }
    let previous = advance(graph, id, CrawlStatus::Loading)?;
    let generation = graph.next_generation();
    if let Some(node) = graph.node_mut(id) {
        node.generation = generation;
    }
    Ok(previous)
}

/// `id` is loading under the crawl stamped `generation`, and no later
/// crawl or removal has superseded it.
pub fn is_current(graph: &GraphStore, id: &str, generation: u64) -> bool {
    graph
        .node(id)
        .is_some_and(|node| node.status == CrawlStatus::Loading && node.generation == generation)
}

pub fn complete(graph: &mut GraphStore, id: &str) -> Result<CrawlStatus, StatusError> {
    advance(graph, id, CrawlStatus::Loaded)
}

pub fn fail(graph: &mut GraphStore, id: &str) -> Result<CrawlStatus, StatusError> {
    advance(graph, id, CrawlStatus::Failed)
}

/// Move `id` to `next`, refusing anything the state machine does not allow.
pub fn advance(
    graph: &mut GraphStore,
    id: &str,
    next: CrawlStatus,
) -> Result<CrawlStatus, StatusError> {
    let node = graph
        .node_mut(id)
        .ok_or_else(|| StatusError::UnknownNode(id.to_string()))?;
    let previous = node.status;

    if previous == CrawlStatus::Loading && next == CrawlStatus::Loading {
        return Err(StatusError::AlreadyLoading(id.to_string()));
    }
    if !previous.can_transition_to(next) {
        return Err(StatusError::IllegalTransition {
            host: id.to_string(),
            from: previous,
            to: next,
        });
    }

    debug!("{}: {} -> {}", id, previous, next);
    node.status = next;
    Ok(previous)
}
