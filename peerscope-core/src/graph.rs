//! Mutable node/edge store for one exploration session.
//!
//! Nodes live in a `StableDiGraph` so that removing one never shifts the
//! indices of the others; `index` maps host keys onto those indices.
//! The store is plain synchronous data. Sharing between concurrent
//! discoveries is the caller's business (see `discovery::Explorer`).

use crate::model::{Edge, Node};
use crate::status::CrawlStatus;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} already exists")]
    DuplicateNode(String),
}

/// What `upsert_node` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Merged,
}

/// Per-status node counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub unvisited: usize,
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    topology: StableDiGraph<Node, ()>,
    index: HashMap<String, NodeIndex>,
    generation: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a crawl stamp no node in this store has carried before.
    /// Survives node removal, so a re-added node never reuses a stamp.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index
            .get(id)
            .and_then(|&idx| self.topology.node_weight(idx))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.index.get(id)?;
        self.topology.node_weight_mut(idx)
    }

    /// Insert a brand new node. Refuses ids that are already present.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.has_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.insert(node);
        Ok(())
    }

    /// Merge into an existing node, or insert `node` if its id is new.
    ///
    /// `merge` sees the existing node and decides what to overwrite; the
    /// existing position survives unless `merge` replaces it.
    pub fn upsert_node<F>(&mut self, node: Node, merge: F) -> Upsert
    where
        F: FnOnce(&mut Node),
    {
        match self.node_mut(&node.id) {
            Some(existing) => {
                merge(existing);
                Upsert::Merged
            }
            None => {
                self.insert(node);
                Upsert::Created
            }
        }
    }

    /// Add `source -> target`, creating either endpoint as an unvisited node
    /// if it is missing. Returns false when the edge already existed.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let from = self.ensure_node(source);
        let to = self.ensure_node(target);

        if self.topology.contains_edge(from, to) {
            return false;
        }
        self.topology.add_edge(from, to, ());
        true
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&from), Some(&to)) => self.topology.contains_edge(from, to),
            _ => false,
        }
    }

    /// Remove the node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.index.remove(id)?;
        self.topology.remove_node(idx)
    }

    /// Hosts `id` reported as peers, in no particular order.
    pub fn peers_of(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Hosts that reported `id` as one of their peers.
    pub fn reported_by(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.topology.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.topology.edge_references().map(|edge| {
            Edge::new(
                self.topology[edge.source()].id.clone(),
                self.topology[edge.target()].id.clone(),
            )
        })
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn nodes_with_status(&self, status: CrawlStatus) -> Vec<&Node> {
        self.nodes().filter(|node| node.status == status).collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for node in self.nodes() {
            match node.status {
                CrawlStatus::Unvisited => counts.unvisited += 1,
                CrawlStatus::Loading => counts.loading += 1,
                CrawlStatus::Loaded => counts.loaded += 1,
                CrawlStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        self.topology
            .neighbors_directed(idx, direction)
            .map(|n| self.topology[n].id.as_str())
            .collect()
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        match self.index.get(id) {
            Some(&idx) => idx,
            None => self.insert(Node::unvisited(id)),
        }
    }

    fn insert(&mut self, node: Node) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.topology.add_node(node);
        self.index.insert(id, idx);
        idx
    }
}
