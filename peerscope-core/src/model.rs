use crate::color::ColorTag;
use crate::status::CrawlStatus;
use peerscope_client::InstanceProfile;
use serde::{Deserialize, Serialize};

/// Seed coordinate handed to the layout engine. Layout may move the node
/// around, but never writes back here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn distance(self, other: Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One host in the federation graph, crawled or merely referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub position: Position,
    pub color: Option<ColorTag>,
    /// Present once the host has been crawled successfully.
    pub metadata: Option<InstanceProfile>,
    pub status: CrawlStatus,
    /// Stamp of the crawl that last marked this node `Loading`.
    #[serde(default)]
    pub generation: u64,
}

impl Node {
    /// A referenced-but-unvisited host at the origin.
    pub fn unvisited(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            position: Position::ORIGIN,
            color: None,
            metadata: None,
            status: CrawlStatus::Unvisited,
            generation: 0,
        }
    }

    /// A host introduced by another host's crawl.
    pub fn peer(id: impl Into<String>, position: Position, color: ColorTag) -> Self {
        Self {
            position,
            color: Some(color),
            ..Self::unvisited(id)
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|profile| profile.title.as_str())
            .filter(|title| !title.is_empty())
    }
}

/// Directed "source reported target as a peer" relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
