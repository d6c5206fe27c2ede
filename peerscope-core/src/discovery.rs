//! Discovery orchestrator.
//!
//! One discovery step queries a host, filters its peers and merges the
//! result into the shared graph. Steps for different hosts may run
//! concurrently; a second step for a host that is still loading is
//! rejected before any network traffic happens.

use crate::color::ColorTag;
use crate::error::{DiscoveryError, Result};
use crate::filter::{DEFAULT_EXCLUSIONS, PeerFilter};
use crate::graph::GraphStore;
use crate::host::{normalize, parse_host};
use crate::model::{Node, Position};
use crate::report::GraphSnapshot;
use crate::status::{self, CrawlStatus};
use peerscope_client::{InstanceClient, InstanceProfile, InstanceSnapshot};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

pub const DEFAULT_JITTER_STDDEV: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Regular expressions; matching peers are never linked.
    pub exclusions: Vec<String>,
    /// Standard deviation of the Gaussian offset given to new peers.
    pub jitter_stddev: f64,
    /// Fixed seed for colors and jitter. Random when unset.
    pub seed: Option<u64>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|p| p.to_string()).collect(),
            jitter_stddev: DEFAULT_JITTER_STDDEV,
            seed: None,
        }
    }
}

impl ExplorerConfig {
    pub fn without_exclusions(mut self) -> Self {
        self.exclusions.clear();
        self
    }

    pub fn with_exclusion(mut self, pattern: impl Into<String>) -> Self {
        self.exclusions.push(pattern.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// What a successful discovery step changed.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryReport {
    pub host: String,
    pub peers_reported: usize,
    pub peers_excluded: usize,
    pub nodes_added: usize,
    pub edges_added: usize,
    pub target_color: ColorTag,
    pub child_color: ColorTag,
}

/// Drives discovery steps against one session graph.
///
/// Cheap to clone; clones share the graph, the filter and the RNG.
#[derive(Clone)]
pub struct Explorer {
    client: InstanceClient,
    graph: Arc<RwLock<GraphStore>>,
    filter: Arc<PeerFilter>,
    rng: Arc<StdMutex<StdRng>>,
    jitter: Normal<f64>,
}

impl Explorer {
    pub fn new(client: InstanceClient, config: ExplorerConfig) -> Result<Self> {
        let filter = PeerFilter::new(&config.exclusions)?;
        let jitter = Normal::new(0.0, config.jitter_stddev)
            .map_err(|_| DiscoveryError::InvalidJitter(config.jitter_stddev))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            client,
            graph: Arc::new(RwLock::new(GraphStore::new())),
            filter: Arc::new(filter),
            rng: Arc::new(StdMutex::new(rng)),
            jitter,
        })
    }

    pub fn client(&self) -> &InstanceClient {
        &self.client
    }

    pub fn filter(&self) -> &PeerFilter {
        &self.filter
    }

    /// Shared handle on the session graph, for renderers.
    pub fn graph(&self) -> Arc<RwLock<GraphStore>> {
        self.graph.clone()
    }

    pub async fn read_graph(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.graph.read().await
    }

    pub async fn status(&self, id: &str) -> Option<CrawlStatus> {
        let id = normalize(id);
        self.graph.read().await.node(&id).map(|node| node.status)
    }

    pub async fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from_graph(&*self.graph.read().await)
    }

    /// Run one discovery step for `address`.
    ///
    /// On failure the target ends up `Failed` and nothing but its status
    /// changes. Repeating a successful discovery only refreshes the
    /// target's color, label and metadata.
    ///
    /// The query and the merge run on their own task, so the node settles
    /// even when the caller stops waiting for this future.
    pub async fn discover(&self, address: &str) -> Result<DiscoveryReport> {
        let host = parse_host(address)?;

        let generation = {
            let mut graph = self.graph.write().await;
            status::begin(&mut graph, &host)?;
            graph.node(&host).map_or(0, |node| node.generation)
        };

        info!("Discovering {}", host);
        let step = self.clone();
        let step_host = host.clone();
        let handle = tokio::spawn(async move { step.run_step(step_host, generation).await });

        match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                error!("Discovery task for {} died: {}", host, join_error);
                let mut graph = self.graph.write().await;
                if status::is_current(&graph, &host, generation) {
                    status::fail(&mut graph, &host)?;
                }
                Err(DiscoveryError::Interrupted {
                    host,
                    reason: join_error.to_string(),
                })
            }
        }
    }

    async fn run_step(&self, host: String, generation: u64) -> Result<DiscoveryReport> {
        match self.client.query(&host).await {
            Ok(snapshot) => self.merge(&host, generation, snapshot).await,
            Err(source) => {
                warn!("Discovery of {} failed: {}", host, source);
                let mut graph = self.graph.write().await;
                if !status::is_current(&graph, &host, generation) {
                    debug!("{} changed while loading, dropping failure", host);
                    return Err(DiscoveryError::Discarded(host));
                }
                status::fail(&mut graph, &host)?;
                Err(DiscoveryError::QueryFailed { host, source })
            }
        }
    }

    /// Discover a node that is already part of the graph.
    pub async fn expand(&self, id: &str) -> Result<DiscoveryReport> {
        let id = normalize(id);
        if !self.graph.read().await.has_node(&id) {
            return Err(DiscoveryError::NotFound(id));
        }
        self.discover(&id).await
    }

    /// Discover a node again after it failed.
    pub async fn retry(&self, id: &str) -> Result<DiscoveryReport> {
        let id = normalize(id);
        match self.status(&id).await {
            None => Err(DiscoveryError::NotFound(id)),
            Some(CrawlStatus::Failed) => self.discover(&id).await,
            Some(_) => Err(DiscoveryError::NotFailed(id)),
        }
    }

    /// Drop a node and its edges. A discovery still in flight for it will
    /// have its result discarded, even if the node is added back and
    /// crawled again before that discovery returns.
    pub async fn remove_node(&self, id: &str) -> Option<Node> {
        let id = normalize(id);
        let removed = self.graph.write().await.remove_node(&id);
        if removed.is_some() {
            info!("Removed {}", id);
        }
        removed
    }

    /// Fetch a host's profile for display without touching the graph.
    pub async fn inspect(&self, address: &str) -> Result<InstanceProfile> {
        let host = parse_host(address)?;
        self.client
            .fetch_profile(&host)
            .await
            .map_err(|source| DiscoveryError::QueryFailed { host, source })
    }

    async fn merge(
        &self,
        host: &str,
        generation: u64,
        snapshot: InstanceSnapshot,
    ) -> Result<DiscoveryReport> {
        let InstanceSnapshot { profile, peers } = snapshot;
        let peers_reported = peers.len();
        let filtered = self.filter.apply(peers);
        let (target_color, child_color) = ColorTag::batch(self.next_seed());

        let label = if profile.uri.is_empty() {
            host.to_string()
        } else {
            profile.uri.clone()
        };

        let mut graph = self.graph.write().await;
        if !status::is_current(&graph, host, generation) {
            debug!("{} changed while loading, dropping result", host);
            return Err(DiscoveryError::Discarded(host.to_string()));
        }
        let anchor = graph.node(host).map_or(Position::ORIGIN, |node| node.position);

        let target = Node {
            id: host.to_string(),
            label,
            position: Position::ORIGIN,
            color: Some(target_color),
            metadata: Some(profile),
            status: CrawlStatus::Loading,
            generation,
        };
        let refreshed = target.clone();
        graph.upsert_node(target, move |existing| {
            existing.label = refreshed.label;
            existing.color = refreshed.color;
            existing.metadata = refreshed.metadata;
        });

        let mut nodes_added = 0;
        let mut edges_added = 0;
        for raw in &filtered.kept {
            let peer = normalize(raw);
            if peer.is_empty() || peer == host {
                continue;
            }
            if !graph.has_node(&peer) {
                let position = self.jittered(anchor);
                if graph.add_node(Node::peer(&peer, position, child_color)).is_ok() {
                    nodes_added += 1;
                }
            }
            if graph.add_edge(host, &peer) {
                edges_added += 1;
            }
        }

        status::complete(&mut graph, host)?;

        info!(
            "Discovered {}: {} peers ({} excluded), {} new nodes, {} new edges",
            host,
            peers_reported,
            filtered.excluded.len(),
            nodes_added,
            edges_added
        );

        Ok(DiscoveryReport {
            host: host.to_string(),
            peers_reported,
            peers_excluded: filtered.excluded.len(),
            nodes_added,
            edges_added,
            target_color,
            child_color,
        })
    }

    fn next_seed(&self) -> u64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u64()
    }

    fn jittered(&self, anchor: Position) -> Position {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let dx = self.jitter.sample(&mut *rng);
        let dy = self.jitter.sample(&mut *rng);
        anchor.offset(dx, dy)
    }
}
