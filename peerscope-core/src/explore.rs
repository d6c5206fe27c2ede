use crate::discovery::Explorer;
use crate::error::Result;
use crate::host::parse_host;
use crate::status::CrawlStatus;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Options for a breadth-first exploration run
pub struct ExploreOptions {
    pub seeds: Vec<String>,
    /// Number of discovery levels; 1 only discovers the seeds.
    pub depth: usize,
    /// Discovery steps in flight at once
    pub concurrency: usize,
    /// Hard cap on discovery steps for the whole run
    pub max_expansions: usize,
    pub show_progress: bool,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            depth: 1,
            concurrency: 8,
            max_expansions: 50,
            show_progress: false,
        }
    }
}

/// Callback for reporting exploration progress
pub type ExploreProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreSummary {
    pub seeds: Vec<String>,
    pub attempted: usize,
    pub succeeded: Vec<String>,
    /// (host, reason) for every failed discovery step
    pub failed: Vec<(String, String)>,
    /// Unvisited hosts left out because the expansion budget ran out
    pub skipped: usize,
}

impl ExploreSummary {
    pub fn failure_reason(&self, host: &str) -> Option<&str> {
        self.failed
            .iter()
            .rev()
            .find(|(failed, _)| failed == host)
            .map(|(_, reason)| reason.as_str())
    }

    /// True when not a single seed could be discovered.
    pub fn all_seeds_failed(&self) -> bool {
        !self.seeds.is_empty()
            && self
                .seeds
                .iter()
                .all(|seed| !self.succeeded.iter().any(|host| host == seed))
    }
}

/// Discover the seeds, then keep expanding the unvisited peers found at each
/// level until `depth` levels are done or the expansion budget is spent.
///
/// Invalid seeds abort the run before any request is made. Failed discovery
/// steps are recorded and never abort it.
pub async fn execute_explore(
    explorer: &Explorer,
    options: ExploreOptions,
    progress_callback: Option<ExploreProgressCallback>,
) -> Result<ExploreSummary> {
    let ExploreOptions {
        seeds,
        depth,
        concurrency,
        max_expansions,
        show_progress,
    } = options;

    let mut frontier = Vec::new();
    let mut queued = HashSet::new();
    for seed in &seeds {
        let host = parse_host(seed)?;
        if queued.insert(host.clone()) {
            frontier.push(host);
        }
    }

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Starting exploration...");
        Some(pb)
    } else {
        None
    };

    let processed = AtomicUsize::new(0);
    let mut summary = ExploreSummary {
        seeds: frontier.clone(),
        ..ExploreSummary::default()
    };
    let mut budget = max_expansions;

    for level in 0..depth.max(1) {
        if frontier.is_empty() {
            break;
        }
        if budget == 0 {
            summary.skipped += frontier.len();
            break;
        }
        if frontier.len() > budget {
            summary.skipped += frontier.len() - budget;
            frontier.truncate(budget);
        }
        budget -= frontier.len();

        if let Some(ref callback) = progress_callback {
            callback(format!(
                "Level {}: discovering {} instance(s)",
                level,
                frontier.len()
            ));
        }
        info!("Exploration level {}: {} hosts", level, frontier.len());

        let outcomes: Vec<_> = stream::iter(frontier.drain(..))
            .map(|host| {
                let processed = &processed;
                let progress_bar = progress_bar.as_ref();
                async move {
                    let outcome = explorer.discover(&host).await;
                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(pb) = progress_bar {
                        pb.set_message(format!("Exploring... {} instances queried ({})", count, host));
                        pb.tick();
                    }
                    (host, outcome)
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut next_level = Vec::new();
        for (host, outcome) in outcomes {
            summary.attempted += 1;
            match outcome {
                Ok(_) => {
                    summary.succeeded.push(host.clone());
                    next_level.push(host);
                }
                Err(e) => {
                    if let Some(ref callback) = progress_callback {
                        callback(format!("[!] Failed to discover {}: {}", host, e));
                    }
                    summary.failed.push((host, e.to_string()));
                }
            }
        }

        if level + 1 >= depth {
            break;
        }

        // Expand in a stable order regardless of completion order
        next_level.sort();
        let graph = explorer.read_graph().await;
        for host in &next_level {
            let mut peers: Vec<&str> = graph
                .peers_of(host)
                .into_iter()
                .filter(|peer| {
                    graph
                        .node(peer)
                        .is_some_and(|node| node.status == CrawlStatus::Unvisited)
                })
                .collect();
            peers.sort_unstable();
            for peer in peers {
                if queued.insert(peer.to_string()) {
                    frontier.push(peer.to_string());
                }
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Exploration complete! {} instances queried",
            processed.load(Ordering::Relaxed)
        ));
    }

    Ok(summary)
}
