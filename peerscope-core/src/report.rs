// Graph snapshots and exploration reports

use crate::color::ColorTag;
use crate::error::Result;
use crate::explore::ExploreSummary;
use crate::graph::{GraphStore, StatusCounts};
use crate::model::Edge;
use crate::status::CrawlStatus;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// What a renderer needs to know about one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorTag>,
    pub status: CrawlStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub peer_count: usize,
}

/// Point-in-time copy of the graph, sorted by id for stable output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn from_graph(graph: &GraphStore) -> Self {
        let mut nodes: Vec<SnapshotNode> = graph
            .nodes()
            .map(|node| SnapshotNode {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.position.x,
                y: node.position.y,
                color: node.color,
                status: node.status,
                title: node.title().map(str::to_string),
                thumbnail: node
                    .metadata
                    .as_ref()
                    .and_then(|profile| profile.thumbnail.clone()),
                peer_count: graph.peers_of(&node.id).len(),
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<Edge> = graph.edges().collect();
        edges.sort();

        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&SnapshotNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for node in &self.nodes {
            match node.status {
                CrawlStatus::Unvisited => counts.unvisited += 1,
                CrawlStatus::Loading => counts.loading += 1,
                CrawlStatus::Loaded => counts.loaded += 1,
                CrawlStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    fn with_status(&self, status: CrawlStatus) -> impl Iterator<Item = &SnapshotNode> {
        self.nodes.iter().filter(move |node| node.status == status)
    }
}

pub fn render_report(
    snapshot: &GraphSnapshot,
    summary: Option<&ExploreSummary>,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(snapshot, summary)),
        ReportFormat::Json => Ok(generate_json_report(snapshot, summary)?),
        ReportFormat::Markdown => Ok(generate_markdown_report(snapshot, summary)),
    }
}

pub fn save_report(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn generate_text_report(snapshot: &GraphSnapshot, summary: Option<&ExploreSummary>) -> String {
    let counts = snapshot.status_counts();
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push_str("                        PEERSCOPE FEDERATION REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    if let Some(summary) = summary {
        report.push_str(&format!("Seeds:        {}\n", summary.seeds.join(", ")));
        report.push_str(&format!(
            "Discoveries:  {} attempted, {} succeeded, {} failed\n",
            summary.attempted,
            summary.succeeded.len(),
            summary.failed.len()
        ));
    }
    report.push_str(&format!("Instances:    {}\n", snapshot.nodes.len()));
    report.push_str(&format!("Links:        {}\n", snapshot.edges.len()));
    report.push_str(&format!(
        "Status:       {} loaded, {} failed, {} unvisited\n\n",
        counts.loaded, counts.failed, counts.unvisited
    ));

    if counts.loaded > 0 {
        report.push_str(HEAVY_RULE);
        report.push_str("CRAWLED INSTANCES\n");
        report.push_str(HEAVY_RULE);
        report.push('\n');

        for node in snapshot.with_status(CrawlStatus::Loaded) {
            match node.title {
                Some(ref title) => report.push_str(&format!("{}  ({})\n", node.id, title)),
                None => report.push_str(&format!("{}\n", node.id)),
            }
            report.push_str(&format!("  Peers:      {}\n", node.peer_count));
            if let Some(color) = node.color {
                report.push_str(&format!("  Color:      {}\n", color));
            }
            report.push_str(LIGHT_RULE);
        }
        report.push('\n');
    }

    if counts.failed > 0 {
        report.push_str(HEAVY_RULE);
        report.push_str("FAILED INSTANCES\n");
        report.push_str(HEAVY_RULE);
        report.push('\n');

        for node in snapshot.with_status(CrawlStatus::Failed) {
            let reason = summary.and_then(|s| s.failure_reason(&node.id));
            match reason {
                Some(reason) => report.push_str(&format!("  [FAILED] {}: {}\n", node.id, reason)),
                None => report.push_str(&format!("  [FAILED] {}\n", node.id)),
            }
        }
        report.push('\n');
    }

    report.push_str(HEAVY_RULE);
    report.push_str("\nGenerated by Peerscope - incremental federation explorer\n\n");

    report
}

pub fn generate_json_report(
    snapshot: &GraphSnapshot,
    summary: Option<&ExploreSummary>,
) -> std::result::Result<String, serde_json::Error> {
    let counts = snapshot.status_counts();
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Peerscope",
                "version": env!("CARGO_PKG_VERSION"),
                "format": "json"
            },
            "summary": {
                "instances": snapshot.nodes.len(),
                "links": snapshot.edges.len(),
                "loaded": counts.loaded,
                "failed": counts.failed,
                "unvisited": counts.unvisited
            },
            "exploration": summary,
            "graph": snapshot
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(
    snapshot: &GraphSnapshot,
    summary: Option<&ExploreSummary>,
) -> String {
    let counts = snapshot.status_counts();
    let mut md = String::new();

    md.push_str("# Peerscope Federation Report\n\n");
    if let Some(summary) = summary {
        md.push_str(&format!("**Seeds:** {}\n\n", summary.seeds.join(", ")));
    }
    md.push_str("| Metric | Count |\n|---|---|\n");
    md.push_str(&format!("| Instances | {} |\n", snapshot.nodes.len()));
    md.push_str(&format!("| Links | {} |\n", snapshot.edges.len()));
    md.push_str(&format!("| Loaded | {} |\n", counts.loaded));
    md.push_str(&format!("| Failed | {} |\n", counts.failed));
    md.push_str(&format!("| Unvisited | {} |\n\n", counts.unvisited));

    if counts.loaded > 0 {
        md.push_str("## Crawled instances\n\n");
        md.push_str("| Host | Title | Peers |\n|---|---|---|\n");
        for node in snapshot.with_status(CrawlStatus::Loaded) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                node.id,
                escape_markdown_cell(node.title.as_deref().unwrap_or("")),
                node.peer_count
            ));
        }
        md.push('\n');
    }

    if counts.failed > 0 {
        md.push_str("## Failed instances\n\n");
        for node in snapshot.with_status(CrawlStatus::Failed) {
            md.push_str(&format!("- `{}`\n", node.id));
        }
        md.push('\n');
    }

    md
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
