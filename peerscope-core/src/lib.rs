//! Discovery and incremental graph building for federated instance networks.
//!
//! Start from [`Explorer::discover`] with a host address; every successful
//! step merges the host's profile and filtered peer list into the session
//! graph held by the explorer.

pub mod color;
pub mod discovery;
pub mod error;
pub mod explore;
pub mod filter;
pub mod graph;
pub mod host;
pub mod model;
pub mod report;
pub mod status;

pub use color::ColorTag;
pub use discovery::{DiscoveryReport, Explorer, ExplorerConfig};
pub use error::{DiscoveryError, Result};
pub use explore::{ExploreOptions, ExploreProgressCallback, ExploreSummary, execute_explore};
pub use filter::{DEFAULT_EXCLUSIONS, FilteredPeers, PeerFilter};
pub use graph::{GraphError, GraphStore, StatusCounts, Upsert};
pub use host::{normalize, parse_host};
pub use model::{Edge, Node, Position};
pub use report::{GraphSnapshot, ReportFormat, SnapshotNode, render_report, save_report};
pub use status::{CrawlStatus, StatusError};

pub use peerscope_client::{InstanceClient, InstanceProfile, QueryError};
