// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_explorer_config, load_hosts_from_file, load_hosts_from_source, log_level,
    parse_host_line,
};

// Re-export the explore driver from peerscope-core
pub use peerscope_core::explore::{
    ExploreOptions, ExploreProgressCallback, ExploreSummary, execute_explore,
};
