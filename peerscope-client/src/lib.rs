pub mod client;
pub mod error;
pub mod instance;

pub use client::{InstanceClient, PEERS_PATH, PROFILE_PATH};
pub use error::QueryError;
pub use instance::{InstanceProfile, InstanceSnapshot, InstanceStats};
