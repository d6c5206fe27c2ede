use crate::error::Result;
use regex::RegexSet;
use tracing::debug;

/// Exclusions applied unless the caller opts out.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[r".*\.activitypub-troll\.cf"];

/// Drops peers matching any configured exclusion pattern.
#[derive(Debug, Clone)]
pub struct PeerFilter {
    patterns: RegexSet,
}

/// Result of filtering one peer list. Both halves keep the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredPeers {
    pub kept: Vec<String>,
    pub excluded: Vec<String>,
}

impl PeerFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_EXCLUSIONS)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        self.patterns.patterns()
    }

    /// Unanchored: a pattern matching anywhere in the raw peer excludes it.
    pub fn is_excluded(&self, peer: &str) -> bool {
        self.patterns.is_match(peer)
    }

    pub fn apply<I>(&self, peers: I) -> FilteredPeers
    where
        I: IntoIterator<Item = String>,
    {
        let mut filtered = FilteredPeers::default();
        for peer in peers {
            if self.is_excluded(&peer) {
                debug!("Excluding peer {}", peer);
                filtered.excluded.push(peer);
            } else {
                filtered.kept.push(peer);
            }
        }
        filtered
    }
}

impl Default for PeerFilter {
    fn default() -> Self {
        Self::empty()
    }
}
