use crate::error::{Error, Result};
use crate::search::SearchStrategy;

/// Construction options for a [`TTree`](crate::TTree).
///
/// # Examples
///
/// ```
/// use ttree::{Config, SearchStrategy};
///
/// let config = Config::new().with_unique(false).with_node_capacity(8).with_search(SearchStrategy::Binary);
/// assert!(!config.unique());
/// assert_eq!(config.node_capacity(), 8);
/// assert_eq!(config.search(), SearchStrategy::Binary);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Config {
    unique: bool,
    node_capacity: usize,
    search: SearchStrategy,
}

impl Config {
    /// Node capacity used by [`Config::new`].
    pub const DEFAULT_NODE_CAPACITY: usize = 32;

    /// Unique keys, [`DEFAULT_NODE_CAPACITY`](Self::DEFAULT_NODE_CAPACITY) keys per node, backward
    /// scan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unique: true,
            node_capacity: Self::DEFAULT_NODE_CAPACITY,
            search: SearchStrategy::Backward,
        }
    }

    /// Whether inserting a key equal to a stored one is rejected.
    #[must_use]
    pub const fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Maximum number of keys held by one node.
    #[must_use]
    pub const fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    /// Strategy used inside a node by insertion and lookup.
    #[must_use]
    pub const fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    #[must_use]
    pub const fn unique(&self) -> bool {
        self.unique
    }

    #[must_use]
    pub const fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    #[must_use]
    pub const fn search(&self) -> SearchStrategy {
        self.search
    }

    /// Smallest occupancy an internal node or half-leaf keeps after a removal.
    pub(crate) const fn min_fill(&self) -> usize {
        let fill = self.node_capacity.saturating_sub(2);
        if fill == 0 { 1 } else { fill }
    }

    pub(crate) const fn validate(&self) -> Result<()> {
        if self.node_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
