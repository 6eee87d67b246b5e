use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::comparator::{Comparator, NaturalOrder};
use crate::config::Config;
use crate::error::Result;
use crate::raw::{Arena, Handle, Node, RawTTree};
use crate::search::SearchStrategy;

mod node_ref;

pub use node_ref::NodeRef;

/// An in-memory index based on a [T-tree].
///
/// A T-tree is a balanced binary tree whose nodes each hold a short sorted array of keys. Lookups
/// compare against a node's smallest and largest key to pick a direction, so most of the work
/// happens inside contiguous arrays instead of chasing one pointer per key. Balance is kept with
/// AVL rotations.
///
/// The tree never looks inside a key except through its [`Comparator`]. The intended use is to
/// index caller-owned records by reference: `K = &Record`, ordered by a closure over one of the
/// record's fields. Several trees can index the same records by different fields.
///
/// It is a logic error to change a record so that its ordering relative to the other stored keys
/// changes while it is in the tree. Remove it, change it, and insert it again instead.
///
/// [T-tree]: https://en.wikipedia.org/wiki/T-tree
///
/// # Examples
///
/// ```
/// use ttree::{Config, TTree};
///
/// struct Account {
///     id: u32,
///     owner: &'static str,
/// }
///
/// let accounts = [
///     Account { id: 7, owner: "carol" },
///     Account { id: 3, owner: "alice" },
///     Account { id: 5, owner: "bob" },
/// ];
///
/// let mut by_id = TTree::with_config(|a: &&Account, b: &&Account| a.id.cmp(&b.id), Config::new())?;
/// for account in &accounts {
///     by_id.insert(account)?;
/// }
///
/// let found = by_id.get_by(|a| a.id.cmp(&5)).expect("account 5 is indexed");
/// assert_eq!(found.owner, "bob");
/// assert!(core::ptr::eq(*found, &accounts[2]));
///
/// let owners: Vec<_> = by_id.iter().map(|a| a.owner).collect();
/// assert_eq!(owners, ["alice", "bob", "carol"]);
/// # Ok::<(), ttree::Error>(())
/// ```
pub struct TTree<K, C = NaturalOrder> {
    raw: RawTTree<K, C>,
}

impl<K: Ord> TTree<K> {
    /// Makes a new, empty unique `TTree` ordered by `K`'s [`Ord`], with the default [`Config`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::TTree;
    ///
    /// let mut tree = TTree::new();
    /// tree.insert(1).unwrap();
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        TTree {
            raw: RawTTree::new(NaturalOrder, Config::new()),
        }
    }
}

impl<K: Ord> Default for TTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C: Comparator<K>> TTree<K, C> {
    /// Makes a new, empty `TTree` ordered by `comparator`, with the default [`Config`].
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        TTree {
            raw: RawTTree::new(comparator, Config::new()),
        }
    }

    /// Makes a new, empty `TTree` ordered by `comparator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`](crate::Error::ZeroCapacity) if `config` allows no keys per
    /// node.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::{Config, Error, NaturalOrder, TTree};
    ///
    /// let tree = TTree::<i32>::with_config(NaturalOrder, Config::new().with_node_capacity(4))?;
    /// assert_eq!(tree.config().node_capacity(), 4);
    ///
    /// let err = TTree::<i32>::with_config(NaturalOrder, Config::new().with_node_capacity(0));
    /// assert_eq!(err.err(), Some(Error::ZeroCapacity));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_config(comparator: C, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(TTree {
            raw: RawTTree::new(comparator, config),
        })
    }

    /// Inserts a key.
    ///
    /// The key is routed from the root by each node's smallest and largest key and shifted into
    /// the first node whose range covers it. A node that overflows hands its largest key to the
    /// right subtree, and new nodes are balanced in with AVL rotations.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the tree is unique and an equal key
    ///   is already stored.
    /// - [`Error::AllocationFailure`](crate::Error::AllocationFailure) if a new node could not be
    ///   allocated.
    ///
    /// On error the tree is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::{Error, TTree};
    ///
    /// let mut tree = TTree::new();
    /// assert_eq!(tree.insert(37), Ok(()));
    /// assert_eq!(tree.insert(37), Err(Error::DuplicateKey));
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + C) for node capacity C.
    pub fn insert(&mut self, key: K) -> Result<()> {
        self.raw.insert(key)
    }

    /// Returns the stored key equal to `key`, using the configured search strategy.
    ///
    /// In a non-unique tree holding several equal keys, any one of them may be returned.
    ///
    /// `key` has type `&K`. When `K` borrows records, a record built only for the lookup must
    /// therefore outlive the tree; [`get_by`](Self::get_by) avoids that.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::TTree;
    ///
    /// let mut tree = TTree::new();
    /// tree.insert(1).unwrap();
    /// assert_eq!(tree.get(&1), Some(&1));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&K> {
        self.raw.get_with(key, self.raw.config().search())
    }

    /// Like [`get`](Self::get), but searches inside nodes with `strategy`.
    ///
    /// Every strategy finds the same keys; this exists to compare them.
    #[must_use]
    pub fn get_with(&self, key: &K, strategy: SearchStrategy) -> Option<&K> {
        self.raw.get_with(key, strategy)
    }

    /// Returns `true` if a key equal to `key` is stored.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes one stored key equal to `key` and returns it.
    ///
    /// Internal nodes that drop below the minimum fill borrow the largest key of their left
    /// subtree, half-leaves merge with their leaf child when it fits, and empty leaves are
    /// released; the tree is then rebalanced.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::TTree;
    ///
    /// let mut tree: TTree<i32> = (0..10).collect();
    /// assert_eq!(tree.remove(&4), Some(4));
    /// assert_eq!(tree.remove(&4), None);
    /// assert_eq!(tree.len(), 9);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<K> {
        self.raw.remove(key)
    }
}

impl<K, C> TTree<K, C> {
    /// Returns a stored key for which `f` returns [`Equal`](Ordering::Equal).
    ///
    /// `f` reports how a stored key orders against the one wanted, as with
    /// [`slice::binary_search_by`], and must agree with the tree's comparator. Unlike
    /// [`get`](Self::get) it needs no `K` to search with, so a tree of `&Record` can be searched
    /// by a bare field value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::{Config, TTree};
    ///
    /// struct Row {
    ///     id: u32,
    /// }
    ///
    /// let rows = [Row { id: 4 }, Row { id: 9 }];
    /// let mut by_id = TTree::with_config(|a: &&Row, b: &&Row| a.id.cmp(&b.id), Config::new())?;
    /// for row in &rows {
    ///     by_id.insert(row)?;
    /// }
    ///
    /// assert!(core::ptr::eq(*by_id.get_by(|r| r.id.cmp(&9)).unwrap(), &rows[1]));
    /// assert!(by_id.get_by(|r| r.id.cmp(&5)).is_none());
    /// # Ok::<(), ttree::Error>(())
    /// ```
    pub fn get_by<F>(&self, f: F) -> Option<&K>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.raw.get_by(f)
    }

    /// Removes one stored key for which `f` returns [`Equal`](Ordering::Equal) and returns it.
    ///
    /// `f` follows the same contract as in [`get_by`](Self::get_by).
    pub fn remove_by<F>(&mut self, f: F) -> Option<K>
    where
        F: FnMut(&K) -> Ordering,
    {
        self.raw.remove_by(f)
    }
}

impl<K, C> TTree<K, C> {
    /// Returns the number of keys in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Counts the keys by visiting every node.
    ///
    /// Always equal to [`len`](Self::len); useful when checking a tree's structure.
    ///
    /// # Complexity
    ///
    /// O(n / C) node visits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.raw.count()
    }

    /// Removes every key and releases every node.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::TTree;
    ///
    /// let mut tree: TTree<i32> = (0..100).collect();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert!(tree.root().is_none());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the configuration the tree was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        self.raw.config()
    }

    /// Returns the comparator the tree was built with.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Height of the root node: 0 when empty, 1 for a single node.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.raw.height()
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Returns a read-only view of the root node, for walking the tree's structure.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.raw.root().map(|handle| NodeRef::new(self.raw.nodes(), handle))
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttree::TTree;
    ///
    /// let tree: TTree<i32> = [3, 1, 2].into_iter().collect();
    /// let keys: Vec<_> = tree.iter().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.raw.nodes(), self.raw.root(), self.raw.len())
    }
}

impl<K: Clone, C: Clone> Clone for TTree<K, C> {
    fn clone(&self) -> Self {
        TTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for TTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Builds a unique tree with the default [`Config`]. Keys that repeat an earlier key are dropped.
///
/// # Panics
///
/// Panics if a node cannot be allocated.
impl<K: Ord> FromIterator<K> for TTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = TTree::new();
        for key in iter {
            match tree.insert(key) {
                Ok(()) | Err(crate::Error::DuplicateKey) => {}
                Err(err) => panic!("`TTree::from_iter()` - {err}"),
            }
        }
        tree
    }
}

impl<'a, K, C> IntoIterator for &'a TTree<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// An iterator over the keys of a `TTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`TTree`].
///
/// [`iter`]: TTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K> {
    nodes: &'a Arena<Node<K>>,
    // Nodes whose keys and right subtree are still to be visited, innermost on top.
    pending: SmallVec<[Handle; 32]>,
    keys: core::slice::Iter<'a, K>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(nodes: &'a Arena<Node<K>>, root: Option<Handle>, len: usize) -> Self {
        let mut iter = Iter {
            nodes,
            pending: SmallVec::new(),
            keys: Default::default(),
            remaining: len,
        };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut next: Option<Handle>) {
        while let Some(handle) = next {
            self.pending.push(handle);
            next = self.nodes.get(handle).left();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            if let Some(key) = self.keys.next() {
                self.remaining -= 1;
                return Some(key);
            }
            let handle = self.pending.pop()?;
            let node = self.nodes.get(handle);
            self.keys = node.keys().iter();
            self.descend_left(node.right());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            pending: self.pending.clone(),
            keys: self.keys.clone(),
            remaining: self.remaining,
        }
    }
}
