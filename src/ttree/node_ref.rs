use core::fmt;

use crate::raw::{Arena, Handle, Node};

/// A read-only view of one node of a [`TTree`](crate::TTree).
///
/// Obtained from [`TTree::root`](crate::TTree::root) and by following [`left`](Self::left),
/// [`right`](Self::right) and [`parent`](Self::parent). Lets callers check the tree's shape
/// without exposing its internals.
///
/// # Examples
///
/// ```
/// use ttree::{Config, NaturalOrder, TTree};
///
/// let mut tree = TTree::with_config(NaturalOrder, Config::new().with_node_capacity(3))?;
/// for key in 1..=9 {
///     tree.insert(key)?;
/// }
///
/// let root = tree.root().expect("tree is not empty");
/// assert_eq!(root.keys(), &[4, 5, 6]);
/// assert_eq!(root.left().map(|n| n.keys().to_vec()), Some(vec![1, 2, 3]));
/// assert_eq!(root.right().map(|n| n.keys().to_vec()), Some(vec![7, 8, 9]));
/// assert_eq!(root.height(), 2);
/// # Ok::<(), ttree::Error>(())
/// ```
pub struct NodeRef<'a, K> {
    nodes: &'a Arena<Node<K>>,
    handle: Handle,
}

impl<'a, K> NodeRef<'a, K> {
    pub(crate) fn new(nodes: &'a Arena<Node<K>>, handle: Handle) -> Self {
        NodeRef { nodes, handle }
    }

    fn node(&self) -> &'a Node<K> {
        self.nodes.get(self.handle)
    }

    fn follow(&self, link: Option<Handle>) -> Option<NodeRef<'a, K>> {
        link.map(|handle| NodeRef::new(self.nodes, handle))
    }

    /// The node's keys, sorted by the tree's comparator. Never empty.
    #[must_use]
    pub fn keys(&self) -> &'a [K] {
        self.node().keys()
    }

    /// Smallest key in this node.
    #[must_use]
    pub fn first_key(&self) -> &'a K {
        self.node().bounds().0
    }

    /// Largest key in this node.
    #[must_use]
    pub fn last_key(&self) -> &'a K {
        self.node().bounds().1
    }

    /// Height of the subtree rooted here; a leaf is 1.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.node().height()
    }

    #[must_use]
    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        self.follow(self.node().left())
    }

    #[must_use]
    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        self.follow(self.node().right())
    }

    /// `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a, K>> {
        self.follow(self.node().parent())
    }

    /// Returns `true` if both views point at the same node.
    #[must_use]
    pub fn same_node(&self, other: &NodeRef<'_, K>) -> bool {
        core::ptr::eq(self.nodes, other.nodes) && self.handle == other.handle
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("handle", &self.handle)
            .field("height", &self.height())
            .field("keys", &self.keys())
            .finish()
    }
}
