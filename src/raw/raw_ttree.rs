use core::cmp::Ordering::{self, Greater, Less};

use tracing::trace;

use super::arena::{Arena, Handle};
use super::node::{Node, Side};
use crate::Comparator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::search::SearchStrategy;

/// The core T-tree implementation backing `TTree`.
#[derive(Clone)]
pub(crate) struct RawTTree<K, C> {
    /// Arena storing all tree nodes. Links between nodes are handles into it.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of keys in the tree.
    len: usize,
    config: Config,
    comparator: C,
}

/// Destination of the key displaced from a full node.
enum Overflow<K> {
    /// Front of the left-most node of the right subtree, which has room.
    Prepend(Handle),
    /// A fresh node, already allocated, to hang below `parent` on `side`.
    Spawn { parent: Handle, side: Side, node: Node<K> },
}

impl<K, C> RawTTree<K, C> {
    /// Creates a new, empty tree. `config` must already be validated.
    pub(crate) const fn new(comparator: C, config: Config) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            config,
            comparator,
        }
    }

    /// Returns the number of keys in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.comparator
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn nodes(&self) -> &Arena<Node<K>> {
        &self.nodes
    }

    /// Number of nodes currently linked into the tree.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Height of the root node, 0 for an empty tree.
    pub(crate) fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Releases every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Sums node occupancies by walking the whole tree.
    pub(crate) fn count(&self) -> usize {
        self.root.map_or(0, |root| self.count_from(root))
    }

    fn count_from(&self, handle: Handle) -> usize {
        let node = self.nodes.get(handle);
        node.key_count()
            + node.left().map_or(0, |left| self.count_from(left))
            + node.right().map_or(0, |right| self.count_from(right))
    }

    /// Smallest key in the tree.
    pub(crate) fn first(&self) -> Option<&K> {
        let root = self.root?;
        self.nodes.get(self.extreme(root, Side::Left)).first_key()
    }

    /// Largest key in the tree.
    pub(crate) fn last(&self) -> Option<&K> {
        let root = self.root?;
        self.nodes.get(self.extreme(root, Side::Right)).last_key()
    }

    /// Follows `side` links from `handle` as far as they go.
    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.nodes.get(handle).child(side) {
            handle = child;
        }
        handle
    }

    fn height_of(&self, handle: Option<Handle>) -> u32 {
        handle.map_or(0, |h| self.nodes.get(h).height())
    }

    fn reheight(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = self.height_of(node.left()).max(self.height_of(node.right())) + 1;
        self.nodes.get_mut(handle).set_height(height);
    }

    /// Returns the side whose subtree is strictly taller, if the two differ.
    fn taller_side(&self, handle: Handle) -> Option<Side> {
        let node = self.nodes.get(handle);
        let (left, right) = (self.height_of(node.left()), self.height_of(node.right()));
        if left > right {
            Some(Side::Left)
        } else if right > left {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Returns the side that is taller by more than one level, if the node is out of balance.
    fn overweight_side(&self, handle: Handle) -> Option<Side> {
        let node = self.nodes.get(handle);
        let (left, right) = (self.height_of(node.left()), self.height_of(node.right()));
        if left > right + 1 {
            Some(Side::Left)
        } else if right > left + 1 {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Lifts `pivot` above its parent and returns it.
    ///
    /// A right child rotates left, a left child rotates right. The pivot's inner subtree moves to
    /// the old parent, and the grandparent (if any) now points at the pivot.
    fn rotate_up(&mut self, pivot: Handle) -> Handle {
        let parent = self.nodes.get(pivot).parent().expect("`RawTTree::rotate_up()` - pivot has no parent!");
        let side = self.nodes.get(parent).side_of(pivot);
        let inner = self.nodes.get(pivot).child(side.opposite());
        let grandparent = self.nodes.get(parent).parent();

        match grandparent {
            Some(grandparent) => {
                let parent_side = self.nodes.get(grandparent).side_of(parent);
                self.nodes.get_mut(grandparent).set_child(parent_side, Some(pivot));
            }
            None => self.root = Some(pivot),
        }

        let lifted = self.nodes.get_mut(pivot);
        lifted.set_parent(grandparent);
        lifted.set_child(side.opposite(), Some(parent));

        let lowered = self.nodes.get_mut(parent);
        lowered.set_parent(Some(pivot));
        lowered.set_child(side, inner);

        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(parent));
        }

        // The old parent is now below the pivot.
        self.reheight(parent);
        self.reheight(pivot);
        pivot
    }

    /// Walks from `start` to the root, fixing heights and rotating wherever the AVL balance is
    /// broken. The node the walk ends on becomes the root.
    fn rebalance(&mut self, start: Handle) {
        let mut current = start;
        loop {
            self.reheight(current);

            if let Some(side) = self.overweight_side(current) {
                let child =
                    self.nodes.get(current).child(side).expect("`RawTTree::rebalance()` - heavy side has no child!");
                current = if self.taller_side(child) == Some(side.opposite()) {
                    // Child leans inwards (LR / RL): straighten it first.
                    let grandchild = self
                        .nodes
                        .get(child)
                        .child(side.opposite())
                        .expect("`RawTTree::rebalance()` - inner grandchild is missing!");
                    trace!(node = ?current, ?side, pivot = ?grandchild, "double rotation");
                    self.rotate_up(grandchild);
                    self.rotate_up(grandchild)
                } else {
                    trace!(node = ?current, ?side, pivot = ?child, "single rotation");
                    self.rotate_up(child)
                };
            }

            match self.nodes.get(current).parent() {
                Some(parent) => current = parent,
                None => {
                    self.root = Some(current);
                    return;
                }
            }
        }
    }

    /// Finds the node and index of a key for which `f` returns `Equal`.
    ///
    /// `f` reports how a stored key orders against the one wanted, and must agree with the tree's
    /// comparator.
    pub(crate) fn locate_by<F>(&self, strategy: SearchStrategy, mut f: F) -> Option<(Handle, usize)>
    where
        F: FnMut(&K) -> Ordering,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            let (min, max) = node.bounds();
            let next = if f(min) == Greater {
                node.left()
            } else if f(max) == Less {
                node.right()
            } else {
                let index = strategy.search_by(node.keys(), &mut f).found()?;
                return Some((current, index));
            };
            current = next?;
        }
    }

    pub(crate) fn get_by<F>(&self, f: F) -> Option<&K>
    where
        F: FnMut(&K) -> Ordering,
    {
        let (handle, index) = self.locate_by(self.config.search(), f)?;
        Some(self.nodes.get(handle).key(index))
    }

    pub(crate) fn remove_by<F>(&mut self, f: F) -> Option<K>
    where
        F: FnMut(&K) -> Ordering,
    {
        let (handle, index) = self.locate_by(self.config.search(), f)?;
        Some(self.remove_at(handle, index))
    }

    fn remove_at(&mut self, handle: Handle, index: usize) -> K {
        let removed = self.nodes.get_mut(handle).remove(index);
        self.len -= 1;
        self.repair(handle);
        removed
    }

    /// Restores the node invariants of `handle` after it lost a key.
    ///
    /// - Internal nodes below the minimum fill borrow their greatest lower bound.
    /// - Half-leaves below the minimum fill swallow their leaf child when it fits.
    /// - Empty leaves are released.
    fn repair(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let count = node.key_count();
        let min_fill = self.config.min_fill();

        match (node.left(), node.right()) {
            (Some(left), Some(_)) => {
                if count >= min_fill {
                    return;
                }
                let donor = self.extreme(left, Side::Right);
                let borrowed =
                    self.nodes.get_mut(donor).pop_last().expect("`RawTTree::repair()` - donor node is empty!");
                self.nodes.get_mut(handle).push_front(borrowed);
                trace!(node = ?handle, ?donor, "borrowed greatest lower bound");
                // The donor has no right child, so this recursion ends one level down.
                self.repair(donor);
            }
            (Some(child), None) | (None, Some(child)) => {
                if count >= min_fill {
                    return;
                }
                let side = node.side_of(child);
                let child_node = self.nodes.get(child);
                debug_assert_eq!(child_node.height(), 1, "`RawTTree::repair()` - half-leaf child is not a leaf!");
                if count + child_node.key_count() > self.config.node_capacity() {
                    return;
                }
                let keys = self.nodes.take(child).take_keys();
                let merged = self.nodes.get_mut(handle);
                merged.absorb(side, keys);
                merged.set_child(side, None);
                trace!(node = ?handle, released = ?child, "merged leaf child into half-leaf");
                self.rebalance(handle);
            }
            (None, None) => {
                if count == 0 {
                    self.detach_leaf(handle);
                }
            }
        }
    }

    /// Allocates a node for a single key, fallibly, without linking it anywhere.
    fn prepare_node(&mut self) -> Result<Node<K>> {
        let node = Node::with_capacity(self.config.node_capacity())?;
        self.nodes.reserve_slot()?;
        Ok(node)
    }

    /// Links a prepared node below `parent` and rebalances from `parent`.
    fn attach(&mut self, parent: Handle, side: Side, mut node: Node<K>) {
        node.set_parent(Some(parent));
        let handle = self.nodes.alloc(node);
        self.nodes.get_mut(parent).set_child(side, Some(handle));
        trace!(node = ?handle, ?parent, ?side, "attached new node");
        self.rebalance(parent);
    }

    /// Unlinks and releases an empty leaf, then rebalances from its parent.
    fn detach_leaf(&mut self, handle: Handle) {
        let parent = self.nodes.take(handle).parent();
        trace!(node = ?handle, "released empty leaf");
        match parent {
            Some(parent) => {
                let side = self.nodes.get(parent).side_of(handle);
                self.nodes.get_mut(parent).set_child(side, None);
                self.rebalance(parent);
            }
            None => {
                debug_assert!(self.nodes.is_empty(), "`RawTTree::detach_leaf()` - root leaf had company!");
                self.nodes.clear();
                self.root = None;
            }
        }
    }
}

impl<K, C: Comparator<K>> RawTTree<K, C> {
    /// Inserts a key, routing top-down by each visited node's bounds.
    pub(crate) fn insert(&mut self, key: K) -> Result<()> {
        let Some(mut current) = self.root else {
            let mut node = self.prepare_node()?;
            node.push_front(key);
            self.root = Some(self.nodes.alloc(node));
            self.len = 1;
            return Ok(());
        };

        loop {
            let node = self.nodes.get(current);
            let (min, max) = node.bounds();
            let side = if self.comparator.compare(&key, min) == Less {
                Side::Left
            } else if self.comparator.compare(&key, max) == Greater {
                Side::Right
            } else {
                return self.insert_into_node(current, key);
            };

            if let Some(child) = node.child(side) {
                current = child;
            } else if node.has_room(self.config.node_capacity()) {
                return self.insert_into_node(current, key);
            } else {
                // Full and nothing below on this side: the key starts a node of its own.
                let mut fresh = self.prepare_node()?;
                fresh.push_front(key);
                self.attach(current, side, fresh);
                self.len += 1;
                return Ok(());
            }
        }
    }

    /// Inserts a key into the array of `handle`, redistributing the maximum if the node was full.
    fn insert_into_node(&mut self, handle: Handle, key: K) -> Result<()> {
        let capacity = self.config.node_capacity();
        let node = self.nodes.get(handle);
        let result = self.config.search().search(node.keys(), &key, &self.comparator);
        if self.config.unique() && result.found().is_some() {
            return Err(Error::DuplicateKey);
        }
        let position = result.insertion_point();

        if node.has_room(capacity) {
            self.nodes.get_mut(handle).insert(position, key);
            self.len += 1;
            return Ok(());
        }

        // Everything the overflow needs is allocated before the node is touched.
        let overflow = match node.right() {
            Some(right) => {
                let leftmost = self.extreme(right, Side::Left);
                if self.nodes.get(leftmost).has_room(capacity) {
                    Overflow::Prepend(leftmost)
                } else {
                    Overflow::Spawn {
                        parent: leftmost,
                        side: Side::Left,
                        node: self.prepare_node()?,
                    }
                }
            }
            None => Overflow::Spawn {
                parent: handle,
                side: Side::Right,
                node: self.prepare_node()?,
            },
        };

        let full = self.nodes.get_mut(handle);
        full.insert(position, key);
        let displaced = full.pop_last().expect("`RawTTree::insert_into_node()` - overflowed node is empty!");
        self.len += 1;
        trace!(node = ?handle, "node overflowed, relocating its maximum key");

        match overflow {
            Overflow::Prepend(target) => self.nodes.get_mut(target).push_front(displaced),
            Overflow::Spawn { parent, side, mut node } => {
                node.push_front(displaced);
                self.attach(parent, side, node);
            }
        }
        Ok(())
    }

    /// Finds the node and index holding a key equal to `key`.
    pub(crate) fn locate(&self, key: &K, strategy: SearchStrategy) -> Option<(Handle, usize)> {
        self.locate_by(strategy, |stored| self.comparator.compare(stored, key))
    }

    /// Returns the stored key equal to `key`.
    pub(crate) fn get_with(&self, key: &K, strategy: SearchStrategy) -> Option<&K> {
        let (handle, index) = self.locate(key, strategy)?;
        Some(self.nodes.get(handle).key(index))
    }

    /// Removes one stored key equal to `key` and returns it.
    pub(crate) fn remove(&mut self, key: &K) -> Option<K> {
        let (handle, index) = self.locate(key, self.config.search())?;
        Some(self.remove_at(handle, index))
    }
}
