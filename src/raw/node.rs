use smallvec::SmallVec;

use super::arena::Handle;
use crate::error::{Error, Result};

/// Keys stored inline before a node's array spills to the heap.
pub(crate) const INLINE_KEYS: usize = 8;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;

/// Which child of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A T-tree node: a bounded sorted run of keys plus AVL links.
#[derive(Clone)]
pub(crate) struct Node<K> {
    // Leaf = 1.
    height: u32,
    // Reserved at capacity + 1 on creation; the extra slot holds the overflow key while an
    // insertion into a full node is being redistributed.
    keys: Keys<K>,
    children: [Option<Handle>; 2],
    // Back-reference only. The owning link is the parent's `children` entry.
    parent: Option<Handle>,
}

impl<K> Node<K> {
    /// Creates an empty, unlinked leaf with room for `capacity + 1` keys.
    ///
    /// This is the only allocation a node ever needs, so callers create the node before mutating
    /// the tree and link it afterwards.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        let slots = capacity.checked_add(1).ok_or(Error::AllocationFailure)?;
        let mut keys = SmallVec::new();
        keys.try_reserve_exact(slots)?;
        Ok(Self {
            height: 1,
            keys,
            children: [None, None],
            parent: None,
        })
    }

    /// Returns the number of keys in this node.
    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns all keys.
    #[inline]
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Returns `(min, max)`. Nodes linked into a tree are never empty.
    #[inline]
    pub(crate) fn bounds(&self) -> (&K, &K) {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => panic!("`Node::bounds()` - node is empty!"),
        }
    }

    /// Returns true if another key fits without overflowing.
    #[inline]
    pub(crate) fn has_room(&self, capacity: usize) -> bool {
        self.keys.len() < capacity
    }

    #[inline]
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        self.children[side as usize]
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        self.children[side as usize] = child;
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.child(Side::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.child(Side::Right)
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Returns the side `child` hangs from.
    pub(crate) fn side_of(&self, child: Handle) -> Side {
        if self.left() == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(self.right(), Some(child), "`Node::side_of()` - not a child of this node!");
            Side::Right
        }
    }

    /// Shift-inserts `key` at `index`. Never reallocates while the node holds at most `capacity`
    /// keys beforehand.
    pub(crate) fn insert(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    pub(crate) fn push_front(&mut self, key: K) {
        self.keys.insert(0, key);
    }

    pub(crate) fn remove(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    pub(crate) fn pop_last(&mut self) -> Option<K> {
        self.keys.pop()
    }

    /// Absorbs the keys of a child leaf. Keys of a left child precede ours; keys of a right child
    /// follow them.
    pub(crate) fn absorb(&mut self, side: Side, keys: Keys<K>) {
        match side {
            Side::Left => self.keys.insert_many(0, keys),
            Side::Right => self.keys.extend(keys),
        }
    }

    /// Takes ownership of all keys, leaving the node empty.
    pub(crate) fn take_keys(&mut self) -> Keys<K> {
        core::mem::take(&mut self.keys)
    }
}
