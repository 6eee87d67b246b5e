//! Intra-node search strategies.
//!
//! A T-tree node holds a short sorted array of keys. Finding a key (or the slot a new key belongs
//! in) inside that array can be done three ways, and all of them are interchangeable:
//!
//! - [`forward_scan`] walks left to right and stops at the first key that is not less than the
//!   target.
//! - [`backward_scan`] walks right to left and stops at the first key that is not greater than the
//!   target. Ascending workloads append near the end of a node, so this is the default.
//! - [`binary_search`] halves the range each step, which pays off for large node capacities.
//!
//! For any sorted slice and target the three agree on whether a match exists, and each returns a
//! valid insertion point. When several keys compare equal, which of them is reported is
//! unspecified.
//!
//! Each strategy also has a `_by` form that takes the target as a closure returning how a stored
//! key orders against it, in the manner of [`slice::binary_search_by`]. The tree uses these to look
//! keys up without building a `K`.

use core::cmp::Ordering::{self, Equal, Greater, Less};

use crate::Comparator;

/// Result of searching for a key in a node's sorted array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

impl SearchResult {
    /// Returns the index of the matching key, if any.
    #[must_use]
    pub const fn found(self) -> Option<usize> {
        match self {
            SearchResult::Found(index) => Some(index),
            SearchResult::NotFound(_) => None,
        }
    }

    /// Returns where a new key should be inserted to keep the array sorted.
    ///
    /// A new key equal to an existing one goes directly after the reported match.
    #[must_use]
    pub const fn insertion_point(self) -> usize {
        match self {
            SearchResult::Found(index) => index + 1,
            SearchResult::NotFound(index) => index,
        }
    }
}

/// Selects one of the intra-node search strategies.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum SearchStrategy {
    /// Linear scan from the first key. See [`forward_scan`].
    Forward,
    /// Linear scan from the last key. See [`backward_scan`].
    #[default]
    Backward,
    /// Bisection. See [`binary_search`].
    Binary,
}

impl SearchStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [SearchStrategy; 3] = [SearchStrategy::Forward, SearchStrategy::Backward, SearchStrategy::Binary];

    /// Searches `keys` for `target` with this strategy.
    #[inline]
    pub fn search<K, C>(self, keys: &[K], target: &K, comparator: &C) -> SearchResult
    where
        C: Comparator<K> + ?Sized,
    {
        match self {
            SearchStrategy::Forward => forward_scan(keys, target, comparator),
            SearchStrategy::Backward => backward_scan(keys, target, comparator),
            SearchStrategy::Binary => binary_search(keys, target, comparator),
        }
    }

    /// Searches `keys` with this strategy. `f` returns how a stored key orders against the
    /// key being looked for.
    #[inline]
    pub fn search_by<K, F>(self, keys: &[K], f: F) -> SearchResult
    where
        F: FnMut(&K) -> Ordering,
    {
        match self {
            SearchStrategy::Forward => forward_scan_by(keys, f),
            SearchStrategy::Backward => backward_scan_by(keys, f),
            SearchStrategy::Binary => binary_search_by(keys, f),
        }
    }
}

/// Scans `keys` from the front.
///
/// # Examples
///
/// ```
/// use ttree::NaturalOrder;
/// use ttree::search::{forward_scan, SearchResult};
///
/// assert_eq!(forward_scan(&[1, 3, 5], &3, &NaturalOrder), SearchResult::Found(1));
/// assert_eq!(forward_scan(&[1, 3, 5], &4, &NaturalOrder), SearchResult::NotFound(2));
/// ```
pub fn forward_scan<K, C>(keys: &[K], target: &K, comparator: &C) -> SearchResult
where
    C: Comparator<K> + ?Sized,
{
    forward_scan_by(keys, |key| comparator.compare(key, target))
}

/// [`forward_scan`] against an ordering closure.
pub fn forward_scan_by<K, F>(keys: &[K], mut f: F) -> SearchResult
where
    F: FnMut(&K) -> Ordering,
{
    for (index, key) in keys.iter().enumerate() {
        match f(key) {
            Less => {}
            Equal => return SearchResult::Found(index),
            Greater => return SearchResult::NotFound(index),
        }
    }
    SearchResult::NotFound(keys.len())
}

/// Scans `keys` from the back.
///
/// # Examples
///
/// ```
/// use ttree::NaturalOrder;
/// use ttree::search::{backward_scan, SearchResult};
///
/// assert_eq!(backward_scan(&[1, 3, 5], &5, &NaturalOrder), SearchResult::Found(2));
/// assert_eq!(backward_scan(&[1, 3, 5], &0, &NaturalOrder), SearchResult::NotFound(0));
/// ```
pub fn backward_scan<K, C>(keys: &[K], target: &K, comparator: &C) -> SearchResult
where
    C: Comparator<K> + ?Sized,
{
    backward_scan_by(keys, |key| comparator.compare(key, target))
}

/// [`backward_scan`] against an ordering closure.
pub fn backward_scan_by<K, F>(keys: &[K], mut f: F) -> SearchResult
where
    F: FnMut(&K) -> Ordering,
{
    for (index, key) in keys.iter().enumerate().rev() {
        match f(key) {
            Greater => {}
            Equal => return SearchResult::Found(index),
            Less => return SearchResult::NotFound(index + 1),
        }
    }
    SearchResult::NotFound(0)
}

/// Bisects `keys`.
///
/// # Examples
///
/// ```
/// use ttree::NaturalOrder;
/// use ttree::search::{binary_search, SearchResult};
///
/// assert_eq!(binary_search(&[1, 3, 5, 7], &7, &NaturalOrder), SearchResult::Found(3));
/// assert_eq!(binary_search(&[1, 3, 5, 7], &6, &NaturalOrder), SearchResult::NotFound(3));
/// ```
pub fn binary_search<K, C>(keys: &[K], target: &K, comparator: &C) -> SearchResult
where
    C: Comparator<K> + ?Sized,
{
    binary_search_by(keys, |key| comparator.compare(key, target))
}

/// [`binary_search`] against an ordering closure.
///
/// # Examples
///
/// ```
/// use ttree::search::{binary_search_by, SearchResult};
///
/// let words = ["ant", "bee", "cat"];
/// assert_eq!(binary_search_by(&words, |w| w.cmp(&"bee")), SearchResult::Found(1));
/// assert_eq!(binary_search_by(&words, |w| w.cmp(&"cow")), SearchResult::NotFound(3));
/// ```
pub fn binary_search_by<K, F>(keys: &[K], f: F) -> SearchResult
where
    F: FnMut(&K) -> Ordering,
{
    match keys.binary_search_by(f) {
        Ok(index) => SearchResult::Found(index),
        Err(index) => SearchResult::NotFound(index),
    }
}
