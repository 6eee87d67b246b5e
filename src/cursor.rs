use alloc::collections::TryReserveError;
use alloc::vec::Vec;

/// A resettable forward cursor over a list of keys.
///
/// Callers fill it with [`push`](Self::push) (or collect into it) and then walk it with
/// [`current`](Self::current) and [`advance`](Self::advance). Unlike an [`Iterator`], a cursor can be
/// rewound with [`reset`](Self::reset) and walked again.
///
/// # Examples
///
/// ```
/// use ttree::{KeyCursor, TTree};
///
/// let tree: TTree<i32> = [30, 10, 20].into_iter().collect();
/// let mut cursor: KeyCursor<&i32> = tree.iter().collect();
///
/// let mut seen = Vec::new();
/// while let Some(key) = cursor.current() {
///     seen.push(**key);
///     cursor.advance();
/// }
/// assert_eq!(seen, [10, 20, 30]);
/// assert!(cursor.is_eof());
///
/// cursor.reset();
/// assert_eq!(cursor.current(), Some(&&10));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyCursor<K> {
    keys: Vec<K>,
    // Equal to `keys.len()` at the end.
    position: usize,
}

impl<K> KeyCursor<K> {
    #[must_use]
    pub const fn new() -> Self {
        KeyCursor {
            keys: Vec::new(),
            position: 0,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        KeyCursor {
            keys: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// Reserves room for at least `additional` more keys.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error if the reservation fails; the cursor is unchanged.
    pub fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.keys.try_reserve(additional)
    }

    /// Appends a key. The position is not moved.
    pub fn push(&mut self, key: K) {
        self.keys.push(key);
    }

    /// Returns the key under the cursor, or `None` at the end.
    #[must_use]
    pub fn current(&self) -> Option<&K> {
        self.keys.get(self.position)
    }

    /// Returns `true` once the cursor has moved past the last key.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.position == self.keys.len()
    }

    /// Moves to the next key. Returns `false`, without moving, if already at the end.
    pub fn advance(&mut self) -> bool {
        if self.is_eof() {
            return false;
        }
        self.position += 1;
        true
    }

    /// Moves back to the first key.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Every key, regardless of position.
    #[must_use]
    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }
}

impl<K> FromIterator<K> for KeyCursor<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        KeyCursor {
            keys: iter.into_iter().collect(),
            position: 0,
        }
    }
}

impl<K> Extend<K> for KeyCursor<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}
