use core::cmp::Ordering;

/// A total order over keys, supplied once when a [`TTree`](crate::TTree) is built.
///
/// The tree only ever looks at keys through this trait, so `K` can be a reference to a
/// caller-owned record ordered by one of its fields. Implementations must be pure: two calls with
/// the same arguments must return the same [`Ordering`] for as long as the keys are stored.
///
/// Any `Fn(&K, &K) -> Ordering` is a comparator:
///
/// ```
/// use core::cmp::Ordering;
/// use ttree::Comparator;
///
/// struct Row { id: u32 }
///
/// let by_id = |a: &&Row, b: &&Row| a.id.cmp(&b.id);
/// let (x, y) = (Row { id: 1 }, Row { id: 2 });
/// assert_eq!(by_id.compare(&&x, &&y), Ordering::Less);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
