use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use ttree::{Comparator, Config, Error, NaturalOrder, NodeRef, SearchStrategy, TTree};

/// A caller-owned record. Trees index it by reference.
#[derive(Debug)]
struct Record {
    pk: u64,
    group: u32,
    payload: [u8; 16],
}

impl Record {
    fn new(pk: u64) -> Self {
        Record {
            pk,
            group: (pk % 13) as u32,
            payload: [pk as u8; 16],
        }
    }
}

type RecordOrder = fn(&&Record, &&Record) -> Ordering;

fn pk_order(a: &&Record, b: &&Record) -> Ordering {
    a.pk.cmp(&b.pk)
}

fn group_order(a: &&Record, b: &&Record) -> Ordering {
    a.group.cmp(&b.group)
}

fn records(pks: impl IntoIterator<Item = u64>) -> Vec<Record> {
    pks.into_iter().map(Record::new).collect()
}

fn pk_index<'a>(capacity: usize) -> TTree<&'a Record, RecordOrder> {
    let order: RecordOrder = pk_order;
    TTree::with_config(order, Config::new().with_node_capacity(capacity)).unwrap()
}

fn pks(node: Option<NodeRef<'_, &Record>>) -> Vec<u64> {
    node.map(|n| n.keys().iter().map(|r| r.pk).collect()).unwrap_or_default()
}

// ─── Structural checks ───────────────────────────────────────────────────────

/// Walks the whole tree through `NodeRef` and panics on any broken invariant.
fn check_tree<K, C: Comparator<K>>(tree: &TTree<K, C>) {
    let Some(root) = tree.root() else {
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        return;
    };
    assert!(root.parent().is_none(), "root has a parent");
    let (height, keys) = check_node(tree, root, None, None);
    assert_eq!(height, tree.height());
    assert_eq!(keys, tree.len());
    assert_eq!(keys, tree.count());
}

fn check_node<'a, K, C: Comparator<K>>(
    tree: &TTree<K, C>,
    node: NodeRef<'a, K>,
    lower: Option<&'a K>,
    upper: Option<&'a K>,
) -> (u32, usize) {
    let cmp = tree.comparator();
    let unique = tree.config().unique();
    let keys = node.keys();

    assert!(!keys.is_empty(), "empty node linked into the tree");
    assert!(keys.len() <= tree.config().node_capacity(), "node over capacity");
    for pair in keys.windows(2) {
        let order = cmp.compare(&pair[0], &pair[1]);
        assert!(order == Ordering::Less || (!unique && order == Ordering::Equal), "node keys out of order");
    }
    // Everything left of an ancestor precedes it; everything right follows it.
    let bound_ok = |order: Ordering| order == Ordering::Less || (!unique && order == Ordering::Equal);
    if let Some(lower) = lower {
        assert!(bound_ok(cmp.compare(lower, node.first_key())), "key below subtree bound");
    }
    if let Some(upper) = upper {
        assert!(bound_ok(cmp.compare(node.last_key(), upper)), "key above subtree bound");
    }

    let mut count = keys.len();
    let mut heights = [0u32; 2];
    for (i, child) in [node.left(), node.right()].into_iter().enumerate() {
        if let Some(child) = child {
            assert!(child.parent().is_some_and(|p| p.same_node(&node)), "broken parent link");
            let (child_lower, child_upper) =
                if i == 0 { (lower, Some(node.first_key())) } else { (Some(node.last_key()), upper) };
            let (height, keys) = check_node(tree, child, child_lower, child_upper);
            heights[i] = height;
            count += keys;
        }
    }
    assert!(heights[0].abs_diff(heights[1]) <= 1, "node out of balance");
    assert_eq!(node.height(), 1 + heights[0].max(heights[1]), "stale node height");
    (node.height(), count)
}

// ─── Rotation scenarios ──────────────────────────────────────────────────────

#[test]
fn four_records_fit_after_first_spill() {
    let rows = records(1..=4);
    let mut tree = pk_index(3);
    for row in &rows {
        tree.insert(row).unwrap();
    }
    assert_eq!(tree.count(), 4);
    check_tree(&tree);
}

#[test]
fn ascending_inserts_rotate_left() {
    let rows = records(1..=7);
    let mut tree = pk_index(3);
    for row in &rows {
        tree.insert(row).unwrap();
    }
    let root = tree.root();
    assert_eq!(pks(root), [4, 5, 6]);
    assert_eq!(pks(root.and_then(|r| r.left())), [1, 2, 3]);
    assert_eq!(pks(root.and_then(|r| r.right())), [7]);
    check_tree(&tree);
}

#[test]
fn right_then_left_heavy_double_rotates() {
    let rows = records(1..=7);
    let mut tree = pk_index(3);
    for i in [0, 1, 2, 4, 5, 6, 3] {
        tree.insert(&rows[i]).unwrap();
    }
    let root = tree.root();
    assert_eq!(pks(root), [4]);
    assert_eq!(pks(root.and_then(|r| r.left())), [1, 2, 3]);
    assert_eq!(pks(root.and_then(|r| r.right())), [5, 6, 7]);
    check_tree(&tree);
}

#[test]
fn descending_inserts_rotate_right() {
    let rows = records(1..=7);
    let mut tree = pk_index(3);
    for row in rows.iter().rev() {
        tree.insert(row).unwrap();
    }
    let root = tree.root();
    assert_eq!(pks(root), [2, 3, 4]);
    assert_eq!(pks(root.and_then(|r| r.left())), [1]);
    assert_eq!(pks(root.and_then(|r| r.right())), [5, 6, 7]);
    check_tree(&tree);
}

#[test]
fn left_then_right_heavy_double_rotates() {
    let rows = records(1..=7);
    let mut tree = pk_index(3);
    for i in [4, 5, 6, 0, 1, 2, 3] {
        tree.insert(&rows[i]).unwrap();
    }
    let root = tree.root();
    assert_eq!(pks(root), [4]);
    assert_eq!(pks(root.and_then(|r| r.left())), [1, 2, 3]);
    assert_eq!(pks(root.and_then(|r| r.right())), [5, 6, 7]);
    check_tree(&tree);
}

// ─── Bulk insertion ──────────────────────────────────────────────────────────

/// Inserts `order` into a fresh index and checks every record comes back by identity.
fn insert_and_query(rows: &[Record], order: &[usize], capacity: usize) {
    let mut tree = pk_index(capacity);
    for &i in order {
        tree.insert(&rows[i]).unwrap();
    }
    assert_eq!(tree.len(), rows.len());
    check_tree(&tree);

    for row in rows {
        let found = tree.get(&row).expect("inserted record is found");
        assert!(std::ptr::eq(*found, row));
        assert_eq!(found.payload, row.payload);
    }
}

#[test]
fn ten_thousand_ascending() {
    let rows = records(0..10_000);
    let order: Vec<usize> = (0..rows.len()).collect();
    insert_and_query(&rows, &order, 3);
}

#[test]
fn ten_thousand_descending() {
    let rows = records(0..10_000);
    let order: Vec<usize> = (0..rows.len()).rev().collect();
    insert_and_query(&rows, &order, 3);
}

#[test]
fn hundred_thousand_shuffled() {
    let rows = records(0..100_000);
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(0x7472_6565));
    insert_and_query(&rows, &order, Config::DEFAULT_NODE_CAPACITY);
}

#[test]
fn random_keys_with_large_nodes() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut keys: Vec<u64> = (0..5_000).map(|_| rng.random_range(0..1_000_000)).collect();
    keys.sort_unstable();
    keys.dedup();
    let rows = records(keys);
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut rng);
    insert_and_query(&rows, &order, 128);
}

// ─── Uniqueness ──────────────────────────────────────────────────────────────

#[test]
fn duplicate_pk_is_rejected_without_change() {
    let rows = records(0..100);
    let twin = Record::new(42);
    let mut tree = pk_index(4);
    for row in &rows {
        tree.insert(row).unwrap();
    }
    let height = tree.height();
    let nodes = tree.node_count();

    assert_eq!(tree.insert(&twin), Err(Error::DuplicateKey));
    assert_eq!(tree.len(), 100);
    assert_eq!(tree.height(), height);
    assert_eq!(tree.node_count(), nodes);
    assert!(std::ptr::eq(*tree.get(&&twin).unwrap(), &rows[42]));
    check_tree(&tree);
}

#[test]
fn secondary_index_keeps_every_record() {
    let rows = records(0..500);
    // Compared through `&Record`, so it must outlive the index.
    let group_five = Record::new(5);
    let order: RecordOrder = group_order;
    let mut by_group = TTree::with_config(order, Config::new().with_unique(false).with_node_capacity(8)).unwrap();
    for row in &rows {
        by_group.insert(row).unwrap();
    }
    assert_eq!(by_group.len(), 500);
    check_tree(&by_group);

    let groups: Vec<u32> = by_group.iter().map(|r| r.group).collect();
    assert!(groups.windows(2).all(|w| w[0] <= w[1]));
    for row in &rows {
        assert_eq!(by_group.get(&row).unwrap().group, row.group);
    }

    // Removing by group drains one record per call.
    let mut removed = 0;
    while by_group.remove(&&group_five).is_some() {
        removed += 1;
    }
    assert_eq!(removed, rows.iter().filter(|r| r.group == group_five.group).count());
    assert!(!by_group.contains(&&group_five));

    let mut drained = Vec::new();
    while let Some(row) = by_group.remove_by(|r| r.group.cmp(&7)) {
        drained.push(row.pk);
    }
    drained.sort_unstable();
    let expected: Vec<u64> = rows.iter().filter(|r| r.group == 7).map(|r| r.pk).collect();
    assert_eq!(drained, expected);
    assert_eq!(by_group.len(), 500 - removed - expected.len());
    check_tree(&by_group);
}

// ─── Removal ─────────────────────────────────────────────────────────────────

#[test]
fn remove_returns_the_stored_record() {
    let rows = records(0..1_000);
    let twin = Record::new(500);
    let mut tree = pk_index(6);
    for row in &rows {
        tree.insert(row).unwrap();
    }

    let removed = tree.remove(&&twin).unwrap();
    assert!(std::ptr::eq(removed, &rows[500]));
    assert!(tree.get(&&twin).is_none());
    assert!(tree.remove(&&twin).is_none());
    assert_eq!(tree.len(), 999);
    check_tree(&tree);
}

#[test]
fn remove_by_field_returns_the_stored_record() {
    let rows = records(0..1_000);
    let mut tree = pk_index(6);
    for row in &rows {
        tree.insert(row).unwrap();
    }

    let found = tree.get_by(|r| r.pk.cmp(&321)).unwrap();
    assert!(std::ptr::eq(*found, &rows[321]));

    let removed = tree.remove_by(|r| r.pk.cmp(&321)).unwrap();
    assert!(std::ptr::eq(removed, &rows[321]));
    assert!(tree.get_by(|r| r.pk.cmp(&321)).is_none());
    assert!(tree.remove_by(|r| r.pk.cmp(&5_000)).is_none());
    assert_eq!(tree.len(), 999);
    check_tree(&tree);
}

#[test]
fn remove_in_shuffled_order_until_empty() {
    let rows = records(0..3_000);
    let mut tree = pk_index(5);
    for row in &rows {
        tree.insert(row).unwrap();
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(3));
    for (done, &i) in order.iter().enumerate() {
        assert!(tree.remove(&&rows[i]).is_some());
        if done % 97 == 0 {
            check_tree(&tree);
        }
    }
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert_eq!(tree.node_count(), 0);
}

#[test]
fn removal_keeps_balance_under_one_sided_deletes() {
    let mut tree = TTree::with_config(NaturalOrder, Config::new().with_node_capacity(4)).unwrap();
    for key in 0..2_000 {
        tree.insert(key).unwrap();
    }
    for key in 0..1_500 {
        assert_eq!(tree.remove(&key), Some(key));
    }
    check_tree(&tree);
    assert_eq!(tree.first(), Some(&1_500));
    assert!(tree.height() <= 16);
}

// ─── Iteration and lookup strategies ────────────────────────────────────────

#[test]
fn iter_visits_records_in_pk_order() {
    let rows = records((0..2_000).map(|i| i * 7 % 2_003));
    let mut tree = pk_index(16);
    for row in &rows {
        tree.insert(row).unwrap();
    }
    let mut expected: Vec<u64> = rows.iter().map(|r| r.pk).collect();
    expected.sort_unstable();

    let iter = tree.iter();
    assert_eq!(iter.len(), rows.len());
    assert_eq!(iter.map(|r| r.pk).collect::<Vec<_>>(), expected);
    assert_eq!(tree.first().map(|r| r.pk), expected.first().copied());
    assert_eq!(tree.last().map(|r| r.pk), expected.last().copied());
}

#[test]
fn search_strategies_find_the_same_records() {
    let rows = records((0..4_000).filter(|pk| pk % 3 != 0));
    let misses = records((0..4_000).filter(|pk| pk % 3 == 0));
    for strategy in SearchStrategy::ALL {
        let order: RecordOrder = pk_order;
        let config = Config::new().with_node_capacity(24).with_search(strategy);
        let mut tree = TTree::with_config(order, config).unwrap();
        for row in &rows {
            tree.insert(row).unwrap();
        }
        check_tree(&tree);

        for row in &rows {
            for lookup in SearchStrategy::ALL {
                assert!(std::ptr::eq(*tree.get_with(&row, lookup).unwrap(), row), "{strategy:?}/{lookup:?}");
            }
        }
        for miss in &misses {
            for lookup in SearchStrategy::ALL {
                assert!(tree.get_with(&miss, lookup).is_none(), "{strategy:?}/{lookup:?}");
            }
        }
    }
}

#[test]
fn clone_shares_records_not_structure() {
    let rows = records(0..300);
    let mut tree = pk_index(8);
    for row in &rows {
        tree.insert(row).unwrap();
    }
    let snapshot = tree.clone();
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(snapshot.len(), 300);
    assert!(std::ptr::eq(*snapshot.get(&&rows[7]).unwrap(), &rows[7]));
    check_tree(&snapshot);
}

#[test]
fn unreservable_capacity_reports_allocation_failure() {
    for capacity in [1usize << 60, usize::MAX] {
        let mut tree = TTree::with_config(NaturalOrder, Config::new().with_node_capacity(capacity)).unwrap();
        assert_eq!(tree.insert(1u64), Err(Error::AllocationFailure));
        assert_eq!(tree.len(), 0);
        assert!(tree.root().is_none());
        assert_eq!(tree.node_count(), 0);
        check_tree(&tree);
    }
}

#[test]
fn zero_capacity_is_rejected() {
    let err = TTree::<u8>::with_config(NaturalOrder, Config::new().with_node_capacity(0)).err();
    assert_eq!(err, Some(Error::ZeroCapacity));
    assert_eq!(Error::ZeroCapacity.to_string(), "node capacity must be at least 1");
}

// ─── Randomized model checks ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Insert(i32),
    Remove(i32),
    Get(i32),
    First,
    Last,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (-500i32..500).prop_map(Op::Insert),
        3 => (-500i32..500).prop_map(Op::Remove),
        2 => (-500i32..500).prop_map(Op::Get),
        1 => Just(Op::First),
        1 => Just(Op::Last),
    ]
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (1usize..40, prop::sample::select(SearchStrategy::ALL.to_vec()))
        .prop_map(|(capacity, search)| Config::new().with_node_capacity(capacity).with_search(search))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Replays random operations on a unique `TTree` and a `BTreeSet` and compares every result.
    #[test]
    fn unique_tree_matches_btreeset(ops in prop::collection::vec(op_strategy(), 0..2_000), config in config_strategy()) {
        let mut tree = TTree::with_config(NaturalOrder, config).unwrap();
        let mut model = BTreeSet::new();

        for op in &ops {
            match op {
                Op::Insert(k) => {
                    let expected = if model.insert(*k) { Ok(()) } else { Err(Error::DuplicateKey) };
                    prop_assert_eq!(tree.insert(*k), expected, "insert({})", k);
                }
                Op::Remove(k) => prop_assert_eq!(tree.remove(k), model.take(k), "remove({})", k),
                Op::Get(k) => prop_assert_eq!(tree.get(k), model.get(k), "get({})", k),
                Op::First => prop_assert_eq!(tree.first(), model.first()),
                Op::Last => prop_assert_eq!(tree.last(), model.last()),
            }
        }

        check_tree(&tree);
        prop_assert!(tree.iter().eq(model.iter()));
    }

    /// Same as above for a non-unique tree against a multiset.
    #[test]
    fn multiset_tree_matches_btreemap(ops in prop::collection::vec(op_strategy(), 0..1_000), config in config_strategy()) {
        let mut tree = TTree::with_config(NaturalOrder, config.with_unique(false)).unwrap();
        let mut model: BTreeMap<i32, usize> = BTreeMap::new();

        for op in &ops {
            match op {
                Op::Insert(k) => {
                    prop_assert_eq!(tree.insert(*k), Ok(()));
                    *model.entry(*k).or_default() += 1;
                }
                Op::Remove(k) => {
                    let expected = match model.get_mut(k) {
                        Some(1) => model.remove(k).map(|_| *k),
                        Some(n) => {
                            *n -= 1;
                            Some(*k)
                        }
                        None => None,
                    };
                    prop_assert_eq!(tree.remove(k), expected, "remove({})", k);
                }
                Op::Get(k) => prop_assert_eq!(tree.get(k).copied(), model.contains_key(k).then_some(*k)),
                Op::First => prop_assert_eq!(tree.first(), model.keys().next()),
                Op::Last => prop_assert_eq!(tree.last(), model.keys().next_back()),
            }
        }

        check_tree(&tree);
        let expected: Vec<i32> = model.iter().flat_map(|(k, n)| std::iter::repeat_n(*k, *n)).collect();
        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), expected);
    }
}
