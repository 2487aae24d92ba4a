use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Walks the whole tree and checks every structural invariant.
fn validate_tree(t: &AvlTree) {
    // Returns (height, node count) of the subtree. Keys must lie strictly
    // inside (lo, hi), which also rules out a node being reachable twice.
    fn walk(t: &AvlTree, id: NodeId, lo: Option<Key>, hi: Option<Key>) -> (u8, usize) {
        if id.is_null() {
            return (0, 0);
        }
        assert!(!t.nodes.is_vacant(id), "vacated slot reachable from root");

        let node = &t.nodes[id];
        if let Some(lo) = lo {
            assert!(node.key > lo, "key {} not above {lo}", node.key);
        }
        if let Some(hi) = hi {
            assert!(node.key < hi, "key {} not below {hi}", node.key);
        }
        assert!(
            node.name.len() <= t.config.max_name_len,
            "stored name exceeds bound"
        );

        let (lh, lc) = walk(t, node.left, lo, Some(node.key));
        let (rh, rc) = walk(t, node.right, Some(node.key), hi);

        assert!(
            (i32::from(lh) - i32::from(rh)).abs() <= 1,
            "unbalanced at key {}: left {lh}, right {rh}",
            node.key
        );
        assert_eq!(
            node.height,
            lh.max(rh) + 1,
            "stored height must match children at key {}",
            node.key
        );
        (node.height, lc + rc + 1)
    }

    let (height, count) = walk(t, t.root, None, None);

    assert_eq!(count, t.len, "reachable node count must match AvlTree::len");
    assert_eq!(t.nodes.live(), t.len, "occupied slots must match AvlTree::len");
    assert_eq!(usize::from(height), t.height());
    assert!(
        f64::from(height) <= 1.44 * ((t.len + 2) as f64).log2(),
        "height {height} too large for {} nodes",
        t.len
    );
}

fn key_strategy() -> impl Strategy<Value = Key> {
    -256i64..256
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 50)]
    Insert(
        #[proptest(strategy = "key_strategy()")] Key,
        #[proptest(regex = "[A-Za-z]{0,12}")] String,
    ),
    #[proptest(weight = 25)]
    Remove(#[proptest(strategy = "key_strategy()")] Key),
    #[proptest(weight = 20)]
    Get(#[proptest(strategy = "key_strategy()")] Key),
    #[proptest(weight = 4)]
    MinMax,
    #[proptest(weight = 1)]
    Compact,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t = AvlTree::new();
        let mut m: BTreeMap<Key, String> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, name) => {
                    let fresh = !m.contains_key(&key);
                    if fresh {
                        m.insert(key, name.clone());
                    }
                    prop_assert_eq!(t.insert(key, &name), Ok(fresh));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(key), m.get(&key).map(String::as_str));
                }
                Op::MinMax => {
                    let min = m.iter().next().map(|(k, v)| (*k, v.as_str()));
                    let max = m.iter().next_back().map(|(k, v)| (*k, v.as_str()));
                    prop_assert_eq!(t.find_min().ok(), min);
                    prop_assert_eq!(t.find_max().ok(), max);
                }
                Op::Compact => {
                    t.compact();
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }

        let got: Vec<(Key, &str)> = t.iter().collect();
        let expected: Vec<(Key, &str)> = m.iter().map(|(k, v)| (*k, v.as_str())).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_rejected_name_leaves_tree_unchanged(
        keys in prop::collection::vec(key_strategy(), 0..64),
        key in key_strategy(),
        extra in 1usize..32,
    ) {
        let mut t = AvlTree::new();
        for k in &keys {
            t.insert(*k, "ok").unwrap();
        }
        let before: Vec<(Key, String)> = t.iter().map(|(k, v)| (k, v.to_owned())).collect();
        let height = t.height();

        let name = "n".repeat(DEFAULT_MAX_NAME_LEN + extra);
        let rejected = matches!(t.insert(key, &name), Err(AvlError::NameTooLong { .. }));
        prop_assert!(rejected);

        let after: Vec<(Key, String)> = t.iter().map(|(k, v)| (k, v.to_owned())).collect();
        prop_assert_eq!(after, before);
        prop_assert_eq!(t.height(), height);
        validate_tree(&t);
    }

    #[test]
    fn prop_remove_all_in_any_order(
        (insert_order, remove_order) in prop::collection::btree_set(any::<i64>(), 0..200)
            .prop_flat_map(|keys| {
                let keys: Vec<Key> = keys.into_iter().collect();
                (Just(keys.clone()).prop_shuffle(), Just(keys).prop_shuffle())
            }),
    ) {
        let mut t = AvlTree::new();
        for k in &insert_order {
            prop_assert_eq!(t.insert(*k, "x"), Ok(true));
        }
        validate_tree(&t);

        for k in &remove_order {
            let removed = t.remove(*k);
            prop_assert_eq!(removed.as_deref(), Some("x"));
            prop_assert!(!t.contains_key(*k));
            validate_tree(&t);
        }
        prop_assert!(t.is_empty());
        prop_assert!(t.root.is_null());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Key> = vec![1, 2, 3, 4, 5, 6, 7];

    for_each_permutation(&keys, |perm| {
        let mut t = AvlTree::new();
        for k in &perm {
            assert_eq!(t.insert(*k, &format!("n{k}")), Ok(true));
            validate_tree(&t);
        }

        let got: Vec<Key> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(got, keys);
        assert!(t.height() <= 4, "7 keys fit in height 4, got {}", t.height());
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<Key> = vec![1, 2, 3, 4, 5, 6, 7];

    // Insert in a fixed order, then remove in all permutations.
    let mut base_tree = AvlTree::new();
    let mut base_map: BTreeMap<Key, String> = BTreeMap::new();
    for k in &keys {
        let name = format!("n{k}");
        assert_eq!(base_tree.insert(*k, &name), Ok(true));
        base_map.insert(*k, name);
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(k), m.remove(&k));
            assert_eq!(t.remove(k), None);
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_null());
        assert_eq!(t.find_min(), Err(AvlError::EmptyTree));
    });
}

#[test]
fn removal_can_rotate_at_several_levels() {
    fn preorder(t: &AvlTree, id: NodeId, out: &mut Vec<(Key, u8)>) {
        if !id.is_null() {
            out.push((t.nodes[id].key, t.nodes[id].height));
            preorder(t, t.nodes[id].left, out);
            preorder(t, t.nodes[id].right, out);
        }
    }

    // Sparsest tree of height 5: every node leans left.
    let mut t = AvlTree::new();
    for k in [8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1] {
        t.insert(k, "").unwrap();
    }
    validate_tree(&t);
    assert_eq!(t.height(), 5);

    // Dropping 12 rotates at 11, which shrinks the right side and forces a
    // second rotation at the root.
    assert_eq!(t.remove(12).as_deref(), Some(""));
    validate_tree(&t);

    let mut got = Vec::new();
    preorder(&t, t.root, &mut got);
    assert_eq!(
        got,
        vec![
            (5, 4),
            (3, 3),
            (2, 2),
            (1, 1),
            (4, 1),
            (8, 3),
            (7, 2),
            (6, 1),
            (10, 2),
            (9, 1),
            (11, 1),
        ]
    );
}
