use std::collections::BTreeSet;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use super::*;

/// Entry embedding a tree link, keyed by `key`.
#[derive(Debug, Clone)]
struct Item {
    link: Link<u32>,
    key: u32,
}

impl Linked<u32> for Item {
    fn link(&self) -> &Link<u32> {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link<u32> {
        &mut self.link
    }
}

fn idx(x: usize) -> NodeIndex<u32> {
    NodeIndex::new(x)
}

/// Insert `keys` in order, the i-th key lands at index i.
fn build(keys: &[u32]) -> (RbTree<u32>, Vec<Item>) {
    let mut items: Vec<_> = keys
        .iter()
        .map(|&key| Item {
            link: Link::new(),
            key,
        })
        .collect();
    let mut tree = RbTree::new();
    for (i, &key) in keys.iter().enumerate() {
        let slot = tree
            .find_slot(&items, |n| key.cmp(&items[n.index()].key))
            .unwrap_err();
        tree.insert(&mut items, idx(i), slot);
        check_rb_properties(&tree, &items);
    }
    (tree, items)
}

fn shuffled(rng: &mut StdRng, n: u32) -> Vec<u32> {
    let mut keys: Vec<_> = (0..n).collect();
    keys.shuffle(rng);
    keys
}

/// 1. The root is black and has no parent.
/// 2. If a node is red, then both its children are black.
/// 3. For each node, all simple paths from the node to descendant leaves contain the
/// same number of black nodes.
/// 4. Every child points back at its parent.
fn check_rb_properties<A>(tree: &RbTree<u32>, arena: &A)
where
    A: Arena<u32> + ?Sized,
{
    let Some(root) = tree.root() else {
        return;
    };
    assert!(arena.link(root).is_black());
    assert_eq!(arena.link(root).parent(), None);
    let _ignore = check_subtree(arena, root);
}

fn check_subtree<A>(arena: &A, x: NodeIndex<u32>) -> usize
where
    A: Arena<u32> + ?Sized,
{
    let link = *arena.link(x);
    let mut heights = [0, 0];
    for (h, child) in heights.iter_mut().zip([link.left(), link.right()]) {
        let Some(child) = child else {
            continue;
        };
        assert_eq!(arena.link(child).parent(), Some(x));
        if link.is_red() {
            assert!(arena.link(child).is_black(), "red node {x:?} has a red child");
        }
        *h = check_subtree(arena, child);
    }
    assert_eq!(heights[0], heights[1], "unequal black height under {x:?}");
    heights[0] + usize::from(link.is_black())
}

fn forward_keys(tree: &RbTree<u32>, items: &[Item]) -> Vec<u32> {
    std::iter::successors(tree.first(items), |&x| next(items, x))
        .map(|x| items[x.index()].key)
        .collect()
}

fn backward_keys(tree: &RbTree<u32>, items: &[Item]) -> Vec<u32> {
    std::iter::successors(tree.last(items), |&x| prev(items, x))
        .map(|x| items[x.index()].key)
        .collect()
}

#[test]
fn empty_tree_has_no_first_or_last() {
    let items: Vec<Item> = Vec::new();
    let mut tree = RbTree::<u32>::new();
    tree.init();
    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);
    assert_eq!(tree.first(&items), None);
    assert_eq!(tree.last(&items), None);
    assert_eq!(tree.iter(&items).next(), None);
}

#[test]
fn small_tree_is_sorted_and_balanced() {
    let (tree, items) = build(&[5, 3, 8, 1, 4, 7, 9]);
    assert_eq!(forward_keys(&tree, &items), vec![1, 3, 4, 5, 7, 8, 9]);
    let root = tree.root().unwrap();
    assert!(items[root.index()].link.is_black());
    check_rb_properties(&tree, &items);
}

#[test]
fn single_node_has_no_neighbours() {
    let (tree, items) = build(&[42]);
    let root = tree.root().unwrap();
    assert_eq!(tree.first(&items), Some(root));
    assert_eq!(tree.last(&items), Some(root));
    assert_eq!(next(&items, root), None);
    assert_eq!(prev(&items, root), None);
}

#[test]
fn red_black_tree_properties_hold_after_every_step() {
    for seed in [[0; 32], [1; 32], [2; 32]] {
        let mut rng = StdRng::from_seed(seed);
        let insert_order = shuffled(&mut rng, 256);
        let erase_order = shuffled(&mut rng, 256);
        let (mut tree, mut items) = build(&insert_order);

        let mut present: BTreeSet<_> = insert_order.iter().copied().collect();
        for (n, &key) in erase_order.iter().enumerate() {
            // key k was inserted at the position it holds in `insert_order`
            let i = insert_order.iter().position(|&k| k == key).unwrap();
            tree.erase(&mut items, idx(i));
            let _ignore = present.remove(&key);

            assert_eq!(tree.is_empty(), n == erase_order.len() - 1);
            check_rb_properties(&tree, &items);
            assert_eq!(
                forward_keys(&tree, &items),
                present.iter().copied().collect::<Vec<_>>()
            );
        }
        assert!(tree.is_empty());
    }
}

#[test]
fn sorted_inserts_stay_balanced() {
    let ascending: Vec<u32> = (0..100).collect();
    let descending: Vec<u32> = (0..100).rev().collect();
    for keys in [ascending, descending] {
        let (mut tree, mut items) = build(&keys);
        assert_eq!(forward_keys(&tree, &items), (0..100).collect::<Vec<u32>>());
        // erase from one end only
        for i in 0..keys.len() {
            tree.erase(&mut items, idx(i));
            check_rb_properties(&tree, &items);
        }
        assert!(tree.is_empty());
    }
}

#[test]
fn forward_and_backward_traversals_mirror() {
    let mut rng = StdRng::from_seed([7; 32]);
    let keys = shuffled(&mut rng, 500);
    let (tree, items) = build(&keys);

    let mut backward = backward_keys(&tree, &items);
    backward.reverse();
    assert_eq!(forward_keys(&tree, &items), backward);

    let iter_keys: Vec<_> = tree.iter(&items[..]).map(|x| items[x.index()].key).collect();
    assert_eq!(iter_keys, (0..500).collect::<Vec<u32>>());
    let rev_keys: Vec<_> = tree
        .iter(&items[..])
        .rev()
        .map(|x| items[x.index()].key)
        .collect();
    assert_eq!(rev_keys, (0..500).rev().collect::<Vec<u32>>());
}

#[test]
fn unlink_two_children_uses_successor() {
    let keys: Vec<u32> = (0..32).collect();

    for target in 0..keys.len() {
        let (mut tree, mut items) = build(&keys);
        let node = idx(target);
        let Link {
            parent,
            left: Some(left),
            right: Some(right),
            color,
        } = items[target].link
        else {
            continue;
        };
        let successor = next(&items, node).unwrap();
        assert_eq!(items[successor.index()].key, items[target].key + 1);
        let successor_parent = items[successor.index()].link.parent().unwrap();
        let successor_right = items[successor.index()].link.right();

        let deficiency = tree.unlink(&mut items, node);

        // the successor takes over the position and color of the node
        let moved = items[successor.index()].link;
        assert_eq!(moved.parent(), parent);
        assert_eq!(moved.left(), Some(left));
        assert_eq!(moved.color(), color);
        assert_eq!(items[left.index()].link.parent(), Some(successor));
        match parent {
            Some(p) => assert!(
                items[p.index()].link.left() == Some(successor)
                    || items[p.index()].link.right() == Some(successor)
            ),
            None => assert_eq!(tree.root(), Some(successor)),
        }

        // the successor's right child fills the hole the successor left
        if successor_parent == node {
            assert_eq!(moved.right(), successor_right);
        } else {
            assert_eq!(moved.right(), Some(right));
            assert_eq!(items[successor_parent.index()].link.left(), successor_right);
            if let Some(sr) = successor_right {
                assert_eq!(items[sr.index()].link.parent(), Some(successor_parent));
            }
        }

        if let Some(deficiency) = deficiency {
            tree.rebalance_after_delete(&mut items, deficiency);
        }
        check_rb_properties(&tree, &items);
        let expect: Vec<_> = keys.iter().copied().filter(|&k| k != keys[target]).collect();
        assert_eq!(forward_keys(&tree, &items), expect);
    }
}

#[test]
fn insert_erase_round_trip_leaves_tree_empty() {
    let mut rng = StdRng::from_seed([3; 32]);
    for _ in 0..20 {
        let n = rng.gen_range(1..200);
        let keys = shuffled(&mut rng, n);
        let (mut tree, mut items) = build(&keys);
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.shuffle(&mut rng);
        for i in order {
            assert!(!tree.is_empty());
            tree.erase(&mut items, idx(i));
        }
        assert!(tree.is_empty());
        assert_eq!(tree.first(&items), None);
    }
}

#[test]
fn map_keeps_tree_valid_under_random_ops() {
    let mut rng = StdRng::from_seed([9; 32]);
    let mut map = RbMap::new();
    let mut expect = std::collections::BTreeMap::new();
    for _ in 0..2000 {
        let key: u16 = rng.gen_range(0..300);
        if rng.gen_bool(0.6) {
            assert_eq!(map.insert(key, u32::from(key)), expect.insert(key, u32::from(key)));
        } else {
            assert_eq!(map.remove(&key), expect.remove(&key));
        }
        check_rb_properties(&map.tree, &map.nodes);
        assert_eq!(map.len(), expect.len());
    }
    assert!(map.iter().eq(expect.iter()));
}

#[test]
fn entry_api_is_ok() {
    let mut map = RbMap::new();
    *map.entry("a").or_insert(0) += 1;
    *map.entry("a").or_insert(0) += 1;
    *map.entry("b").or_insert_with(|| 10) += 1;
    assert_eq!(map.get("a"), Some(&2));
    assert_eq!(map.get("b"), Some(&11));

    assert_eq!(map.entry("c").key(), &"c");
    match map.entry("a") {
        Entry::Occupied(mut entry) => {
            assert_eq!(entry.key(), &"a");
            assert_eq!(entry.get(), &2);
            *entry.get_mut() = 5;
            assert_eq!(entry.insert(6), 5);
            assert_eq!(entry.remove(), 6);
        }
        Entry::Vacant(_) => unreachable!(),
    }
    assert!(!map.contains_key("a"));
    assert_eq!(map.len(), 1);

    match map.entry("z") {
        Entry::Vacant(entry) => {
            assert_eq!(entry.key(), &"z");
            *entry.insert(1) += 1;
        }
        Entry::Occupied(_) => unreachable!(),
    }
    assert_eq!(map.get("z"), Some(&2));
    check_rb_properties(&map.tree, &map.nodes);
}

#[test]
fn wide_index_types_work() {
    let mut map: RbMap<u8, (), u16> = RbMap::with_capacity(16);
    let mut big: RbMap<u8, (), usize> = RbMap::with_capacity(16);
    for k in (0..16).rev() {
        map.insert(k, ());
        big.insert(k, ());
    }
    assert!(map.iter().map(|(k, _)| *k).eq(0..16u8));
    assert!(big.iter().map(|(k, _)| *k).eq(0..16u8));
}

#[cfg(feature = "graphviz")]
#[test]
fn rb_map_draw_is_ok() {
    let map: RbMap<_, _> = [(16, 30), (8, 23), (0, 3), (5, 10), (25, 30)]
        .into_iter()
        .collect();

    let path = std::env::temp_dir().join("rb_link_tree_draw.dot");
    let path = path.to_str().unwrap();
    map.draw(path).unwrap();
    let dot = std::fs::read_to_string(path).unwrap();
    assert!(dot.starts_with("digraph {"));
    assert_eq!(dot.matches("fillcolor").count(), 5);

    map.draw_without_value(path).unwrap();
    let _ignore = std::fs::remove_file(path);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_rb_map() {
    use serde_json::{json, Value};

    let mut map = RbMap::<i32, i32>::new();
    map.insert(1, 10);
    map.insert(2, 20);

    let serialized = serde_json::to_string(&map).unwrap();
    let expected = json!({
        "nodes": [
            {
                "link": { "parent": null, "left": null, "right": 1, "color": "Black" },
                "key": 1,
                "value": 10
            },
            {
                "link": { "parent": 0, "left": null, "right": null, "color": "Red" },
                "key": 2,
                "value": 20
            }
        ],
        "tree": { "root": 0 }
    });
    let actual: Value = serde_json::from_str(&serialized).unwrap();
    assert_eq!(expected, actual);

    let deserialized: RbMap<i32, i32> = serde_json::from_str(&serialized).unwrap();
    let dv: Vec<_> = deserialized.iter().collect();
    let ev: Vec<_> = map.iter().collect();
    assert_eq!(ev, dv);
}
