//! A min-priority queue on top of [`RbTree`].
//!
//! Equal items are kept, each in its own node. The queue remembers its
//! smallest node, so `peek` is `O(1)` and `pop` only walks to the successor
//! before erasing.

use std::cmp::Ordering;

use log::debug;

use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::iter::next;
use crate::node::{Node, Slot};
use crate::tree::RbTree;

/// A min-priority queue that allows duplicate items.
///
/// # Example
/// ```rust
/// use rb_link_tree::PrioQueue;
///
/// let mut queue = PrioQueue::new();
/// queue.push(3);
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.peek(), Some(&1));
/// assert_eq!(queue.pop(), Some(1));
/// assert_eq!(queue.pop(), Some(2));
/// assert_eq!(queue.pop(), Some(3));
/// assert_eq!(queue.pop(), None);
/// ```
#[derive(Debug, Clone)]
pub struct PrioQueue<T, Ix = DefaultIx> {
    /// Vector that stores nodes
    nodes: Vec<Node<T, (), Ix>>,
    /// Tree handle over `nodes`
    tree: RbTree<Ix>,
    /// Node holding the smallest item
    min: Option<NodeIndex<Ix>>,
}

impl<T> PrioQueue<T>
where
    T: Ord,
{
    /// Create an empty `PrioQueue`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> Default for PrioQueue<T>
where
    T: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Ix> PrioQueue<T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Creates a new `PrioQueue` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        PrioQueue {
            nodes: Vec::with_capacity(capacity),
            tree: RbTree::new(),
            min: None,
        }
    }

    /// Push an item into the queue.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    pub fn push(&mut self, item: T) {
        let mut is_min = true;
        let nodes = &self.nodes;
        // ties descend left, so the search never stops on a node
        let found = self.tree.find_slot(nodes, |x| {
            if item <= nodes[x.index()].key {
                Ordering::Less
            } else {
                is_min = false;
                Ordering::Greater
            }
        });
        let Err(slot) = found else {
            return;
        };
        let node_idx = self.store(item, slot);
        if is_min {
            self.min = Some(node_idx);
        }
    }

    /// Remove and return the smallest item.
    pub fn pop(&mut self) -> Option<T> {
        let min = self.min?;
        self.min = next(&self.nodes, min);
        self.tree.erase(&mut self.nodes, min);

        let node = self.nodes.swap_remove(min.index());
        let moved = NodeIndex::new(self.nodes.len());
        if moved != min {
            debug!("relocate node {:?} to {:?}", moved, min);
            self.tree.relocate(&mut self.nodes, moved, min);
            if self.min == Some(moved) {
                self.min = Some(min);
            }
        }
        Some(node.key)
    }

    /// Return a reference to the smallest item.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.min.map(|x| self.nodes[x.index()].key())
    }

    /// Return the number of items in the queue.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` if the queue holds no item.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Remove all items from the queue
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.tree.init();
        self.min = None;
    }

    /// Store a new node and link it at `slot`.
    fn store(&mut self, item: T, slot: Slot<Ix>) -> NodeIndex<Ix> {
        let node_idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != node_idx,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Node::new(item, ()));
        self.tree.insert(&mut self.nodes, node_idx, slot);
        node_idx
    }
}

impl<T, Ix> Extend<T> for PrioQueue<T, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn empty_queue_pops_nothing() {
        let mut queue = PrioQueue::<u32>::new();
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut queue = PrioQueue::new();
        queue.extend([5, 1, 5, 1, 3]);
        assert_eq!(queue.len(), 5);
        let popped: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, vec![1, 1, 3, 5, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_forgets_minimum() {
        let mut queue = PrioQueue::new();
        queue.extend([2, 1]);
        queue.clear();
        assert_eq!(queue.peek(), None);
        queue.push(7);
        assert_eq!(queue.peek(), Some(&7));
    }

    #[test]
    fn interleaved_push_pop_matches_sorted_reference() {
        for seed in [[0; 32], [1; 32], [2; 32]] {
            let mut rng = StdRng::from_seed(seed);
            let mut queue = PrioQueue::new();
            let mut reference: Vec<u16> = Vec::new();
            let mut pushed = 0;
            while pushed < 256 || !reference.is_empty() {
                if pushed < 256 && rng.gen_bool(0.5) {
                    let item: u16 = rng.gen_range(0..64);
                    queue.push(item);
                    reference.push(item);
                    pushed += 1;
                } else {
                    reference.sort_unstable_by(|a, b| b.cmp(a));
                    assert_eq!(queue.pop(), reference.pop());
                }
                assert_eq!(queue.len(), reference.len());
                assert_eq!(queue.peek(), reference.iter().min());
            }
            assert!(queue.is_empty());
        }
    }
}
