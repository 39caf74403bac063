use std::borrow::Borrow;
#[cfg(feature = "graphviz")]
use std::fmt::Debug;
#[cfg(feature = "graphviz")]
use std::fs::OpenOptions;
#[cfg(feature = "graphviz")]
use std::io::{Result, Write};

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, OccupiedEntry, VacantEntry};
use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::iter::Iter as NodeIter;
use crate::node::{Node, Slot};
use crate::tree::RbTree;

/// An ordered key-value map built on [`RbTree`].
///
/// Entries are stored densely in a vector that embeds the tree links, so a
/// node handle is simply the position of its entry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct RbMap<K, V, Ix = DefaultIx> {
    /// Vector that stores nodes
    pub(crate) nodes: Vec<Node<K, V, Ix>>,
    /// Tree handle over `nodes`
    pub(crate) tree: RbTree<Ix>,
}

impl<K, V, Ix> RbMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Creates a new `RbMap` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RbMap {
            nodes: Vec::with_capacity(capacity),
            tree: RbTree::new(),
        }
    }

    /// Insert a key-value pair into the map.
    /// If the key exists, overwrite and return the previous value.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::RbMap;
    ///
    /// let mut map = RbMap::new();
    /// assert_eq!(map.insert(3, 1), None);
    /// assert_eq!(map.insert(3, 2), Some(1));
    /// assert_eq!(map.insert(3, 3), Some(2));
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Ok(node_idx) => Some(self.node_mut(node_idx, Node::set_value(value))),
            Err(slot) => {
                let _ignore = self.push(key, value, slot);
                None
            }
        }
    }

    /// Remove a key from the map, returning the value at the key if the key exists
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::RbMap;
    ///
    /// let mut map = RbMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.remove(&3), None);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.remove(&2), Some("b"));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_idx = self.search(key).ok()?;
        Some(self.remove_node(node_idx).1)
    }

    /// Return reference to the value corresponding to the key.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::RbMap;
    ///
    /// let mut map = RbMap::new();
    /// map.insert(1, 10);
    /// map.insert(7, 40);
    /// assert_eq!(map.get(&1), Some(&10));
    /// assert_eq!(map.get(&7), Some(&40));
    /// assert_eq!(map.get(&5), None);
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key)
            .ok()
            .map(|idx| self.node_ref(idx, Node::value))
    }

    /// Return a mutable reference to the value corresponding to the key.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::RbMap;
    ///
    /// let mut map = RbMap::new();
    /// map.insert(3, 0);
    /// map.get_mut(&3).map(|v| *v += 1);
    /// assert_eq!(map.get(&3), Some(&1));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key)
            .ok()
            .map(|idx| self.node_mut(idx, Node::value_mut))
    }

    /// Return the key-value pair corresponding to the key.
    #[inline]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key)
            .ok()
            .map(|idx| self.node_ref(idx, Node::key_value))
    }

    /// Return `true` if the map contains the key.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_ok()
    }

    /// Get the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::{Entry, RbMap};
    ///
    /// let mut map = RbMap::new();
    ///
    /// assert!(matches!(map.entry(1), Entry::Vacant(_)));
    /// map.entry(1).or_insert(0);
    /// assert!(matches!(map.entry(1), Entry::Occupied(_)));
    /// map.entry(1).and_modify(|v| *v += 1);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    #[inline]
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, Ix> {
        match self.search(&key) {
            Ok(node_idx) => Entry::Occupied(OccupiedEntry {
                map_ref: self,
                node_idx,
            }),
            Err(slot) => Entry::Vacant(VacantEntry {
                map_ref: self,
                key,
                slot,
            }),
        }
    }

    /// Return the entry with the smallest key.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree
            .first(&self.nodes)
            .map(|idx| self.node_ref(idx, Node::key_value))
    }

    /// Return the entry with the largest key.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree
            .last(&self.nodes)
            .map(|idx| self.node_ref(idx, Node::key_value))
    }

    /// Remove and return the entry with the smallest key.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::RbMap;
    ///
    /// let mut map: RbMap<_, _> = [(2, 'b'), (1, 'a')].into_iter().collect();
    /// assert_eq!(map.pop_first(), Some((1, 'a')));
    /// assert_eq!(map.pop_first(), Some((2, 'b')));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node_idx = self.tree.first(&self.nodes)?;
        Some(self.remove_node(node_idx))
    }

    /// Remove and return the entry with the largest key.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node_idx = self.tree.last(&self.nodes)?;
        Some(self.remove_node(node_idx))
    }

    /// Get an iterator over the entries of the map, sorted by key.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, Ix> {
        Iter {
            map_ref: self,
            inner: self.tree.iter(&self.nodes),
            len: self.len(),
        }
    }

    /// Remove all elements from the map
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.tree.init();
    }

    /// Return the number of elements in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` if the map contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl<K, V> RbMap<K, V>
where
    K: Ord,
{
    /// Create an empty `RbMap`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            tree: RbTree::new(),
        }
    }
}

impl<K, V> Default for RbMap<K, V>
where
    K: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K, V, Ix> RbMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Search for the node with the given key, or the slot where it belongs
    fn search<Q>(&self, key: &Q) -> std::result::Result<NodeIndex<Ix>, Slot<Ix>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .find_slot(&self.nodes, |x| key.cmp(self.nodes[x.index()].key().borrow()))
    }

    /// Store a new node and link it at `slot`.
    pub(crate) fn push(&mut self, key: K, value: V, slot: Slot<Ix>) -> NodeIndex<Ix> {
        let node_idx = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != node_idx,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Node::new(key, value));
        self.tree.insert(&mut self.nodes, node_idx, slot);
        node_idx
    }

    /// Erase a node from the tree and drop it from storage.
    ///
    /// The last node is swapped into the freed position and its neighbours
    /// are pointed at the new index.
    pub(crate) fn remove_node(&mut self, node_idx: NodeIndex<Ix>) -> (K, V) {
        self.tree.erase(&mut self.nodes, node_idx);
        let node = self.nodes.swap_remove(node_idx.index());
        let moved = NodeIndex::new(self.nodes.len());
        if moved != node_idx {
            debug!("relocate node {:?} to {:?}", moved, node_idx);
            self.tree.relocate(&mut self.nodes, moved, node_idx);
        }
        (node.key, node.value)
    }
}

#[cfg(feature = "graphviz")]
impl<K, V, Ix> RbMap<K, V, Ix>
where
    K: Ord + Debug,
    V: Debug,
    Ix: IndexType,
{
    /// Writes the tree in DOT format to `filename`.
    ///
    /// # Errors
    ///
    /// Returns any error raised while creating or writing the file.
    pub fn draw(&self, filename: &str) -> Result<()> {
        self.draw_with(filename, |node| format!("{:?}: {:?}", node.key, node.value))
    }

    /// Writes the tree in DOT format to `filename`, labelling nodes with keys only.
    ///
    /// # Errors
    ///
    /// Returns any error raised while creating or writing the file.
    pub fn draw_without_value(&self, filename: &str) -> Result<()> {
        self.draw_with(filename, |node| format!("{:?}", node.key))
    }

    fn draw_with<F>(&self, filename: &str, label: F) -> Result<()>
    where
        F: Fn(&Node<K, V, Ix>) -> String,
    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(filename)?;
        debug!("draw {} nodes to {}", self.len(), filename);
        writeln!(file, "digraph {{")?;
        writeln!(file, "    node [style=filled, fontcolor=white];")?;
        for idx in self.tree.iter(&self.nodes) {
            let node = &self.nodes[idx.index()];
            let color = if node.link.is_red() { "red" } else { "black" };
            writeln!(
                file,
                "    n{} [label={:?}, fillcolor={}];",
                idx.index(),
                label(node),
                color
            )?;
            for child in [node.link.left(), node.link.right()].into_iter().flatten() {
                writeln!(file, "    n{} -> n{};", idx.index(), child.index())?;
            }
        }
        writeln!(file, "}}")
    }
}

// Convenient methods for reference or mutate a node
impl<'a, K, V, Ix> RbMap<K, V, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    pub(crate) fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }
}

impl<K, V, Ix> FromIterator<(K, V)> for RbMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RbMap::with_capacity(0);
        map.extend(iter);
        map
    }
}

impl<K, V, Ix> Extend<(K, V)> for RbMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let _ignore = self.insert(key, value);
        }
    }
}

impl<'a, K, V, Ix> IntoIterator for &'a RbMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Ix>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, Ix> IntoIterator for RbMap<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, Ix>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { map: self }
    }
}

/// An iterator over the entries of a `RbMap`.
#[derive(Debug)]
pub struct Iter<'a, K, V, Ix> {
    /// Reference to the map
    map_ref: &'a RbMap<K, V, Ix>,
    /// In-order node walk
    inner: NodeIter<'a, Vec<Node<K, V, Ix>>, Ix>,
    /// Entries not yet yielded
    len: usize,
}

impl<'a, K, V, Ix> Iterator for Iter<'a, K, V, Ix>
where
    Ix: IndexType,
{
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.inner.next()?;
        self.len -= 1;
        Some(self.map_ref.node_ref(x, Node::key_value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V, Ix> DoubleEndedIterator for Iter<'_, K, V, Ix>
where
    Ix: IndexType,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let x = self.inner.next_back()?;
        self.len -= 1;
        Some(self.map_ref.node_ref(x, Node::key_value))
    }
}

impl<K, V, Ix> ExactSizeIterator for Iter<'_, K, V, Ix> where Ix: IndexType {}

/// An owning iterator over the entries of a `RbMap`, sorted by key.
#[derive(Debug)]
pub struct IntoIter<K, V, Ix> {
    map: RbMap<K, V, Ix>,
}

impl<K, V, Ix> Iterator for IntoIter<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.map.pop_first()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len(), Some(self.map.len()))
    }
}

impl<K, V, Ix> DoubleEndedIterator for IntoIter<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.map.pop_last()
    }
}

impl<K, V, Ix> ExactSizeIterator for IntoIter<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
}
