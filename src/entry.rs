use crate::index::{IndexType, NodeIndex};
use crate::map::RbMap;
use crate::node::{Node, Slot};

/// A view into a single entry in a map, which may either be vacant or occupied.
#[derive(Debug)]
pub enum Entry<'a, K, V, Ix>
where
    K: Ord,
{
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, Ix>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, Ix>),
}

/// A view into an occupied entry in a `RbMap`.
/// It is part of the [`Entry`] enum.
#[derive(Debug)]
pub struct OccupiedEntry<'a, K, V, Ix>
where
    K: Ord,
{
    /// Reference to the map
    pub(crate) map_ref: &'a mut RbMap<K, V, Ix>,
    /// The entry node
    pub(crate) node_idx: NodeIndex<Ix>,
}

/// A view into a vacant entry in a `RbMap`.
/// It is part of the [`Entry`] enum.
#[derive(Debug)]
pub struct VacantEntry<'a, K, V, Ix>
where
    K: Ord,
{
    /// Mutable reference to the map
    pub(crate) map_ref: &'a mut RbMap<K, V, Ix>,
    /// The key of this entry
    pub(crate) key: K,
    /// Where the key belongs in the tree
    pub(crate) slot: Slot<Ix>,
}

impl<'a, K, V, Ix> Entry<'a, K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Ensures a value is in the entry by inserting the default if empty, and returns
    /// a mutable reference to the value in the entry.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::{Entry, RbMap};
    ///
    /// let mut map = RbMap::new();
    /// assert!(matches!(map.entry(1), Entry::Vacant(_)));
    /// map.entry(1).or_insert(3);
    /// assert!(matches!(map.entry(1), Entry::Occupied(_)));
    /// assert_eq!(map.get(&1), Some(&3));
    /// ```
    #[inline]
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of `default` if
    /// empty, and returns a mutable reference to the value in the entry.
    #[inline]
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::{Entry, RbMap};
    ///
    /// let mut map = RbMap::new();
    ///
    /// map.insert(6, 3);
    /// assert!(matches!(map.entry(6), Entry::Occupied(_)));
    /// map.entry(6).and_modify(|v| *v += 1);
    /// assert_eq!(map.get(&6), Some(&4));
    /// ```
    #[inline]
    #[must_use]
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(entry) => {
                f(entry.map_ref.node_mut(entry.node_idx, Node::value_mut));
                Self::Occupied(entry)
            }
            Entry::Vacant(entry) => Self::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    #[inline]
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, Ix> OccupiedEntry<'a, K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Returns a reference to the key of the entry.
    #[inline]
    pub fn key(&self) -> &K {
        self.map_ref.node_ref(self.node_idx, Node::key)
    }

    /// Returns a reference to the value of the entry.
    #[inline]
    pub fn get(&self) -> &V {
        self.map_ref.node_ref(self.node_idx, Node::value)
    }

    /// Returns a mutable reference to the value of the entry.
    #[inline]
    pub fn get_mut(&mut self) -> &mut V {
        self.map_ref.node_mut(self.node_idx, Node::value_mut)
    }

    /// Converts the entry into a mutable reference bound to the map.
    #[inline]
    pub fn into_mut(self) -> &'a mut V {
        self.map_ref.node_mut(self.node_idx, Node::value_mut)
    }

    /// Sets the value of the entry and returns the old value.
    #[inline]
    pub fn insert(&mut self, value: V) -> V {
        self.map_ref.node_mut(self.node_idx, Node::set_value(value))
    }

    /// Takes the entry out of the map and returns its value.
    #[inline]
    pub fn remove(self) -> V {
        self.map_ref.remove_node(self.node_idx).1
    }
}

impl<'a, K, V, Ix> VacantEntry<'a, K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Returns a reference to the key that would be used when inserting.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Sets the value of the entry and returns a mutable reference to it.
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for its index
    #[inline]
    pub fn insert(self, value: V) -> &'a mut V {
        let node_idx = self.map_ref.push(self.key, value, self.slot);
        self.map_ref.node_mut(node_idx, Node::value_mut)
    }
}
