#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::{DefaultIx, IndexType, NodeIndex};

/// Link record of a tree node.
///
/// A `Link` is embedded in a caller-defined entry. The tree only ever reads
/// and writes these fields; the payload around it is never touched.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<Ix = DefaultIx> {
    /// Parent, never owned
    pub(crate) parent: Option<NodeIndex<Ix>>,
    /// Left children
    pub(crate) left: Option<NodeIndex<Ix>>,
    /// Right children
    pub(crate) right: Option<NodeIndex<Ix>>,
    /// Color of the node
    pub(crate) color: Color,
}

impl<Ix> Link<Ix> {
    /// Creates a detached link.
    ///
    /// The fields carry no meaning until the node is linked into a tree.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Link {
            parent: None,
            left: None,
            right: None,
            color: Color::Black,
        }
    }
}

impl<Ix> Default for Link<Ix> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// Convenient getter/setter methods
impl<Ix> Link<Ix>
where
    Ix: IndexType,
{
    pub fn parent(&self) -> Option<NodeIndex<Ix>> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeIndex<Ix>> {
        self.left
    }

    pub fn right(&self) -> Option<NodeIndex<Ix>> {
        self.right
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_black(&self) -> bool {
        matches!(self.color, Color::Black)
    }

    pub fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    pub(crate) fn child(side: Side) -> impl FnOnce(&Link<Ix>) -> Option<NodeIndex<Ix>> {
        move |link: &Link<Ix>| match side {
            Side::Left => link.left,
            Side::Right => link.right,
        }
    }

    pub(crate) fn set_color(color: Color) -> impl FnOnce(&mut Link<Ix>) {
        move |link: &mut Link<Ix>| {
            link.color = color;
        }
    }

    pub(crate) fn set_parent(parent: Option<NodeIndex<Ix>>) -> impl FnOnce(&mut Link<Ix>) {
        move |link: &mut Link<Ix>| {
            link.parent = parent;
        }
    }

    pub(crate) fn set_child(
        side: Side,
        child: Option<NodeIndex<Ix>>,
    ) -> impl FnOnce(&mut Link<Ix>) {
        move |link: &mut Link<Ix>| match side {
            Side::Left => link.left = child,
            Side::Right => link.right = child,
        }
    }
}

/// The color of the node
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node
    Red,
    /// Black node
    Black,
}

/// Which child position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Smaller-key child
    Left,
    /// Larger-key child
    Right,
}

impl Side {
    /// The other child position.
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An absent child position where a new node can be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot<Ix = DefaultIx> {
    /// The root of an empty tree
    Root,
    /// Left child of the given parent
    Left(NodeIndex<Ix>),
    /// Right child of the given parent
    Right(NodeIndex<Ix>),
}

impl<Ix: IndexType> Slot<Ix> {
    /// Creates the slot on `side` of `parent`.
    #[inline]
    #[must_use]
    pub fn child_of(parent: NodeIndex<Ix>, side: Side) -> Self {
        match side {
            Side::Left => Slot::Left(parent),
            Side::Right => Slot::Right(parent),
        }
    }

    /// The parent the slot belongs to, `None` for the root slot.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex<Ix>> {
        match *self {
            Slot::Root => None,
            Slot::Left(parent) | Slot::Right(parent) => Some(parent),
        }
    }
}

/// Position that lost one black node after an unlink.
///
/// The subtree on `side` of `parent` has a black height one less than its
/// sibling subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deficiency<Ix = DefaultIx> {
    pub(crate) parent: NodeIndex<Ix>,
    pub(crate) side: Side,
}

impl<Ix: IndexType> Deficiency<Ix> {
    /// The node whose child subtree is short.
    #[inline]
    pub fn parent(&self) -> NodeIndex<Ix> {
        self.parent
    }

    /// The short side of `parent`.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }
}

/// An entry type that embeds a tree [`Link`].
pub trait Linked<Ix = DefaultIx> {
    /// Shared access to the embedded link.
    fn link(&self) -> &Link<Ix>;
    /// Mutable access to the embedded link.
    fn link_mut(&mut self) -> &mut Link<Ix>;
}

impl<Ix> Linked<Ix> for Link<Ix> {
    #[inline]
    fn link(&self) -> &Link<Ix> {
        self
    }

    #[inline]
    fn link_mut(&mut self) -> &mut Link<Ix> {
        self
    }
}

/// Caller-owned node storage addressed by [`NodeIndex`].
///
/// Every slice or vector of [`Linked`] entries is an arena. Indexing out of
/// bounds panics, as any slice access would.
pub trait Arena<Ix: IndexType = DefaultIx> {
    /// The link of `node`.
    fn link(&self, node: NodeIndex<Ix>) -> &Link<Ix>;
    /// The mutable link of `node`.
    fn link_mut(&mut self, node: NodeIndex<Ix>) -> &mut Link<Ix>;
}

impl<E, Ix> Arena<Ix> for [E]
where
    E: Linked<Ix>,
    Ix: IndexType,
{
    #[inline]
    fn link(&self, node: NodeIndex<Ix>) -> &Link<Ix> {
        self[node.index()].link()
    }

    #[inline]
    fn link_mut(&mut self, node: NodeIndex<Ix>) -> &mut Link<Ix> {
        self[node.index()].link_mut()
    }
}

impl<E, Ix> Arena<Ix> for Vec<E>
where
    E: Linked<Ix>,
    Ix: IndexType,
{
    #[inline]
    fn link(&self, node: NodeIndex<Ix>) -> &Link<Ix> {
        self[node.index()].link()
    }

    #[inline]
    fn link_mut(&mut self, node: NodeIndex<Ix>) -> &mut Link<Ix> {
        self[node.index()].link_mut()
    }
}

/// Entry of the containers shipped with this crate: a link plus its payload.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V, Ix> {
    /// Tree link
    pub(crate) link: Link<Ix>,
    /// Key of the node
    pub(crate) key: K,
    /// Value of the node
    pub(crate) value: V,
}

impl<K, V, Ix> Node<K, V, Ix> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Node {
            link: Link::new(),
            key,
            value,
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn key_value(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    pub(crate) fn set_value(value: V) -> impl FnOnce(&mut Node<K, V, Ix>) -> V {
        move |node: &mut Node<K, V, Ix>| std::mem::replace(&mut node.value, value)
    }
}

impl<K, V, Ix> Linked<Ix> for Node<K, V, Ix> {
    #[inline]
    fn link(&self) -> &Link<Ix> {
        &self.link
    }

    #[inline]
    fn link_mut(&mut self) -> &mut Link<Ix> {
        &mut self.link
    }
}
