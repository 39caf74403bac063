use std::fmt;
use std::iter::FusedIterator;

use crate::index::{IndexType, NodeIndex};
use crate::node::{Arena, Link};
use crate::tree::node_ref;

/// Follows left children down from `x`.
pub(crate) fn leftmost<A, Ix>(arena: &A, mut x: NodeIndex<Ix>) -> NodeIndex<Ix>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    while let Some(left) = node_ref(arena, x, Link::left) {
        x = left;
    }
    x
}

/// Follows right children down from `x`.
pub(crate) fn rightmost<A, Ix>(arena: &A, mut x: NodeIndex<Ix>) -> NodeIndex<Ix>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    while let Some(right) = node_ref(arena, x, Link::right) {
        x = right;
    }
    x
}

/// Find the in-order successor of `node`.
///
/// Return `None` when `node` is the last node of its tree.
pub fn next<A, Ix>(arena: &A, node: NodeIndex<Ix>) -> Option<NodeIndex<Ix>>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    if let Some(right) = node_ref(arena, node, Link::right) {
        return Some(leftmost(arena, right));
    }
    // climb until we arrive from a left child
    let mut x = node;
    let mut parent = node_ref(arena, x, Link::parent);
    while let Some(p) = parent {
        if node_ref(arena, p, Link::right) != Some(x) {
            break;
        }
        x = p;
        parent = node_ref(arena, x, Link::parent);
    }
    parent
}

/// Find the in-order predecessor of `node`.
///
/// Return `None` when `node` is the first node of its tree.
pub fn prev<A, Ix>(arena: &A, node: NodeIndex<Ix>) -> Option<NodeIndex<Ix>>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    if let Some(left) = node_ref(arena, node, Link::left) {
        return Some(rightmost(arena, left));
    }
    let mut x = node;
    let mut parent = node_ref(arena, x, Link::parent);
    while let Some(p) = parent {
        if node_ref(arena, p, Link::left) != Some(x) {
            break;
        }
        x = p;
        parent = node_ref(arena, x, Link::parent);
    }
    parent
}

/// An in-order iterator over the nodes of an `RbTree`.
///
/// Created by [`RbTree::iter`](crate::RbTree::iter). The arena is borrowed for
/// the lifetime of the iterator, so the tree cannot change underneath it.
pub struct Iter<'a, A: ?Sized, Ix> {
    /// Node storage
    arena: &'a A,
    /// Next node from the front
    front: Option<NodeIndex<Ix>>,
    /// Next node from the back
    back: Option<NodeIndex<Ix>>,
}

impl<'a, A, Ix> Iter<'a, A, Ix>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    pub(crate) fn new(
        arena: &'a A,
        front: Option<NodeIndex<Ix>>,
        back: Option<NodeIndex<Ix>>,
    ) -> Self {
        Iter { arena, front, back }
    }
}

impl<A: ?Sized, Ix: Copy> Clone for Iter<'_, A, Ix> {
    fn clone(&self) -> Self {
        Iter {
            arena: self.arena,
            front: self.front,
            back: self.back,
        }
    }
}

impl<A: ?Sized, Ix: fmt::Debug> fmt::Debug for Iter<'_, A, Ix> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

impl<A, Ix> Iterator for Iter<'_, A, Ix>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    type Item = NodeIndex<Ix>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.front?;
        if self.back == Some(x) {
            self.front = None;
            self.back = None;
        } else {
            self.front = next(self.arena, x);
        }
        Some(x)
    }
}

impl<A, Ix> DoubleEndedIterator for Iter<'_, A, Ix>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let x = self.back?;
        if self.front == Some(x) {
            self.front = None;
            self.back = None;
        } else {
            self.back = prev(self.arena, x);
        }
        Some(x)
    }
}

impl<A, Ix> FusedIterator for Iter<'_, A, Ix>
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
}
