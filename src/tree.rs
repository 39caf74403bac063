use std::cmp::Ordering;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::iter::{leftmost, rightmost, Iter};
use crate::node::{Arena, Color, Deficiency, Link, Side, Slot};

/// Handle of a red-black tree whose nodes live in caller-owned storage.
///
/// The handle only remembers the root. Every operation borrows the [`Arena`]
/// holding the nodes, and the tree never allocates, frees or moves a node.
/// Callers decide where a node belongs (see [`RbTree::find_slot`]) and the
/// tree keeps the red-black invariants:
///
/// 1. The root is black.
/// 2. A red node has no red child.
/// 3. Every path from a node down to an absent child has the same number of
///    black nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RbTree<Ix = DefaultIx> {
    /// Root of the tree
    pub(crate) root: Option<NodeIndex<Ix>>,
}

impl<Ix> RbTree<Ix> {
    /// Creates an empty tree.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        RbTree { root: None }
    }
}

impl<Ix> Default for RbTree<Ix> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Restructuring step chosen for one iteration of the insert walk.
#[derive(Debug, Clone, Copy)]
enum InsertCase<Ix> {
    /// The node is the root
    Root,
    /// The parent is black, nothing is violated
    BlackParent,
    /// The parent is a red root, which only painting fixes
    RedRoot { parent: NodeIndex<Ix> },
    /// Parent and uncle are red: push the red up by recoloring
    RedUncle {
        parent: NodeIndex<Ix>,
        uncle: NodeIndex<Ix>,
        grandparent: NodeIndex<Ix>,
    },
    /// Uncle is black or absent: rotate at the grandparent
    Restructure {
        parent: NodeIndex<Ix>,
        grandparent: NodeIndex<Ix>,
        parent_side: Side,
        inner: bool,
    },
}

/// Step chosen for one iteration of the erase walk, seen from the short side.
#[derive(Debug, Clone, Copy)]
enum EraseCase<Ix> {
    /// Sibling is red: rotate it up so the short side gets a black sibling
    RedSibling,
    /// Both nephews are black: paint the sibling red
    BlackNephews { sibling: NodeIndex<Ix> },
    /// Only the near nephew is red: rotate it to the far side
    NearNephew {
        sibling: NodeIndex<Ix>,
        near: NodeIndex<Ix>,
    },
    /// The far nephew is red: one rotation at the parent finishes
    FarNephew { far: NodeIndex<Ix> },
}

impl<Ix> RbTree<Ix>
where
    Ix: IndexType,
{
    /// Resets the handle to an empty tree.
    ///
    /// Nodes that were linked are left untouched and must be re-linked from
    /// scratch before they are used again.
    #[inline]
    pub fn init(&mut self) {
        self.root = None;
    }

    /// Return the root node, `None` for an empty tree.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<NodeIndex<Ix>> {
        self.root
    }

    /// Return `true` if the tree has no node attached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Descends from the root, letting `cmp` choose the direction at each node.
    ///
    /// `cmp(node)` reports how the wanted position compares to `node`:
    /// `Less` continues left, `Greater` continues right and `Equal` stops.
    /// Returns `Ok(node)` for the node where `cmp` returned `Equal`, otherwise
    /// the vacant [`Slot`] where a new node belongs.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::{Link, NodeIndex, RbTree, Slot};
    ///
    /// let mut nodes = vec![Link::<u32>::new(); 2];
    /// let keys = [10, 20];
    /// let mut tree = RbTree::<u32>::new();
    ///
    /// let slot = tree.find_slot(&nodes, |n| keys[0].cmp(&keys[n.index()])).unwrap_err();
    /// assert_eq!(slot, Slot::Root);
    /// tree.insert(&mut nodes, NodeIndex::new(0), slot);
    ///
    /// let slot = tree.find_slot(&nodes, |n| keys[1].cmp(&keys[n.index()])).unwrap_err();
    /// assert_eq!(slot, Slot::Right(NodeIndex::new(0)));
    /// ```
    #[inline]
    pub fn find_slot<A, F>(&self, arena: &A, mut cmp: F) -> Result<NodeIndex<Ix>, Slot<Ix>>
    where
        A: Arena<Ix> + ?Sized,
        F: FnMut(NodeIndex<Ix>) -> Ordering,
    {
        let mut slot = Slot::Root;
        let mut x = self.root;
        while let Some(cur) = x {
            match cmp(cur) {
                Ordering::Equal => return Ok(cur),
                Ordering::Less => {
                    slot = Slot::Left(cur);
                    x = arena.link(cur).left;
                }
                Ordering::Greater => {
                    slot = Slot::Right(cur);
                    x = arena.link(cur).right;
                }
            }
        }
        Err(slot)
    }

    /// Attaches `node` as a red leaf at the vacant `slot`.
    ///
    /// The tree may violate its invariants until
    /// [`rebalance_after_insert`](Self::rebalance_after_insert) runs for `node`.
    #[inline]
    pub fn link<A>(&mut self, arena: &mut A, node: NodeIndex<Ix>, slot: Slot<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        debug_assert!(self.is_vacant(arena, slot), "link target slot is occupied");
        *arena.link_mut(node) = Link {
            parent: slot.parent(),
            left: None,
            right: None,
            color: Color::Red,
        };
        match slot {
            Slot::Root => self.root = Some(node),
            Slot::Left(parent) => {
                node_mut(arena, parent, Link::set_child(Side::Left, Some(node)));
            }
            Slot::Right(parent) => {
                node_mut(arena, parent, Link::set_child(Side::Right, Some(node)));
            }
        }
    }

    /// Restores the invariants after `node` was [linked](Self::link).
    ///
    /// Walks upwards recoloring while the uncle is red and finishes with at
    /// most two rotations.
    pub fn rebalance_after_insert<A>(&mut self, arena: &mut A, node: NodeIndex<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        debug_assert!(
            node_ref(arena, node, Link::is_red),
            "rebalance_after_insert needs a freshly linked node"
        );
        let mut z = node;
        loop {
            match Self::insert_case(arena, z) {
                InsertCase::Root => {
                    trace!("insert fixup: {:?} is the root", z);
                    node_mut(arena, z, Link::set_color(Color::Black));
                    return;
                }
                InsertCase::BlackParent => return,
                InsertCase::RedRoot { parent } => {
                    trace!("insert fixup: red root {:?}", parent);
                    node_mut(arena, parent, Link::set_color(Color::Black));
                    return;
                }
                InsertCase::RedUncle {
                    parent,
                    uncle,
                    grandparent,
                } => {
                    trace!("insert fixup: red uncle {:?}, recolor {:?}", uncle, grandparent);
                    node_mut(arena, parent, Link::set_color(Color::Black));
                    node_mut(arena, uncle, Link::set_color(Color::Black));
                    node_mut(arena, grandparent, Link::set_color(Color::Red));
                    z = grandparent;
                }
                InsertCase::Restructure {
                    mut parent,
                    grandparent,
                    parent_side,
                    inner,
                } => {
                    if inner {
                        trace!("insert fixup: inner grandchild {:?}, rotate at {:?}", z, parent);
                        self.rotate(arena, parent, parent_side.opposite(), Color::Red, Color::Red);
                        parent = z;
                    }
                    trace!("insert fixup: rotate {:?} over {:?}", parent, grandparent);
                    self.rotate(arena, grandparent, parent_side, Color::Black, Color::Red);
                    return;
                }
            }
        }
    }

    /// Links `node` at `slot` and rebalances the tree.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::{Link, NodeIndex, RbTree, Slot};
    ///
    /// let mut nodes = vec![Link::<u32>::new(); 1];
    /// let mut tree = RbTree::<u32>::new();
    /// tree.insert(&mut nodes, NodeIndex::new(0), Slot::Root);
    /// assert!(!tree.is_empty());
    /// assert_eq!(tree.first(&nodes), Some(NodeIndex::new(0)));
    /// ```
    #[inline]
    pub fn insert<A>(&mut self, arena: &mut A, node: NodeIndex<Ix>, slot: Slot<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        self.link(arena, node, slot);
        self.rebalance_after_insert(arena, node);
    }

    /// Detaches `node` from the tree structure without rebalancing.
    ///
    /// Returns the position that lost a black node, which must be passed to
    /// [`rebalance_after_delete`](Self::rebalance_after_delete), or `None`
    /// when the invariants already hold. A node with two children is replaced
    /// by its in-order successor. The link of `node` is stale afterwards.
    pub fn unlink<A>(&mut self, arena: &mut A, node: NodeIndex<Ix>) -> Option<Deficiency<Ix>>
    where
        A: Arena<Ix> + ?Sized,
    {
        let Link {
            parent,
            left,
            right,
            color,
        } = *arena.link(node);
        match (left, right) {
            (None, None) => {
                let side = parent.map(|p| side_of(arena, p, node));
                self.replace_in_parent(arena, node, None, parent);
                if matches!(color, Color::Red) {
                    return None;
                }
                parent
                    .zip(side)
                    .map(|(parent, side)| Deficiency { parent, side })
            }
            (Some(child), None) | (None, Some(child)) => {
                debug_assert!(
                    node_ref(arena, child, Link::is_red),
                    "the only child of a node must be red"
                );
                node_mut(arena, child, |link| {
                    link.parent = parent;
                    link.color = Color::Black;
                });
                self.replace_in_parent(arena, node, Some(child), parent);
                None
            }
            (Some(left), Some(right)) => {
                let successor = leftmost(arena, right);
                let Link {
                    parent: successor_parent,
                    right: successor_right,
                    color: successor_color,
                    ..
                } = *arena.link(successor);
                let deficiency = match successor_parent {
                    Some(p) if p != node => Deficiency {
                        parent: p,
                        side: Side::Left,
                    },
                    _ => Deficiency {
                        parent: successor,
                        side: Side::Right,
                    },
                };

                if let Some(sr) = successor_right {
                    node_mut(arena, sr, Link::set_parent(successor_parent));
                }
                self.replace_in_parent(arena, successor, successor_right, successor_parent);

                // `node.right` changed above when the successor was its direct child
                let right = node_ref(arena, node, Link::right);
                node_mut(arena, successor, |link| {
                    link.parent = parent;
                    link.left = Some(left);
                    link.right = right;
                    link.color = color;
                });
                node_mut(arena, left, Link::set_parent(Some(successor)));
                if let Some(right) = right {
                    node_mut(arena, right, Link::set_parent(Some(successor)));
                }
                self.replace_in_parent(arena, node, Some(successor), parent);

                if let Some(sr) = successor_right {
                    debug_assert!(
                        node_ref(arena, sr, Link::is_red),
                        "the only child of a node must be red"
                    );
                    node_mut(arena, sr, Link::set_color(Color::Black));
                    return None;
                }
                match successor_color {
                    Color::Red => None,
                    Color::Black => Some(deficiency),
                }
            }
        }
    }

    /// Restores the invariants after [`unlink`](Self::unlink) reported a
    /// deficiency.
    ///
    /// Walks upwards while the deficiency can only be moved to the parent and
    /// finishes with at most three rotations.
    pub fn rebalance_after_delete<A>(&mut self, arena: &mut A, deficiency: Deficiency<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        let Deficiency {
            mut parent,
            mut side,
        } = deficiency;
        loop {
            let Some(case) = Self::erase_case(arena, parent, side) else {
                debug_assert!(false, "deficient subtree without a sibling");
                return;
            };
            match case {
                EraseCase::RedSibling => {
                    trace!("erase fixup: red sibling at {:?}", parent);
                    self.rotate(arena, parent, side.opposite(), Color::Black, Color::Red);
                }
                EraseCase::BlackNephews { sibling } => {
                    node_mut(arena, sibling, Link::set_color(Color::Red));
                    if node_ref(arena, parent, Link::is_red) {
                        trace!("erase fixup: red parent {:?} absorbs", parent);
                        node_mut(arena, parent, Link::set_color(Color::Black));
                        return;
                    }
                    let Some(grandparent) = node_ref(arena, parent, Link::parent) else {
                        trace!("erase fixup: reached the root {:?}", parent);
                        node_mut(arena, parent, Link::set_color(Color::Black));
                        return;
                    };
                    trace!("erase fixup: move deficiency up to {:?}", grandparent);
                    side = side_of(arena, grandparent, parent);
                    parent = grandparent;
                }
                EraseCase::NearNephew { sibling, near } => {
                    trace!("erase fixup: near nephew {:?}, rotate at {:?}", near, sibling);
                    self.rotate(arena, sibling, side, Color::Black, Color::Red);
                    self.finish_erase(arena, parent, side, sibling);
                    return;
                }
                EraseCase::FarNephew { far } => {
                    self.finish_erase(arena, parent, side, far);
                    return;
                }
            }
        }
    }

    /// Unlinks `node` and rebalances the tree when needed.
    ///
    /// # Example
    /// ```rust
    /// use rb_link_tree::{Link, NodeIndex, RbTree, Slot};
    ///
    /// let mut nodes = vec![Link::<u32>::new(); 1];
    /// let mut tree = RbTree::<u32>::new();
    /// tree.insert(&mut nodes, NodeIndex::new(0), Slot::Root);
    /// tree.erase(&mut nodes, NodeIndex::new(0));
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    pub fn erase<A>(&mut self, arena: &mut A, node: NodeIndex<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        if let Some(deficiency) = self.unlink(arena, node) {
            self.rebalance_after_delete(arena, deficiency);
        }
    }

    /// Return the leftmost node, `None` for an empty tree.
    #[inline]
    pub fn first<A>(&self, arena: &A) -> Option<NodeIndex<Ix>>
    where
        A: Arena<Ix> + ?Sized,
    {
        self.root.map(|root| leftmost(arena, root))
    }

    /// Return the rightmost node, `None` for an empty tree.
    #[inline]
    pub fn last<A>(&self, arena: &A) -> Option<NodeIndex<Ix>>
    where
        A: Arena<Ix> + ?Sized,
    {
        self.root.map(|root| rightmost(arena, root))
    }

    /// Get an iterator over the nodes of the tree, in order.
    #[inline]
    pub fn iter<'a, A>(&self, arena: &'a A) -> Iter<'a, A, Ix>
    where
        A: Arena<Ix> + ?Sized,
    {
        Iter::new(arena, self.first(arena), self.last(arena))
    }

    /// Rewrites the references to a node whose record moved in storage.
    ///
    /// Call after the link stored at `from` was moved to `to`, for example by
    /// `Vec::swap_remove`. The link at `to` must be the moved one.
    pub fn relocate<A>(&mut self, arena: &mut A, from: NodeIndex<Ix>, to: NodeIndex<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        if from == to {
            return;
        }
        let Link {
            parent,
            left,
            right,
            ..
        } = *arena.link(to);
        match parent {
            Some(parent) => {
                let side = side_of(arena, parent, from);
                node_mut(arena, parent, Link::set_child(side, Some(to)));
            }
            None => self.root = Some(to),
        }
        for child in [left, right].into_iter().flatten() {
            node_mut(arena, child, Link::set_parent(Some(to)));
        }
    }
}

impl<Ix> RbTree<Ix>
where
    Ix: IndexType,
{
    /// Check that `slot` does not hold a node.
    fn is_vacant<A>(&self, arena: &A, slot: Slot<Ix>) -> bool
    where
        A: Arena<Ix> + ?Sized,
    {
        match slot {
            Slot::Root => self.root.is_none(),
            Slot::Left(parent) => node_ref(arena, parent, Link::left).is_none(),
            Slot::Right(parent) => node_ref(arena, parent, Link::right).is_none(),
        }
    }

    /// Classify the red node `z` during the insert walk.
    fn insert_case<A>(arena: &A, z: NodeIndex<Ix>) -> InsertCase<Ix>
    where
        A: Arena<Ix> + ?Sized,
    {
        let Some(parent) = node_ref(arena, z, Link::parent) else {
            return InsertCase::Root;
        };
        if node_ref(arena, parent, Link::is_black) {
            return InsertCase::BlackParent;
        }
        let Some(grandparent) = node_ref(arena, parent, Link::parent) else {
            return InsertCase::RedRoot { parent };
        };
        let parent_side = side_of(arena, grandparent, parent);
        match node_ref(arena, grandparent, Link::child(parent_side.opposite())) {
            Some(uncle) if node_ref(arena, uncle, Link::is_red) => InsertCase::RedUncle {
                parent,
                uncle,
                grandparent,
            },
            _ => InsertCase::Restructure {
                parent,
                grandparent,
                parent_side,
                inner: side_of(arena, parent, z) != parent_side,
            },
        }
    }

    /// Classify the deficiency on `side` of `parent` during the erase walk.
    ///
    /// Returns `None` when the sibling is missing, which a valid tree never has.
    fn erase_case<A>(arena: &A, parent: NodeIndex<Ix>, side: Side) -> Option<EraseCase<Ix>>
    where
        A: Arena<Ix> + ?Sized,
    {
        let sibling = node_ref(arena, parent, Link::child(side.opposite()))?;
        if node_ref(arena, sibling, Link::is_red) {
            return Some(EraseCase::RedSibling);
        }
        let near = node_ref(arena, sibling, Link::child(side)).filter(|&n| is_red(arena, n));
        let far = node_ref(arena, sibling, Link::child(side.opposite())).filter(|&n| is_red(arena, n));
        Some(match (near, far) {
            (_, Some(far)) => EraseCase::FarNephew { far },
            (Some(near), None) => EraseCase::NearNephew { sibling, near },
            (None, None) => EraseCase::BlackNephews { sibling },
        })
    }

    /// Terminal erase step: the sibling on the far side of `side` has the red
    /// child `far` on its outer side.
    fn finish_erase<A>(&mut self, arena: &mut A, parent: NodeIndex<Ix>, side: Side, far: NodeIndex<Ix>)
    where
        A: Arena<Ix> + ?Sized,
    {
        trace!("erase fixup: far nephew {:?}, rotate at {:?}", far, parent);
        let parent_color = node_ref(arena, parent, Link::color);
        self.rotate(arena, parent, side.opposite(), parent_color, Color::Black);
        node_mut(arena, far, Link::set_color(Color::Black));
    }

    /// Lifts the child on `side` of `top` into the position of `top`.
    ///
    /// The lifted child is painted `raised` and `top` is painted `lowered`.
    fn rotate<A>(&mut self, arena: &mut A, top: NodeIndex<Ix>, side: Side, raised: Color, lowered: Color)
    where
        A: Arena<Ix> + ?Sized,
    {
        let Some(child) = node_ref(arena, top, Link::child(side)) else {
            debug_assert!(false, "rotation without a child to lift");
            return;
        };
        let inner = node_ref(arena, child, Link::child(side.opposite()));
        let top_parent = node_ref(arena, top, Link::parent);

        node_mut(arena, top, Link::set_child(side, inner));
        if let Some(inner) = inner {
            node_mut(arena, inner, Link::set_parent(Some(top)));
        }
        node_mut(arena, child, Link::set_child(side.opposite(), Some(top)));
        node_mut(arena, top, Link::set_parent(Some(child)));
        node_mut(arena, child, Link::set_parent(top_parent));
        self.replace_in_parent(arena, top, Some(child), top_parent);

        node_mut(arena, child, Link::set_color(raised));
        node_mut(arena, top, Link::set_color(lowered));
    }

    /// Points the child slot of `parent` that held `old` at `new`, or the root
    /// when `parent` is `None`.
    fn replace_in_parent<A>(
        &mut self,
        arena: &mut A,
        old: NodeIndex<Ix>,
        new: Option<NodeIndex<Ix>>,
        parent: Option<NodeIndex<Ix>>,
    ) where
        A: Arena<Ix> + ?Sized,
    {
        match parent {
            Some(parent) => {
                let side = side_of(arena, parent, old);
                node_mut(arena, parent, Link::set_child(side, new));
            }
            None => self.root = new,
        }
    }
}

/// Which side of `parent` holds `child`.
fn side_of<A, Ix>(arena: &A, parent: NodeIndex<Ix>, child: NodeIndex<Ix>) -> Side
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    if node_ref(arena, parent, Link::left) == Some(child) {
        Side::Left
    } else {
        Side::Right
    }
}

fn is_red<A, Ix>(arena: &A, node: NodeIndex<Ix>) -> bool
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
{
    node_ref(arena, node, Link::is_red)
}

// Convenient methods for reference or mutate a link
pub(crate) fn node_ref<A, Ix, F, R>(arena: &A, node: NodeIndex<Ix>, op: F) -> R
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
    F: FnOnce(&Link<Ix>) -> R,
{
    op(arena.link(node))
}

pub(crate) fn node_mut<A, Ix, F, R>(arena: &mut A, node: NodeIndex<Ix>, op: F) -> R
where
    A: Arena<Ix> + ?Sized,
    Ix: IndexType,
    F: FnOnce(&mut Link<Ix>) -> R,
{
    op(arena.link_mut(node))
}
