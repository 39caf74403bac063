//! `rb_link_tree` is a red-black tree whose nodes live in storage owned by the caller.
//!
//! The tree handle [`RbTree`] only remembers its root. Nodes are [`Link`] records
//! embedded in the caller's own entries and addressed by [`NodeIndex`], so the index
//! of a node is also the handle of the entry around it. The tree never allocates,
//! never compares keys and never moves an entry: callers locate the slot for a new
//! node (see [`RbTree::find_slot`]) and the tree keeps itself balanced, so that every
//! insert and erase takes O(logN) time.
//!
//! Using indices instead of pointers for the parent-child references keeps the tree
//! free of `unsafe` code and lets containers built on it stay `Send` and `Unpin`.
//! [`RbMap`] and [`PrioQueue`] are two such containers.
//!
//! # Example
//!
//! ```rust
//! use rb_link_tree::{next, Link, Linked, NodeIndex, RbTree};
//!
//! struct Task {
//!     link: Link,
//!     deadline: u64,
//! }
//!
//! impl Linked for Task {
//!     fn link(&self) -> &Link {
//!         &self.link
//!     }
//!     fn link_mut(&mut self) -> &mut Link {
//!         &mut self.link
//!     }
//! }
//!
//! let mut tasks: Vec<Task> = [30, 10, 20]
//!     .into_iter()
//!     .map(|deadline| Task { link: Link::new(), deadline })
//!     .collect();
//! let mut tree: RbTree = RbTree::new();
//! for i in 0..tasks.len() {
//!     let deadline = tasks[i].deadline;
//!     let slot = tree
//!         .find_slot(&tasks, |n| deadline.cmp(&tasks[n.index()].deadline))
//!         .unwrap_err();
//!     tree.insert(&mut tasks, NodeIndex::new(i), slot);
//! }
//!
//! let first = tree.first(&tasks).unwrap();
//! assert_eq!(tasks[first.index()].deadline, 10);
//! let second = next(&tasks, first).unwrap();
//! assert_eq!(tasks[second.index()].deadline, 20);
//! ```
//!

mod entry;
mod index;
mod iter;
mod map;
mod node;
mod prioqueue;
mod tree;

#[cfg(test)]
mod tests;

pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use index::{DefaultIx, IndexType, NodeIndex};
pub use iter::{next, prev, Iter as NodeIter};
pub use map::{IntoIter, Iter, RbMap};
pub use node::{Arena, Color, Deficiency, Link, Linked, Side, Slot};
pub use prioqueue::PrioQueue;
pub use tree::RbTree;
