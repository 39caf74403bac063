//! Timers ordered by deadline, with the tree link embedded in each timer.
//!
//! Cancelled timers are erased from the tree but keep their storage, so the
//! handles of the remaining timers never change.

use std::cmp::Ordering;

use rb_link_tree::{next, Link, Linked, NodeIndex, RbTree};

struct Timer {
    link: Link,
    deadline: u64,
    name: &'static str,
    armed: bool,
}

impl Linked for Timer {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

struct TimerQueue {
    timers: Vec<Timer>,
    tree: RbTree,
}

impl TimerQueue {
    fn new() -> Self {
        TimerQueue {
            timers: Vec::new(),
            tree: RbTree::new(),
        }
    }

    /// Timers with the same deadline fire in arming order.
    fn arm(&mut self, deadline: u64, name: &'static str) -> NodeIndex {
        let timers = &self.timers;
        let found = self.tree.find_slot(timers, |n| {
            match deadline.cmp(&timers[n.index()].deadline) {
                Ordering::Less => Ordering::Less,
                _ => Ordering::Greater,
            }
        });
        let Err(slot) = found else {
            unreachable!("ties always descend right");
        };
        let handle = NodeIndex::new(self.timers.len());
        self.timers.push(Timer {
            link: Link::new(),
            deadline,
            name,
            armed: true,
        });
        self.tree.insert(&mut self.timers, handle, slot);
        handle
    }

    fn cancel(&mut self, handle: NodeIndex) {
        let timer = &mut self.timers[handle.index()];
        if timer.armed {
            timer.armed = false;
            self.tree.erase(&mut self.timers, handle);
        }
    }

    fn expired(&self, now: u64) -> impl Iterator<Item = &Timer> + '_ {
        std::iter::successors(self.tree.first(&self.timers), move |&n| next(&self.timers, n))
            .map(move |n| &self.timers[n.index()])
            .take_while(move |timer| timer.deadline <= now)
    }
}

fn main() {
    let mut queue = TimerQueue::new();
    queue.arm(30, "flush");
    let heartbeat = queue.arm(10, "heartbeat");
    queue.arm(20, "compact");
    queue.arm(10, "lease");
    queue.arm(50, "snapshot");

    queue.cancel(heartbeat);

    for timer in queue.expired(30) {
        println!("{:>4} {}", timer.deadline, timer.name);
    }
}
