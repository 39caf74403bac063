//! Drains a batch of jobs by priority, lowest value first.

use rb_link_tree::PrioQueue;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Job {
    priority: u8,
    name: &'static str,
}

fn main() {
    let mut queue = PrioQueue::new();
    queue.extend([
        Job { priority: 2, name: "index" },
        Job { priority: 0, name: "wal-sync" },
        Job { priority: 5, name: "gc" },
        Job { priority: 2, name: "checkpoint" },
    ]);

    if let Some(job) = queue.peek() {
        println!("next up: {}", job.name);
    }
    while let Some(job) = queue.pop() {
        println!("{} {}", job.priority, job.name);
    }
    assert!(queue.is_empty());
}
