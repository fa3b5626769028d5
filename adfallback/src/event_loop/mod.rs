//! Virtual-clock event loop.
//!
//! The loader runs on the host page's single-threaded event loop and only
//! suspends at timers. Each timer callback is modeled as a [`Task`] scheduled
//! at a deadline on a virtual clock, so a session can be driven
//! deterministically: tests advance time explicitly, the CLI can sleep
//! between deadlines to replay a session in real time.
//!
//! Tasks with the same deadline run in the order they were scheduled.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

/// A scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Task {
    /// First attempt to reach the primary entry point.
    LoadPrimary,
    /// Subsequent poll of the primary entry point.
    RetryPrimary,
    /// Grace period elapsed; inspect the primary container.
    CheckRender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
}

/// Timed task queue over a virtual clock.
#[derive(Debug, Default)]
pub struct EventLoop {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the loop was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to run `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: Task) {
        let scheduled = Scheduled {
            due: self.now + delay,
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.queue.push(Reverse(scheduled));
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(s)| s.due)
    }

    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        match self.queue.peek() {
            Some(Reverse(s)) if s.due <= until => {}
            _ => return None,
        }
        let Reverse(scheduled) = self.queue.pop()?;
        self.now = self.now.max(scheduled.due);
        Some(scheduled.task)
    }

    /// Move the clock forward without running anything.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
