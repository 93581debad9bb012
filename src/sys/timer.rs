//! Deadline queue for deferred work.
//!
//! Time is a [`Duration`] since the queue was created. The queue never reads
//! a clock itself; whoever drives it advances `now`, either from a real
//! runtime or from a script.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

/// Tasks scheduled for the same instant fire in the order they were added.
#[derive(Debug)]
pub struct Timers<T> {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Timers<T> {
    pub fn new() -> Self { Timers { now: Duration::ZERO, seq: 0, queue: BinaryHeap::new() } }

    pub fn now(&self) -> Duration { self.now }

    pub fn len(&self) -> usize { self.queue.len() }

    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    pub fn schedule(&mut self, delay: Duration, task: T) -> Duration {
        let due = self.now + delay;
        self.seq += 1;
        self.queue.push(Reverse(Entry { due, seq: self.seq, task }));
        due
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pops the earliest task due at or before `until`, moving `now` to its
    /// deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.due <= until => {}
            _ => return None,
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Moves `now` forward. Time never goes backwards.
    pub fn advance(&mut self, to: Duration) { self.now = self.now.max(to); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn fires_in_deadline_then_insertion_order() {
        let mut timers = Timers::new();
        timers.schedule(ms(100), "b");
        timers.schedule(ms(50), "a");
        timers.schedule(ms(100), "c");

        assert_eq!(timers.next_deadline(), Some(ms(50)));
        assert_eq!(timers.pop_due(ms(40)), None);
        assert_eq!(timers.pop_due(ms(1000)), Some("a"));
        assert_eq!(timers.now(), ms(50));
        assert_eq!(timers.pop_due(ms(1000)), Some("b"));
        assert_eq!(timers.pop_due(ms(1000)), Some("c"));
        assert_eq!(timers.now(), ms(100));
        assert!(timers.is_empty());
    }

    #[test]
    fn delays_are_relative_to_now() {
        let mut timers = Timers::new();
        timers.advance(ms(300));
        assert_eq!(timers.schedule(ms(100), ()), ms(400));
        timers.advance(ms(200));
        assert_eq!(timers.now(), ms(300));
    }
}
