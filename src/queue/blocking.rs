//! Blocking FIFO queue
//!
//! `BlockingQueue` pairs one `Mutex` with one `Condvar`. Every mutation
//! happens under the mutex; the only place a caller can be suspended is
//! `pop`, which releases the mutex while it waits and reacquires it before
//! returning.
//!
//! Items are moved in and moved out, so an item has exactly one owner at
//! any time: the producer before `push`, the queue in between, and the
//! consumer after `pop`. Anything still queued when the queue is dropped is
//! dropped with it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard};

pub struct BlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append `item` at the tail. Never blocks on anything but the lock.
    ///
    /// Wakes one blocked `pop` when the queue goes from empty to non-empty.
    pub fn push(&self, item: T) {
        let mut items = self.lock();
        let was_empty = items.is_empty();
        items.push_back(item);
        drop(items);

        if was_empty {
            self.available.notify_one();
        }
    }

    /// Remove and return the head, blocking while the queue is empty.
    pub fn pop(&self) -> T {
        let mut items = self.lock();
        loop {
            if let Some(item) = items.pop_front() {
                // A push onto an already non-empty queue does not notify, so
                // hand the wakeup on while items remain.
                if !items.is_empty() {
                    self.available.notify_one();
                }
                return item;
            }
            items = self
                .available
                .wait(items)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Remove and return the head without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-updated, so
    // poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("len", &self.len())
            .finish()
    }
}
