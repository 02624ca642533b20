//! The crawl frontier: a deduplicating work queue of URLs
//!
//! The frontier is the only shared mutable state between workers. One mutex
//! guards the pending queue, the discovered set, and the closed flag; a
//! [`Notify`] provides the condition-variable style wake/wait for blocking
//! [`pop`](Frontier::pop) without busy polling. The lock is never held across
//! an await point.

use std::collections::{HashSet, VecDeque};
use std::pin::pin;
use std::sync::Mutex;
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    /// URLs awaiting visit, in discovery order (FIFO, approximately breadth-first)
    pending: VecDeque<String>,

    /// Every URL ever accepted into `pending`; entries are never removed
    discovered: HashSet<String>,

    /// Set once by `finish()`, never reset
    closed: bool,
}

/// A thread-safe, deduplicating URL queue with explicit shutdown signaling
///
/// Invariant: `pending` is always a subset of `discovered`, and a URL enters
/// `pending` exactly when it is first inserted into `discovered`. The
/// membership test and the insert happen under the same lock, so two workers
/// pushing the same URL concurrently can never enqueue it twice.
pub struct Frontier {
    inner: Mutex<Inner>,
    wake: Notify,
}

impl Frontier {
    /// Creates an empty, open frontier
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            wake: Notify::new(),
        }
    }

    /// Offers a URL to the frontier
    ///
    /// Silently discarded when the frontier is closed or the URL was already
    /// discovered. A newly accepted URL wakes one blocked consumer; waking
    /// one is sufficient because every consumer re-checks the queue under the
    /// lock before sleeping again. Malformed URLs are not rejected here —
    /// validation is the caller's concern and a bad URL simply fails at fetch
    /// time.
    pub fn push(&self, url: impl Into<String>) {
        let url = url.into();
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed || inner.discovered.contains(&url) {
                return;
            }
            inner.discovered.insert(url.clone());
            inner.pending.push_back(url);
        }
        self.wake.notify_one();
    }

    /// Removes and returns the oldest pending URL, waiting for one if necessary
    ///
    /// Blocks until either a URL is available or the frontier has been
    /// closed. A closed frontier still hands out whatever is left in the
    /// queue; `None` is only returned once the frontier is both closed and
    /// drained, and from then on every call returns `None`. Each URL is
    /// delivered to exactly one caller.
    pub async fn pop(&self) -> Option<String> {
        loop {
            // Register interest in a wakeup before inspecting the queue.
            // A push or finish that lands after the enable but before the
            // await below will still wake this waiter.
            let mut notified = pin!(self.wake.notified());
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(url) = inner.pending.pop_front() {
                    return Some(url);
                }
                if inner.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Closes the frontier and wakes every blocked consumer
    ///
    /// Idempotent: calling it again has no additional effect. Pending URLs
    /// are not discarded; they remain poppable until drained.
    pub fn finish(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        self.wake.notify_waiters();
    }

    /// Snapshot of the number of pending URLs
    ///
    /// May be stale by the time the caller reads it; useful for progress
    /// reporting, not for control flow.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    /// Whether the pending queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `finish()` has been called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
