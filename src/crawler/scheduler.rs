//! Concurrency limiting and completion tracking
//!
//! This module handles:
//! - A global cap on in-flight fetches via a semaphore
//! - Counting outstanding crawl tasks so the coordinator knows when the
//!   crawl has drained

use crate::CrawlerError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

/// Caps the number of simultaneously active fetches
#[derive(Debug, Clone)]
pub struct ConcurrencyGovernor {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held concurrency slot, released when dropped
#[derive(Debug)]
pub struct GovernorPermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGovernor {
    /// Creates a governor with `capacity` slots
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of concurrent holders, at least 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot
    ///
    /// # Returns
    ///
    /// * `Ok(GovernorPermit)` - The slot, held until the permit is dropped
    /// * `Err(CrawlerError::GovernorClosed)` - The governor was closed
    pub async fn acquire(&self) -> Result<GovernorPermit, CrawlerError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CrawlerError::GovernorClosed)?;

        Ok(GovernorPermit { _permit: permit })
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held
    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Rejects all pending and future acquisitions
    pub fn close(&self) {
        self.semaphore.close();
    }
}

/// Counts outstanding crawl tasks
///
/// A task is counted from the moment it is scheduled until its guard is
/// dropped. Children must be registered before their parent's guard is
/// released, so the count can only reach zero once no work remains.
#[derive(Debug, Default)]
pub struct WorkTracker {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Keeps one unit of work outstanding until dropped
#[derive(Debug)]
pub struct TaskGuard {
    tracker: Arc<WorkTracker>,
}

impl WorkTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one unit of outstanding work
    pub fn begin(self: &Arc<Self>) -> TaskGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            tracker: Arc::clone(self),
        }
    }

    fn finish(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.idle.notify_one();
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once the outstanding count reaches zero
    ///
    /// Returns immediately if no work was ever registered. Only one task
    /// should wait on a tracker at a time.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
