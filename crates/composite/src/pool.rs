//! Bounded concurrency for upstream calls.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::{CompositeError, Result};

/// Bounded pool shared by all upstream calls.
///
/// At most `size` calls run at once and at most `queue_depth` more may wait
/// for a slot. A call arriving when both are exhausted is rejected
/// immediately with [`CompositeError::Unexpected`] instead of blocking the
/// request.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: Arc<Semaphore>,
    admission: Arc<Semaphore>,
}

impl WorkerPool {
    /// Creates a pool; both limits are clamped to what a semaphore can hold.
    pub fn new(size: usize, queue_depth: usize) -> Self {
        let size = size.clamp(1, Semaphore::MAX_PERMITS);
        let admitted = size.saturating_add(queue_depth).min(Semaphore::MAX_PERMITS);
        Self {
            workers: Arc::new(Semaphore::new(size)),
            admission: Arc::new(Semaphore::new(admitted)),
        }
    }

    /// Runs `call` once a worker is free.
    pub async fn run<F, T>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _admitted = self.admission.try_acquire().map_err(|_| {
            metrics::counter!("upstream_pool_rejections_total").increment(1);
            CompositeError::Unexpected("upstream worker queue is full".to_string())
        })?;
        let _worker = self
            .workers
            .acquire()
            .await
            .map_err(|_| CompositeError::Unexpected("upstream worker pool is closed".to_string()))?;

        call.await
    }

    /// Workers not currently running a call.
    pub fn idle_workers(&self) -> usize {
        self.workers.available_permits()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(10, 100)
    }
}
