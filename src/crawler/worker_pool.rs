//! Fixed-size worker pool over an indexed work list
//!
//! Workers pull from a shared [`WorkQueue`]: each loop iteration claims the
//! next unclaimed index with a single atomic increment and processes it, so no
//! index is ever handed out twice and the pool drains without a lock.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

/// Shared cursor over `0..len`
#[derive(Debug)]
pub struct WorkQueue {
    next: AtomicUsize,
    len: usize,
}

impl WorkQueue {
    pub fn new(len: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            len,
        }
    }

    /// Claims the next index, or None once the list is exhausted
    pub fn claim(&self) -> Option<usize> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.len).then_some(index)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Runs `work` over every input with at most `concurrency` in flight
///
/// Completion order is arbitrary; the returned outputs are in input order.
///
/// # Errors
///
/// Returns the `JoinError` of the first worker task that panicked.
pub async fn run_pool<T, R, F, Fut>(
    inputs: Vec<T>,
    concurrency: usize,
    work: F,
) -> Result<Vec<R>, JoinError>
where
    T: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = inputs.len();
    let worker_count = concurrency.max(1).min(total.max(1));

    let inputs = Arc::new(inputs);
    let queue = Arc::new(WorkQueue::new(total));
    let work = Arc::new(work);
    let mut workers = JoinSet::new();

    for worker_id in 0..worker_count {
        let inputs = Arc::clone(&inputs);
        let queue = Arc::clone(&queue);
        let work = Arc::clone(&work);

        workers.spawn(async move {
            let mut done = Vec::new();
            while let Some(index) = queue.claim() {
                tracing::trace!("Worker {} claimed item {}", worker_id, index);
                let output = work(inputs[index].clone()).await;
                done.push((index, output));
            }
            done
        });
    }

    let mut indexed = Vec::with_capacity(total);
    while let Some(joined) = workers.join_next().await {
        indexed.extend(joined?);
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, output)| output).collect())
}
