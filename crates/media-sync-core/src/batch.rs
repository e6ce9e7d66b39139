use futures::future::join_all;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Items whose work finished
    pub processed: usize,
    /// Cancellation was requested before the run finished, possibly inside the
    /// last batch
    pub cancelled: bool,
}

/// Drive `work` over `items` in fixed-size batches.
///
/// All items of a batch run concurrently; the next batch starts only once every
/// future of the previous one has completed. Cancellation is checked before each
/// batch and never interrupts a batch in flight. `work` receives the item's index
/// in `items`.
pub async fn run_in_batches<'a, T, F, Fut>(
    items: &'a [T],
    batch_limit: usize,
    cancel: &CancellationToken,
    mut work: F,
) -> BatchOutcome
where
    F: FnMut(usize, &'a T) -> Fut,
    Fut: Future<Output = ()>,
{
    let batch_limit = batch_limit.max(1);
    let mut processed = 0;

    for (batch_index, chunk) in items.chunks(batch_limit).enumerate() {
        if cancel.is_cancelled() {
            info!(processed, total = items.len(), "Cancellation requested, stopping before next batch");
            return BatchOutcome {
                processed,
                cancelled: true,
            };
        }

        let start = batch_index * batch_limit;
        debug!(batch = batch_index, start, size = chunk.len(), "Dispatching batch");
        let tasks: Vec<Fut> = chunk
            .iter()
            .enumerate()
            .map(|(offset, item)| work(start + offset, item))
            .collect();
        join_all(tasks).await;
        processed += chunk.len();
    }

    BatchOutcome {
        processed,
        cancelled: cancel.is_cancelled(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mark {
        Start(usize),
        End(usize),
    }

    async fn record_run(count: usize, batch_limit: usize) -> (BatchOutcome, Vec<Mark>) {
        let items: Vec<usize> = (0..count).collect();
        let log = Mutex::new(Vec::new());
        let cancel = CancellationToken::new();

        let log_ref = &log;
        let outcome = run_in_batches(&items, batch_limit, &cancel, move |index, item| async move {
            assert_eq!(index, *item);
            log_ref.lock().unwrap().push(Mark::Start(index));
            // Later items finish first so a missing barrier would show up as overlap
            tokio::time::sleep(Duration::from_millis((count - index) as u64 * 3)).await;
            log_ref.lock().unwrap().push(Mark::End(index));
        })
        .await;

        (outcome, log.into_inner().unwrap())
    }

    fn assert_barrier(log: &[Mark], count: usize, batch_limit: usize) {
        let position = |mark: Mark| log.iter().position(|m| *m == mark).unwrap();
        for item in 0..count {
            let batch_start = (item / batch_limit) * batch_limit;
            for earlier in 0..batch_start {
                assert!(
                    position(Mark::End(earlier)) < position(Mark::Start(item)),
                    "item {} started before item {} finished",
                    item,
                    earlier
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_do_not_overlap() {
        let (outcome, log) = record_run(6, 2).await;
        assert_eq!(outcome, BatchOutcome { processed: 6, cancelled: false });
        assert_barrier(&log, 6, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uneven_final_batch() {
        // 5 items in batches of 2: the last batch holds a single item
        let (outcome, log) = record_run(5, 2).await;
        assert_eq!(outcome.processed, 5);
        assert_eq!(log.len(), 10);
        assert_barrier(&log, 5, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_within_batch_run_concurrently() {
        let (_, log) = record_run(3, 3).await;
        // Every item starts before any of them finishes
        assert!(log[..3].iter().all(|m| matches!(m, Mark::Start(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_batch_limit_is_clamped() {
        let (outcome, log) = record_run(3, 0).await;
        assert_eq!(outcome.processed, 3);
        assert_barrier(&log, 3, 1);
    }

    #[tokio::test]
    async fn test_cancellation_between_batches() {
        let items: Vec<usize> = (0..5).collect();
        let cancel = CancellationToken::new();
        let seen = Mutex::new(Vec::new());

        let seen_ref = &seen;
        let cancel_ref = &cancel;
        let outcome = run_in_batches(&items, 2, &cancel, move |index, _| async move {
            seen_ref.lock().unwrap().push(index);
            if index == 1 {
                cancel_ref.cancel();
            }
        })
        .await;

        assert_eq!(outcome, BatchOutcome { processed: 2, cancelled: true });
        assert_eq!(seen.into_inner().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_cancellation_inside_final_batch_is_reported() {
        let items: Vec<usize> = (0..3).collect();
        let cancel = CancellationToken::new();

        let cancel_ref = &cancel;
        let outcome = run_in_batches(&items, 2, &cancel, move |index, _| async move {
            if index == 2 {
                cancel_ref.cancel();
            }
        })
        .await;

        assert_eq!(outcome, BatchOutcome { processed: 3, cancelled: true });
    }

    #[tokio::test]
    async fn test_empty_input() {
        let items: Vec<u32> = Vec::new();
        let outcome = run_in_batches(&items, 2, &CancellationToken::new(), |_, _| async {}).await;
        assert_eq!(outcome, BatchOutcome { processed: 0, cancelled: false });
    }
}
