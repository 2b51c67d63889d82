//! Bounded fan-out helper.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use tokio::task::JoinError;
use tokio_util::task::AbortOnDropHandle;

/// Runs `f` over every item on the tokio runtime with at most `limit` tasks
/// in flight.
///
/// Each call is spawned as its own task, so on a multi-thread runtime items
/// execute in parallel. The returned vector is positionally stable: `out[i]`
/// is the output of `f(items[i])`, regardless of which task finished first.
/// `limit` is clamped to `1..=items.len()`; an empty input returns immediately.
///
/// Dropping the returned future aborts every task still running.
///
/// # Errors
///
/// Returns the [`JoinError`] of the first task (in input order) that panicked
/// or was aborted; the remaining tasks are aborted.
pub async fn run_bounded<I, T, F, Fut>(
    items: Vec<I>,
    limit: usize,
    mut f: F,
) -> Result<Vec<T>, JoinError>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let limit = limit.clamp(1, items.len());
    stream::iter(items)
        .map(|item| AbortOnDropHandle::new(tokio::spawn(f(item))))
        .buffered(limit)
        .try_collect()
        .await
}
