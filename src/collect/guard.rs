// src/collect/guard.rs
//! Timeout guard for source calls.
//!
//! The guarded call runs as a detached tokio task. When the budget expires we stop
//! waiting and report `SourceFailure::Timeout`; the task itself is left to finish
//! and its late result is dropped. Adapters bound that tail with their own HTTP
//! client timeouts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::collect::types::{SourceAdapter, SourceFailure, SourceResult};
use crate::keyword::Keyword;

pub const DEFAULT_SOURCE_BUDGET: Duration = Duration::from_secs(8);

pub async fn with_timeout<T, F>(source: &'static str, budget: Duration, fut: F) -> SourceResult<T>
where
    T: Send + 'static,
    F: Future<Output = SourceResult<T>> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => {
            tracing::error!(target: "collect", source, error = %join_err, "adapter task aborted");
            SourceResult::Failure(SourceFailure::Aborted(join_err.to_string()))
        }
        // JoinHandle dropped here: the task keeps running detached.
        Err(_) => SourceResult::Failure(SourceFailure::Timeout { budget }),
    }
}

/// Run `adapter.fetch(keyword)` under `budget`.
pub async fn guard_adapter<T>(
    adapter: Arc<dyn SourceAdapter<Output = T>>,
    keyword: Keyword,
    budget: Duration,
) -> SourceResult<T>
where
    T: Send + 'static,
{
    let name = adapter.name();
    with_timeout(name, budget, async move { adapter.fetch(&keyword).await }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fast_call_passes_through() {
        let out = with_timeout("fast", Duration::from_secs(8), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            SourceResult::Success(7u32)
        })
        .await;
        assert_eq!(out, SourceResult::Success(7));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out_but_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let out: SourceResult<u32> = with_timeout("slow", Duration::from_secs(8), async move {
            tokio::time::sleep(Duration::from_secs(20)).await;
            flag.store(true, Ordering::SeqCst);
            SourceResult::Success(1)
        })
        .await;

        let failure = out.failure().cloned().expect("must fail");
        assert!(failure.is_timeout());
        assert_eq!(failure.kind(), "timeout");
        assert!(!finished.load(Ordering::SeqCst));

        // The detached task is not cancelled by the guard.
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn panicking_adapter_is_reported_as_aborted() {
        let trip = std::hint::black_box(true);
        let out: SourceResult<u32> = with_timeout("boom", Duration::from_secs(1), async move {
            if trip {
                panic!("adapter bug");
            }
            SourceResult::Success(0)
        })
        .await;
        assert!(matches!(
            out,
            SourceResult::Failure(SourceFailure::Aborted(_))
        ));
    }
}
