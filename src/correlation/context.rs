//! Correlation context store.
//!
//! Holds the correlation ID for the request currently executing. Async code
//! sees it through a task-local scoped around the request future; blocking
//! code launched through [`spawn_blocking`] sees it through a thread-local
//! guard that is cleared as soon as the closure returns.
//!
//! # Design Decisions
//! - Written once, at scope entry; there is no setter
//! - Leaving the scope (completion, error, panic or drop) removes the value
//! - Never a process-wide global

use std::cell::RefCell;
use std::future::Future;

use tokio::task::JoinHandle;

use crate::correlation::id::CorrelationId;

tokio::task_local! {
    static CORRELATION_ID: CorrelationId;
}

thread_local! {
    static BLOCKING_CORRELATION_ID: RefCell<Option<CorrelationId>> = const { RefCell::new(None) };
}

/// Run `fut` with `id` as the current correlation ID.
pub async fn scope<F>(id: CorrelationId, fut: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(id, fut).await
}

/// Run the synchronous closure `f` with `id` as the current correlation ID.
pub fn sync_scope<F, R>(id: CorrelationId, f: F) -> R
where
    F: FnOnce() -> R,
{
    CORRELATION_ID.sync_scope(id, f)
}

/// The correlation ID of the request currently executing, if any.
pub fn current() -> Option<CorrelationId> {
    if let Ok(id) = CORRELATION_ID.try_with(Clone::clone) {
        return Some(id);
    }

    BLOCKING_CORRELATION_ID.with(|slot| slot.borrow().clone())
}

/// Restores the previous thread-local value on drop.
#[must_use = "the correlation id is cleared when the guard is dropped"]
pub struct ContextGuard {
    previous: Option<CorrelationId>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        BLOCKING_CORRELATION_ID.with(|slot| {
            *slot.borrow_mut() = previous;
        });
    }
}

/// Make `id` current on this thread until the returned guard is dropped.
///
/// Meant for synchronous code that is not running inside a request future.
pub fn enter(id: CorrelationId) -> ContextGuard {
    let previous = BLOCKING_CORRELATION_ID.with(|slot| slot.borrow_mut().replace(id));
    ContextGuard { previous }
}

/// Run blocking work on Tokio's blocking pool with the caller's correlation ID.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let id = current();
    tokio::task::spawn_blocking(move || match id {
        Some(id) => {
            let _guard = enter(id);
            f()
        }
        None => f(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> CorrelationId {
        CorrelationId::from(value)
    }

    #[tokio::test]
    async fn test_scope_is_visible_across_await() {
        let observed = scope(id("async-test"), async {
            tokio::task::yield_now().await;
            current()
        })
        .await;

        assert_eq!(observed, Some(id("async-test")));
        assert_eq!(current(), None);
    }

    #[tokio::test]
    async fn test_scope_is_cleared_after_error() {
        let result: Result<(), &str> = scope(id("failing"), async { Err("boom") }).await;

        assert_eq!(result, Err("boom"));
        assert_eq!(current(), None);
    }

    #[tokio::test]
    async fn test_dropped_scope_leaves_nothing_behind() {
        let pending = scope(id("cancelled"), std::future::pending::<()>());
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;

        assert!(timed_out.is_err());
        assert_eq!(current(), None);
    }

    #[tokio::test]
    async fn test_scope_is_cleared_after_panic() {
        use futures_util::FutureExt;
        use std::panic::AssertUnwindSafe;

        let outcome = AssertUnwindSafe(scope(id("panicking"), async {
            tokio::task::yield_now().await;
            panic!("handler panicked");
        }))
        .catch_unwind()
        .await;

        assert!(outcome.is_err());
        assert_eq!(current(), None);
    }

    #[test]
    fn test_sync_scope_and_guard_are_cleared_after_panic() {
        let outcome = std::panic::catch_unwind(|| {
            sync_scope(id("sync-panicking"), || panic!("handler panicked"))
        });
        assert!(outcome.is_err());
        assert_eq!(current(), None);

        let outcome = std::panic::catch_unwind(|| {
            let _guard = enter(id("blocking-panicking"));
            panic!("blocking work panicked");
        });
        assert!(outcome.is_err());
        assert_eq!(current(), None);
    }

    #[test]
    fn test_sync_scope() {
        assert_eq!(sync_scope(id("sync"), current), Some(id("sync")));
        assert_eq!(current(), None);
    }

    #[test]
    fn test_guard_restores_previous_value() {
        let outer = enter(id("outer"));
        {
            let _inner = enter(id("inner"));
            assert_eq!(current(), Some(id("inner")));
        }
        assert_eq!(current(), Some(id("outer")));
        drop(outer);
        assert_eq!(current(), None);
    }

    #[test]
    fn test_reused_blocking_thread_sees_no_stale_id() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .max_blocking_threads(1)
            .build()
            .unwrap();

        runtime.block_on(async {
            let first = scope(id("first-request"), async {
                spawn_blocking(|| (std::thread::current().id(), current()))
                    .await
                    .unwrap()
            })
            .await;
            let second = spawn_blocking(|| (std::thread::current().id(), current()))
                .await
                .unwrap();

            assert_eq!(first.1, Some(id("first-request")));
            assert_eq!(first.0, second.0, "blocking thread should be reused");
            assert_eq!(second.1, None);
        });
    }
}
