//! Cancellation- and deadline-aware future combinators.
//!
//! Persistence requests in this workspace are raced against two signals:
//! a per-key `CancellationToken` (a newer request for the same key
//! supersedes the old one) and an outer deadline (a hung endpoint must
//! surface as a failure, not a stuck "saving" indicator). Both races live
//! here so the callers stay a single combinator away from plain futures.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Why a raced future did not run to completion.
#[derive(Debug, PartialEq, Eq)]
pub enum Interrupted {
    /// The cancellation token fired before the future finished.
    Cancelled,
    /// The deadline elapsed before the future finished.
    DeadlineElapsed,
}

/// Extension trait racing a future against a `CancellationToken`.
///
/// Returns `Ok(output)` if the future completes first, or
/// `Err(Interrupted::Cancelled)` if the token fires first. A token that
/// is already cancelled wins the race immediately.
#[async_trait]
pub trait OrCancel: Sized {
    type Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, Interrupted>;
}

#[async_trait]
impl<F> OrCancel for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, Interrupted> {
        tokio::select! {
            _ = token.cancelled() => Err(Interrupted::Cancelled),
            res = self => Ok(res),
        }
    }
}

/// Bounded-wait helper: run `fut` to completion or give up after `limit`.
///
/// The timer uses tokio's clock, so tests running under
/// `start_paused = true` can advance it deterministically.
pub async fn bounded<F>(fut: F, limit: Duration) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(out) => Ok(out),
        Err(_) => Err(Interrupted::DeadlineElapsed),
    }
}
