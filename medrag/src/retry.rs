//! Single-retry backoff for transient adapter failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// Backoff applied before the single retry of a transient failure.
pub(crate) const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Run `op`, retrying exactly once after a backoff if the first attempt
/// fails with a transient error. Permanent errors propagate immediately;
/// a second failure propagates regardless of kind.
pub(crate) async fn with_transient_retry<T, F, Fut>(what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Err(e) if e.is_transient() => {
            warn!(operation = what, error = %e, "transient failure, retrying after backoff");
            tokio::time::sleep(RETRY_BACKOFF).await;
            op().await
        }
        other => other,
    }
}
