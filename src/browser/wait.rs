//! Bounded polling shared by element waits and the captcha wait.

use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Poll `probe` every `interval` until it yields a value or `timeout`
/// elapses. Returns `Ok(None)` exactly when the deadline passes with no
/// success; probe errors abort the wait immediately. The probe always runs
/// at least once, even with a zero timeout.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(interval.min(deadline - Instant::now())).await;
    }
}
