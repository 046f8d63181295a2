use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::RemoteError;

/// Extra time a status request may take past the deadline.
pub const FETCH_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Status snapshot of a remote generation job.
pub trait PollableJob {
    fn is_pending(&self) -> bool;
    fn status(&self) -> &str;
    fn progress(&self) -> Option<f64> {
        None
    }
}

/// Re-fetches `initial` until it leaves its pending states. Never sleeps past
/// `policy.timeout`, and a status request may overrun the deadline by at most
/// [`FETCH_GRACE`]. A job still pending at the deadline, or a request that
/// stalls, yields [`RemoteError::TimedOut`].
pub async fn wait_for_job<J, F, Fut>(
    initial: J,
    policy: PollPolicy,
    mut fetch: F,
) -> Result<J, RemoteError>
where
    J: PollableJob,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<J, RemoteError>>,
{
    let deadline = Instant::now() + policy.timeout;
    let mut job = initial;

    while job.is_pending() {
        let now = Instant::now();
        if now >= deadline {
            tracing::warn!("Remote job still '{}' after {:?}; giving up", job.status(), policy.timeout);
            return Err(RemoteError::TimedOut(policy.timeout));
        }

        tokio::time::sleep(policy.interval.min(deadline - now)).await;
        let budget = deadline.saturating_duration_since(Instant::now()) + FETCH_GRACE;
        job = match tokio::time::timeout(budget, fetch()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("Status request stalled for {:?}; giving up", budget);
                return Err(RemoteError::TimedOut(policy.timeout));
            }
        };
        tracing::debug!(
            "Progress: {:.0}% - Status: {}",
            job.progress().unwrap_or(0.0),
            job.status()
        );
    }

    Ok(job)
}
