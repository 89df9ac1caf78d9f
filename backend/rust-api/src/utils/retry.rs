use rand::Rng;
use std::time::Duration;

/// Backoff policy for collaborator writes that must eventually land
/// (archiving an ended session onto its game).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
            jitter_max: Duration::from_millis(50),
        }
    }
}

pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    let mut backoff = policy.base_backoff;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts => return Err(err),
            Err(err) => {
                tracing::warn!(attempt, "retrying after error: {}", err);
                let jitter_ms = policy.jitter_max.as_millis() as u64;
                let extra = if jitter_ms == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=jitter_ms)
                };
                tokio::time::sleep(backoff + Duration::from_millis(extra)).await;
                backoff = std::cmp::min(backoff * 2, policy.max_backoff);
                attempt += 1;
            }
        }
    }
}
