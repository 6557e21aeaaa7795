//! Retry with exponential backoff

use std::future::Future;

use tracing::warn;

use crate::config::RetryPolicy;
use crate::error::ClientResult;

/// Run `operation` until it succeeds, fails permanently, or the policy's
/// attempts are used up. Only transient errors are retried.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    name: &'static str,
    mut operation: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(operation = name, attempt, ?delay, %error, "transient failure, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
