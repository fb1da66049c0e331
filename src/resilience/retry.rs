use std::{fmt::Display, future::Future};

use tracing::warn;

/// Every attempt of a bounded retry failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` once, then up to `max_retries` more times until it succeeds.
///
/// Attempts are independent and run back to back with no delay. The closure is
/// given the zero-based attempt number. Only the last error is kept.
pub async fn retry_bounded<T, E, F, Fut>(
    label: &str,
    max_retries: u32,
    mut op: F,
) -> Result<T, Exhausted<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_retries.saturating_add(1);
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                warn!(label, attempt, max_attempts, error = %err, "attempt_failed");
                if attempt >= max_attempts {
                    return Err(Exhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
            }
        }
    }
}
