//! Retry-with-backoff for operations that can fail transiently.
//!
//! Address lookups (and anything else classified as a transient-transport
//! call) share the same policy: exponential backoff between whole-operation
//! attempts, with the caller deciding which errors are worth retrying.

use std::{thread, time::Duration};

use log::debug;

/// Backoff parameters for [`retry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetryPolicy {
    /// Delay before the second attempt. Doubles after every failed attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// A policy that runs the operation exactly once.
    pub fn no_retry() -> Self {
        RetryPolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts: 1,
        }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. The last error is returned in that case.
///
/// `retryable` decides whether an error is transient; anything else aborts
/// the retry loop immediately.
pub fn retry<T, E>(
    policy: &RetryPolicy,
    retryable: impl Fn(&E) -> bool,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let mut delay = policy.initial_delay;

    for attempt in 1..=policy.max_attempts {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.max_attempts && retryable(&e) => {
                debug!("Attempt {}/{} failed, retrying in {:?}", attempt, policy.max_attempts, delay);
                thread::sleep(delay);
                delay = (delay * 2).min(policy.max_delay);
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("retry loop always returns from its last attempt")
}
