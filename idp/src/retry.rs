// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Retry and backoff around a single provider attempt.
//!
//! Both wrappers implement [`Attempt`] themselves so they compose:
//!
//! ```text
//! Retry(Backoff(Registrar))
//! ```
//!
//! With that ordering the backoff delay is paid after every failed attempt,
//! including the last one, before the retrier gives up. [`policy`] builds
//! exactly this stack.

use std::future::Future;
use std::time::Duration;

use crate::errors::AttemptError;
use crate::models::{ProviderSource, ProviderState};

/// One attempt at registering a service provider.
pub trait Attempt: Send + Sync {
    fn attempt(
        &self,
        source: &ProviderSource,
    ) -> impl Future<Output = Result<(), AttemptError>> + Send;
}

/// Adapts a closure into an [`Attempt`]. See [`attempt_fn`].
#[derive(Clone)]
pub struct AttemptFn<F>(F);

/// Wraps `f` so it can be used wherever an [`Attempt`] is expected.
pub fn attempt_fn<F, Fut>(f: F) -> AttemptFn<F>
where
    F: Fn(ProviderSource) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), AttemptError>> + Send,
{
    AttemptFn(f)
}

impl<F, Fut> Attempt for AttemptFn<F>
where
    F: Fn(ProviderSource) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), AttemptError>> + Send,
{
    fn attempt(
        &self,
        source: &ProviderSource,
    ) -> impl Future<Output = Result<(), AttemptError>> + Send {
        (self.0)(source.clone())
    }
}

/// Retries the wrapped attempt until it succeeds or `max_attempts` calls
/// have failed.
pub struct Retry<A> {
    inner: A,
    max_attempts: u32,
}

impl<A: Attempt> Retry<A> {
    /// A `max_attempts` of zero is treated as one.
    pub fn new(inner: A, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl<A: Attempt> Attempt for Retry<A> {
    async fn attempt(&self, source: &ProviderSource) -> Result<(), AttemptError> {
        let mut attempt = 1;
        loop {
            tracing::info!(
                "[idp] attempting provider {} url {} attempt {}",
                source.id,
                source.location,
                attempt
            );
            tracing::debug!(provider = %source.id, state = %ProviderState::Attempting);

            match self.inner.attempt(source).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= self.max_attempts => {
                    tracing::debug!(provider = %source.id, state = %ProviderState::Failed);
                    return Err(AttemptError::Exhausted {
                        attempts: self.max_attempts,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        "[idp] provider {} attempt {} failed: {}",
                        source.id,
                        attempt,
                        err
                    );
                    tracing::debug!(provider = %source.id, state = %ProviderState::Retrying);
                    attempt += 1;
                }
            }
        }
    }
}

/// Sleeps for `delay` after a failed attempt before reporting the failure.
pub struct Backoff<A> {
    inner: A,
    delay: Duration,
}

impl<A: Attempt> Backoff<A> {
    pub fn new(inner: A, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<A: Attempt> Attempt for Backoff<A> {
    async fn attempt(&self, source: &ProviderSource) -> Result<(), AttemptError> {
        let result = self.inner.attempt(source).await;
        if result.is_err() && !self.delay.is_zero() {
            tracing::info!("[idp] backing off for {:?}", self.delay);
            tokio::time::sleep(self.delay).await;
        }
        result
    }
}

/// Builds the uniform per-run policy: `Retry(Backoff(inner))`.
///
/// Without a backoff delay failed attempts are retried immediately.
pub fn policy<A: Attempt>(
    inner: A,
    max_attempts: u32,
    backoff: Option<Duration>,
) -> Retry<Backoff<A>> {
    Retry::new(
        Backoff::new(inner, backoff.unwrap_or(Duration::ZERO)),
        max_attempts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn source() -> ProviderSource {
        ProviderSource::new("sp_id", "http://sp.example/metadata")
    }

    fn unavailable(source: &ProviderSource) -> AttemptError {
        AttemptError::Fetch(FetchError::Status {
            location: source.location.clone(),
            status: 503,
        })
    }

    /// Fails the first `failures` calls, then succeeds.
    fn flaky(failures: u32, calls: Arc<AtomicU32>) -> impl Attempt {
        attempt_fn(move |source: ProviderSource| {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < failures {
                    Err(unavailable(&source))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_time() {
        let calls = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(flaky(0, calls.clone()), 3);
        retry.attempt(&source()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_absorbs_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(flaky(2, calls.clone()), 3);
        retry.attempt(&source()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted_wraps_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(flaky(u32::MAX, calls.clone()), 3);
        let err = retry.attempt(&source()).await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().ends_with("failed after 3 retries"));
        assert!(matches!(
            err,
            AttemptError::Exhausted { attempts: 3, ref source }
                if matches!(**source, AttemptError::Fetch(FetchError::Status { status: 503, .. }))
        ));
    }

    #[tokio::test]
    async fn test_retry_zero_attempts_still_calls_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(flaky(u32::MAX, calls.clone()), 0);
        let err = retry.attempt(&source()).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.to_string().ends_with("failed after 1 retries"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_only_after_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let backoff = Backoff::new(flaky(1, calls.clone()), Duration::from_secs(5));

        let start = Instant::now();
        assert!(backoff.attempt(&source()).await.is_err());
        assert_eq!(start.elapsed(), Duration::from_secs(5));

        let start = Instant::now();
        assert!(backoff.attempt(&source()).await.is_ok());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_pays_trailing_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = policy(flaky(u32::MAX, calls.clone()), 3, Some(Duration::from_secs(2)));

        let start = Instant::now();
        let err = policy.attempt(&source()).await.unwrap_err();

        // one delay per failed attempt, the last one included
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("failed after 3 retries"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_without_backoff_retries_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = policy(flaky(2, calls.clone()), 3, None);

        let start = Instant::now();
        policy.attempt(&source()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
