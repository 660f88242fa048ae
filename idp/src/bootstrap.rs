// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Concurrent registration of every configured service provider.
//!
//! [`Bootstrap::run`] spawns one task per provider on a [`JoinSet`] and
//! collects outcomes as they arrive:
//!
//! - the first failed provider ends the run with that provider's error
//! - if every provider succeeds the run succeeds
//! - if the deadline passes first the run fails with
//!   [`BootstrapError::TimedOut`]
//!
//! Whenever the run ends early, the tasks still in flight are aborted when the
//! [`JoinSet`] is dropped, so nothing is written to the store after `run` has
//! returned.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{Instrument, Span};

use crate::errors::{AttemptError, BootstrapError};
use crate::models::{ProviderSource, ProviderState};
use crate::retry::Attempt;

type Outcome = (String, Result<(), AttemptError>);

pub struct Bootstrap<A> {
    attempt: Arc<A>,
    span: Span,
}

impl<A: Attempt + 'static> Bootstrap<A> {
    /// `attempt` is run once per provider and is expected to already carry
    /// the retry policy, see [`crate::retry::policy`].
    pub fn new(attempt: A) -> Self {
        Self {
            attempt: Arc::new(attempt),
            span: tracing::info_span!("bootstrap"),
        }
    }

    /// Parent span for every event emitted by the run and its tasks.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Registers every provider in `sources`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::Provider`] for the first provider that failed
    /// - [`BootstrapError::TimedOut`] if the deadline passed first
    /// - [`BootstrapError::TaskFailed`] if a provider task panicked
    pub async fn run(
        &self,
        sources: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<(), BootstrapError> {
        let span = self.span.clone();
        self.run_inner(sources, timeout).instrument(span).await
    }

    async fn run_inner(
        &self,
        sources: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<(), BootstrapError> {
        if sources.is_empty() {
            tracing::info!("[idp] no service providers configured");
            return Ok(());
        }

        tracing::info!(
            "[idp] bootstrapping {} service providers, timeout {:?}",
            sources.len(),
            timeout
        );

        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        for (id, location) in sources {
            let source = ProviderSource::new(id, location);
            let attempt = self.attempt.clone();
            let span = tracing::info_span!("provider", id = %source.id);
            tracing::debug!(parent: &span, state = %ProviderState::Pending);

            tasks.spawn(
                async move {
                    let outcome = attempt.attempt(&source).await;
                    let state = if outcome.is_ok() {
                        ProviderState::Succeeded
                    } else {
                        ProviderState::Failed
                    };
                    tracing::debug!(state = %state);
                    (source.id, outcome)
                }
                .instrument(span),
            );
        }

        match tokio::time::timeout(timeout, first_error(&mut tasks)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    "[idp] timed out after {:?} with {} providers outstanding",
                    timeout,
                    tasks.len()
                );
                Err(BootstrapError::TimedOut)
            }
        }
    }
}

/// Drains `tasks`, stopping at the first failed provider.
async fn first_error(tasks: &mut JoinSet<Outcome>) -> Result<(), BootstrapError> {
    let mut registered = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => registered += 1,
            Ok((id, Err(source))) => {
                tracing::error!("[idp] service provider {} failed: {}", id, source);
                if !tasks.is_empty() {
                    tracing::warn!("[idp] abandoning {} outstanding providers", tasks.len());
                }
                return Err(BootstrapError::Provider { id, source });
            }
            Err(e) => {
                tracing::error!("[idp] provider task failed: {:?}", e);
                return Err(BootstrapError::TaskFailed(e.to_string()));
            }
        }
    }

    tracing::info!("[idp] registered {} service providers", registered);
    Ok(())
}
