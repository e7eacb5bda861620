//! First-reply-wins race between two geocoding providers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::cep::{Location, PostalCode};
use crate::observability::{metrics, SpanScope};
use crate::providers::{LocationProvider, ProviderError};

/// Deadline shared by both providers unless configured otherwise.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Terminal outcomes of a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The first provider to reply had no usable location.
    #[error("no provider found the postal code")]
    NotFound,

    /// Neither provider replied before the deadline.
    #[error("no provider replied before the deadline")]
    Timeout,
}

impl ResolveError {
    pub fn as_label(&self) -> &'static str {
        match self {
            ResolveError::NotFound => "not_found",
            ResolveError::Timeout => "timeout",
        }
    }
}

/// What one provider task produced.
#[derive(Debug)]
enum Outcome {
    Usable(Location),
    Empty,
    Failed(ProviderError),
    TimedOut,
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Usable(_) => "usable",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
            Outcome::TimedOut => "timeout",
        }
    }
}

#[derive(Debug)]
struct Reply {
    provider: &'static str,
    outcome: Outcome,
}

/// Races two providers for the same postal code.
#[derive(Clone)]
pub struct RedundantResolver {
    primary: Arc<dyn LocationProvider>,
    secondary: Arc<dyn LocationProvider>,
    deadline: Duration,
}

impl RedundantResolver {
    pub fn new(
        primary: Arc<dyn LocationProvider>,
        secondary: Arc<dyn LocationProvider>,
        deadline: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            deadline,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Resolve `code` using whichever provider replies first.
    ///
    /// Provider calls run as children of `parent` so their outbound requests
    /// carry the caller's trace.
    pub async fn resolve(&self, code: &PostalCode, parent: &SpanScope) -> Result<Location, ResolveError> {
        let mut first = self.spawn_lookup(&self.primary, code, parent);
        let mut second = self.spawn_lookup(&self.secondary, code, parent);
        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        let result = tokio::select! {
            joined = &mut first => decide(joined),
            joined = &mut second => decide(joined),
            _ = &mut deadline => {
                tracing::warn!(cep = %code, deadline = ?self.deadline, "No provider replied before the deadline");
                Err(ResolveError::Timeout)
            }
        };

        match &result {
            Ok(_) => metrics::record_resolution("found"),
            Err(e) => metrics::record_resolution(e.as_label()),
        }
        result
    }

    fn spawn_lookup(
        &self,
        provider: &Arc<dyn LocationProvider>,
        code: &PostalCode,
        parent: &SpanScope,
    ) -> JoinHandle<Reply> {
        let provider = Arc::clone(provider);
        let code = code.clone();
        let deadline = self.deadline;
        let mut span = parent.child("provider-lookup");
        let instrument = span.span().clone();

        tokio::spawn(
            async move {
                let name = provider.name();
                let outcome = match tokio::time::timeout(deadline, provider.fetch(&code, span.context())).await {
                    Ok(Ok(location)) if location.is_usable() => Outcome::Usable(location),
                    Ok(Ok(_)) => Outcome::Empty,
                    Ok(Err(e)) => Outcome::Failed(e),
                    Err(_) => Outcome::TimedOut,
                };

                match &outcome {
                    Outcome::Usable(_) => span.set_ok(),
                    Outcome::Failed(e) => {
                        tracing::debug!(provider = name, cep = %code, error = %e, kind = e.kind(), "Provider lookup failed");
                        span.set_error(e.to_string());
                    }
                    other => span.set_error(other.label()),
                }
                metrics::record_provider_response(name, outcome.label());

                Reply {
                    provider: name,
                    outcome,
                }
            }
            .instrument(instrument),
        )
    }
}

fn decide(joined: Result<Reply, JoinError>) -> Result<Location, ResolveError> {
    let reply = match joined {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Provider task did not complete");
            return Err(ResolveError::NotFound);
        }
    };

    match reply.outcome {
        Outcome::Usable(location) => {
            tracing::debug!(provider = reply.provider, city = ?location.city, "Provider won the race");
            Ok(location)
        }
        Outcome::TimedOut => Err(ResolveError::Timeout),
        outcome => {
            tracing::info!(provider = reply.provider, outcome = outcome.label(), "First reply had no usable location");
            Err(ResolveError::NotFound)
        }
    }
}
