//! Best-effort decoding for logs with no verified interface

use std::sync::Arc;
use std::time::Duration;

use crate::domain::abi::{CandidateFragment, CandidateStore, LogMatcher, LookupError};
use crate::domain::{DecodeOutcome, DecodedLog, FailureReason, RawLog};

use super::identifier::derive_candidate_identifier;

/// Maximum fragments fetched per lookup
pub const CANDIDATE_LOOKUP_LIMIT: usize = 3;

/// Candidates kept once one decodes
pub const MAX_CANDIDATE_MATCHES: usize = 1;

/// Guesses a log's shape from fragments sharing its identifier
pub struct CandidateResolver {
    store: Arc<dyn CandidateStore>,
    matcher: Arc<dyn LogMatcher>,
    lookup_timeout: Option<Duration>,
}

impl CandidateResolver {
    pub fn new(store: Arc<dyn CandidateStore>, matcher: Arc<dyn LogMatcher>) -> Self {
        Self {
            store,
            matcher,
            lookup_timeout: None,
        }
    }

    /// Bound each store lookup; a lookup that overruns counts as a failure
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Try up to [`CANDIDATE_LOOKUP_LIMIT`] fragments in store order, stopping
    /// at the first that decodes.
    ///
    /// Always `Unverified` unless the identifier can't be derived or the
    /// lookup itself fails, which yield `Failed(CouldNotDecode)`.
    pub async fn resolve(&self, log: &RawLog) -> DecodeOutcome {
        let identifier = match derive_candidate_identifier(log.first_topic.as_deref()) {
            Ok(Some(identifier)) => identifier,
            Ok(None) => return DecodeOutcome::Unverified { candidates: vec![] },
            Err(err) => {
                tracing::debug!(%err, "no candidate identifier");
                return DecodeOutcome::failed(FailureReason::CouldNotDecode);
            }
        };

        let fragments = match self.lookup(identifier).await {
            Ok(fragments) => fragments,
            Err(err) => {
                tracing::warn!(identifier = %hex::encode(identifier), %err, "candidate lookup failed");
                return DecodeOutcome::failed(FailureReason::CouldNotDecode);
            }
        };

        let mut candidates = Vec::with_capacity(MAX_CANDIDATE_MATCHES);
        for fragment in &fragments {
            if let Ok(matched) = self.matcher.match_log(&fragment.definition, log) {
                candidates.push(DecodedLog::from(matched));
                if candidates.len() >= MAX_CANDIDATE_MATCHES {
                    break;
                }
            }
        }

        tracing::debug!(
            identifier = %hex::encode(identifier),
            tried = fragments.len(),
            matched = candidates.len(),
            "resolved candidates"
        );
        DecodeOutcome::Unverified { candidates }
    }

    async fn lookup(&self, identifier: [u8; 4]) -> Result<Vec<CandidateFragment>, LookupError> {
        let lookup = self
            .store
            .lookup_by_identifier(identifier, CANDIDATE_LOOKUP_LIMIT);
        let mut fragments = match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .map_err(|_| LookupError::Timeout(limit.as_millis() as u64))??,
            None => lookup.await?,
        };
        // stores may ignore the limit
        fragments.truncate(CANDIDATE_LOOKUP_LIMIT);
        Ok(fragments)
    }
}
