//! Local-first store that falls back to a second source

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::abi::{CandidateFragment, CandidateStore, LookupError};

/// Queries `primary`, and `fallback` only when the primary has nothing or errors
pub struct LayeredCandidateStore {
    primary: Arc<dyn CandidateStore>,
    fallback: Arc<dyn CandidateStore>,
}

impl LayeredCandidateStore {
    pub fn new(primary: Arc<dyn CandidateStore>, fallback: Arc<dyn CandidateStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl CandidateStore for LayeredCandidateStore {
    async fn lookup_by_identifier(
        &self,
        identifier: [u8; 4],
        limit: usize,
    ) -> Result<Vec<CandidateFragment>, LookupError> {
        match self.primary.lookup_by_identifier(identifier, limit).await {
            Ok(found) if !found.is_empty() => Ok(found),
            Ok(_) => self.fallback.lookup_by_identifier(identifier, limit).await,
            Err(err) => {
                tracing::warn!(%err, "primary candidate store failed, trying fallback");
                self.fallback.lookup_by_identifier(identifier, limit).await
            }
        }
    }
}
