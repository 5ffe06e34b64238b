//! Candidate fragments and the store they are looked up in

use async_trait::async_trait;
use thiserror::Error;

use super::{InterfaceDefinition, InterfaceDescriptor};

/// A previously observed interface fragment, keyed by a 4-byte identifier
///
/// Several fragments may share one identifier when different signatures
/// collide on the truncated hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFragment {
    pub identifier: [u8; 4],
    pub definition: InterfaceDefinition,
}

impl CandidateFragment {
    pub fn new(identifier: [u8; 4], definition: InterfaceDefinition) -> Self {
        Self {
            identifier,
            definition,
        }
    }

    /// Single-descriptor fragment keyed by the descriptor's leading 4 bytes
    ///
    /// Events are keyed by the truncated signature hash so that the
    /// first-topic heuristic can find them.
    pub fn from_descriptor(descriptor: InterfaceDescriptor) -> Option<Self> {
        let identifier = descriptor.short_identifier()?;
        Some(Self::new(identifier, InterfaceDefinition::from(descriptor)))
    }

    /// Identifier as `0x`-prefixed hex
    pub fn identifier_hex(&self) -> String {
        format!("0x{}", hex::encode(self.identifier))
    }

    /// Canonical signatures of the fragment's descriptors, `;`-joined
    pub fn signature_key(&self) -> String {
        self.definition
            .iter()
            .map(InterfaceDescriptor::signature)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Candidate lookup failures
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("candidate store error: {0}")]
    Store(String),

    #[error("remote signature lookup failed: {0}")]
    Remote(String),

    #[error("candidate lookup timed out after {0} ms")]
    Timeout(u64),
}

/// Read-only source of candidate fragments
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Return up to `limit` fragments stored under `identifier`, in store order
    async fn lookup_by_identifier(
        &self,
        identifier: [u8; 4],
        limit: usize,
    ) -> Result<Vec<CandidateFragment>, LookupError>;
}
