//! Log matcher trait and types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{InterfaceDefinition, InterfaceDescriptor};
use crate::domain::hex::InvalidHex;
use crate::domain::log::RawLog;

/// A decoded argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Whether the value came from a topic word
    pub indexed: bool,
    /// Decoded value as a formatted string
    pub value: String,
}

/// Ordered argument mapping, in the matched descriptor's parameter order
pub type ArgumentMapping = Vec<DecodedArg>;

/// A descriptor that fits the log, with the arguments it decoded to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLog {
    pub descriptor: InterfaceDescriptor,
    pub arguments: ArgumentMapping,
}

/// Why a log could not be matched
///
/// Every variant other than [`MatchError::NoMatch`] describes why a single
/// descriptor was rejected (or, for topic faults, why no descriptor could be
/// tried at all).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("topic is not valid hex: {0}")]
    InvalidHex(#[from] InvalidHex),

    #[error("topic word must be 32 bytes, got {0}")]
    BadTopicLength(usize),

    #[error("log has no identifier topic")]
    MissingIdentifier,

    #[error("identifier does not match 0x{expected}")]
    IdentifierMismatch { expected: String },

    #[error("expected {expected} indexed topics, log has {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("unsupported type `{kind}`: {reason}")]
    UnsupportedType { kind: String, reason: String },

    #[error("ABI decode failed: {0}")]
    AbiDecode(String),

    #[error("payload is {actual} bytes but the decoded layout spans {expected}")]
    LayoutMismatch { expected: usize, actual: usize },

    #[error("no descriptor matched ({} tried)", rejections.len())]
    NoMatch { rejections: Vec<(String, MatchError)> },
}

/// Trait for log matching implementations
///
/// This trait abstracts over the actual ABI decoding implementation,
/// allowing us to swap out alloy-dyn-abi for a different library if needed.
pub trait LogMatcher: Send + Sync {
    /// Find the first descriptor consistent with the log and decode against it
    ///
    /// # Returns
    /// * `Ok(MatchedLog)` - The first descriptor whose identifier and layout fit
    /// * `Err(MatchError::NoMatch { .. })` - No descriptor fit; rejections say why
    /// * `Err(...)` - A topic could not be decoded at all
    fn match_log(
        &self,
        definition: &InterfaceDefinition,
        log: &RawLog,
    ) -> Result<MatchedLog, MatchError>;
}
