//! Decode results handed back to callers

use std::fmt;

use serde::Serialize;

use super::abi::{ArgumentMapping, InterfaceDefinition, MatchedLog};
use super::signature::format_signature;

/// What the decoder knows about the transaction that produced a log
#[derive(Debug, Clone, Default)]
pub struct TransactionContext {
    /// Contract the transaction was sent to; `None` for contract creation
    pub target_address: Option<String>,
    /// Verified interface of the target, when a registry has one
    pub known_interface: Option<InterfaceDefinition>,
}

impl TransactionContext {
    pub fn new(target_address: impl Into<String>) -> Self {
        Self {
            target_address: Some(target_address.into()),
            known_interface: None,
        }
    }

    pub fn without_target() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, definition: InterfaceDefinition) -> Self {
        self.known_interface = Some(definition);
        self
    }
}

/// A successful decode against one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedLog {
    /// Lowercase hex of the descriptor identifier, no prefix
    pub identifier_hex: String,
    /// e.g. "Transfer(address indexed from, address indexed to, uint256 value)"
    pub signature_text: String,
    pub mapping: ArgumentMapping,
}

impl From<MatchedLog> for DecodedLog {
    fn from(matched: MatchedLog) -> Self {
        Self {
            identifier_hex: matched.descriptor.identifier_hex(),
            signature_text: format_signature(matched.descriptor.name(), &matched.arguments),
            mapping: matched.arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The originating transaction has no contract target
    NoTarget,
    /// A target exists but no consistent decoding was found
    CouldNotDecode,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoTarget => write!(f, "no target"),
            FailureReason::CouldNotDecode => write!(f, "could not decode"),
        }
    }
}

/// The three shapes a decode can end in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// Decoded against the target's verified interface
    Decoded(DecodedLog),
    /// No verified interface; zero or one best-effort guesses
    Unverified { candidates: Vec<DecodedLog> },
    Failed { reason: FailureReason },
}

impl DecodeOutcome {
    pub fn failed(reason: FailureReason) -> Self {
        DecodeOutcome::Failed { reason }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded(_))
    }

    /// The decode to display, verified or guessed
    pub fn best(&self) -> Option<&DecodedLog> {
        match self {
            DecodeOutcome::Decoded(decoded) => Some(decoded),
            DecodeOutcome::Unverified { candidates } => candidates.first(),
            DecodeOutcome::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{DecodedArg, InterfaceDescriptor};

    #[test]
    fn test_decoded_log_from_match() {
        let descriptor = InterfaceDescriptor::parse_function("transfer(address,uint256)").unwrap();
        let matched = MatchedLog {
            descriptor,
            arguments: vec![
                DecodedArg {
                    name: "arg0".into(),
                    kind: "address".into(),
                    indexed: false,
                    value: "0x00".into(),
                },
                DecodedArg {
                    name: "arg1".into(),
                    kind: "uint256".into(),
                    indexed: false,
                    value: "1".into(),
                },
            ],
        };
        let decoded = DecodedLog::from(matched);
        assert_eq!(decoded.identifier_hex, "a9059cbb");
        assert_eq!(decoded.signature_text, "transfer(address arg0, uint256 arg1)");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(DecodeOutcome::failed(FailureReason::NoTarget)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "no_target");

        let json = serde_json::to_value(DecodeOutcome::Unverified { candidates: vec![] }).unwrap();
        assert_eq!(json["status"], "unverified");
        assert!(json["candidates"].as_array().unwrap().is_empty());
    }
}
