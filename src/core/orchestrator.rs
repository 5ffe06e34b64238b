//! Decode entry point - picks verified decoding or candidate resolution

use std::sync::Arc;
use std::time::Duration;

use crate::domain::abi::{CandidateStore, LogMatcher};
use crate::domain::{
    DecodeOutcome, DecodedLog, DiagnosticSink, FailureReason, RawLog, TransactionContext,
};
use crate::infrastructure::abi::AlloyLogMatcher;

use super::resolver::CandidateResolver;

/// Decodes logs in the context of the transaction that emitted them
pub struct LogDecoder {
    matcher: Arc<dyn LogMatcher>,
    resolver: CandidateResolver,
}

impl LogDecoder {
    /// Decoder using the alloy matcher, reporting failures to `sink`
    pub fn new(store: Arc<dyn CandidateStore>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::with_matcher(store, Arc::new(AlloyLogMatcher::new(sink)))
    }

    pub fn with_matcher(store: Arc<dyn CandidateStore>, matcher: Arc<dyn LogMatcher>) -> Self {
        Self {
            resolver: CandidateResolver::new(store, Arc::clone(&matcher)),
            matcher,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.resolver = self.resolver.with_lookup_timeout(timeout);
        self
    }

    /// Decode one log
    ///
    /// - no target: `Failed(NoTarget)`, nothing else is consulted
    /// - known interface: `Decoded`, or `Failed(CouldNotDecode)` with no
    ///   candidate fallback
    /// - otherwise: candidate resolution
    pub async fn decode(&self, log: &RawLog, context: &TransactionContext) -> DecodeOutcome {
        if context.target_address.is_none() {
            return DecodeOutcome::failed(FailureReason::NoTarget);
        }

        match &context.known_interface {
            Some(definition) if !definition.is_empty() => {
                match self.matcher.match_log(definition, log) {
                    Ok(matched) => DecodeOutcome::Decoded(DecodedLog::from(matched)),
                    Err(_) => DecodeOutcome::failed(FailureReason::CouldNotDecode),
                }
            }
            _ => self.resolver.resolve(log).await,
        }
    }

    /// Decode several logs sharing one transaction context, in order
    pub async fn decode_all(
        &self,
        logs: &[RawLog],
        context: &TransactionContext,
    ) -> Vec<DecodeOutcome> {
        let mut outcomes = Vec::with_capacity(logs.len());
        for log in logs {
            outcomes.push(self.decode(log, context).await);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::domain::abi::{InterfaceDefinition, InterfaceDescriptor, MatchError};
    use crate::domain::NullSink;
    use crate::store::MemoryCandidateStore;

    const TRANSFER_EVENT: &str =
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<String>>);

    impl DiagnosticSink for RecordingSink {
        fn decode_failed(&self, _transaction_hash: Option<&str>, error: &MatchError) {
            self.0.lock().unwrap().push(error.to_string());
        }
    }

    fn erc20() -> InterfaceDefinition {
        InterfaceDefinition::new(vec![InterfaceDescriptor::parse_event(
            "Transfer(address indexed from, address indexed to, uint256 value)",
        )
        .unwrap()])
    }

    fn transfer_log() -> RawLog {
        let mut data = vec![0u8; 32];
        data[31] = 100;
        RawLog::new(
            "0xc0ffee",
            [
                Some(TRANSFER_EVENT.to_string()),
                Some(format!("0x{:0>64}", "11")),
                Some(format!("0x{:0>64}", "22")),
            ],
            data,
        )
    }

    fn store_with(definition: &InterfaceDefinition) -> Arc<MemoryCandidateStore> {
        let mut store = MemoryCandidateStore::new();
        store.insert_definition(definition);
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_no_target_short_circuits() {
        let decoder = LogDecoder::new(store_with(&erc20()), Arc::new(NullSink));
        let context = TransactionContext::without_target().with_interface(erc20());
        assert_eq!(
            decoder.decode(&transfer_log(), &context).await,
            DecodeOutcome::failed(FailureReason::NoTarget)
        );
    }

    #[tokio::test]
    async fn test_known_interface_decodes() {
        let decoder = LogDecoder::new(Arc::new(MemoryCandidateStore::new()), Arc::new(NullSink));
        let context = TransactionContext::new("0xc0ffee").with_interface(erc20());

        let DecodeOutcome::Decoded(decoded) = decoder.decode(&transfer_log(), &context).await
        else {
            panic!("expected decoded");
        };
        assert_eq!(
            decoded.identifier_hex,
            TRANSFER_EVENT.trim_start_matches("0x")
        );
        assert_eq!(
            decoded.signature_text,
            "Transfer(address indexed from, address indexed to, uint256 value)"
        );
        assert_eq!(decoded.mapping[2].value, "100");
    }

    #[tokio::test]
    async fn test_known_interface_failure_does_not_fall_back() {
        // the store could decode the log, but the verified interface wins
        let other = InterfaceDefinition::new(vec![InterfaceDescriptor::parse_event(
            "Approval(address indexed owner, address indexed spender, uint256 value)",
        )
        .unwrap()]);
        let sink = Arc::new(RecordingSink::default());
        let decoder = LogDecoder::new(store_with(&erc20()), sink.clone());
        let context = TransactionContext::new("0xc0ffee").with_interface(other);

        assert_eq!(
            decoder.decode(&transfer_log(), &context).await,
            DecodeOutcome::failed(FailureReason::CouldNotDecode)
        );
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_interface_uses_candidates() {
        let decoder = LogDecoder::new(store_with(&erc20()), Arc::new(NullSink));
        let context = TransactionContext::new("0xc0ffee");

        let DecodeOutcome::Unverified { candidates } =
            decoder.decode(&transfer_log(), &context).await
        else {
            panic!("expected unverified");
        };
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].signature_text.starts_with("Transfer("));
    }

    #[tokio::test]
    async fn test_empty_interface_uses_candidates() {
        let decoder = LogDecoder::new(store_with(&erc20()), Arc::new(NullSink));
        let context =
            TransactionContext::new("0xc0ffee").with_interface(InterfaceDefinition::default());
        let outcome = decoder.decode(&transfer_log(), &context).await;
        assert!(matches!(outcome, DecodeOutcome::Unverified { ref candidates } if candidates.len() == 1));
    }

    #[tokio::test]
    async fn test_decode_all_keeps_order() {
        let decoder = LogDecoder::new(store_with(&erc20()), Arc::new(NullSink));

        let unknown = RawLog::new("0xc0ffee", [Some(format!("0x{:0>64}", "1"))], vec![]);
        let malformed = RawLog::new("0xc0ffee", [Some("0xnope".to_string())], vec![]);
        let outcomes = decoder
            .decode_all(
                &[unknown, transfer_log(), malformed],
                &TransactionContext::new("0xc0ffee"),
            )
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], DecodeOutcome::Unverified { candidates: vec![] });
        let best = outcomes[1].best().expect("transfer decodes as a candidate");
        assert!(best.signature_text.starts_with("Transfer("));
        assert_eq!(outcomes[2], DecodeOutcome::failed(FailureReason::CouldNotDecode));
    }
}
