//! Diagnostic sink for decode failures
//!
//! Diagnostics are advisory: a sink sees failures but never changes what the
//! decoder returns.

use super::abi::MatchError;

/// Receives one report per failed match attempt
pub trait DiagnosticSink: Send + Sync {
    fn decode_failed(&self, transaction_hash: Option<&str>, error: &MatchError);
}

/// Reports failures as `tracing` warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn decode_failed(&self, transaction_hash: Option<&str>, error: &MatchError) {
        tracing::warn!(
            transaction = transaction_hash.unwrap_or("<unknown>"),
            %error,
            "could not decode log"
        );
    }
}

/// Discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn decode_failed(&self, _transaction_hash: Option<&str>, _error: &MatchError) {}
}
