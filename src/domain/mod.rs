//! Domain layer - log decoding models and the ports around them
//!
//! Nothing here touches storage, the network or a concrete ABI library.

pub mod abi;
pub mod diagnostics;
pub mod hex;
pub mod log;
pub mod outcome;
pub mod signature;

pub use diagnostics::{DiagnosticSink, NullSink, TracingSink};
pub use log::{RawLog, RpcLog};
pub use outcome::{DecodeOutcome, DecodedLog, FailureReason, TransactionContext};
