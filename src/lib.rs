//! Decode EVM event logs against verified interfaces, or guess from
//! previously seen signature fragments when the emitting contract is unknown.

pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod infrastructure;
pub mod store;

pub use crate::core::{LogDecoder, CANDIDATE_LOOKUP_LIMIT};
pub use crate::domain::{DecodeOutcome, DecodedLog, FailureReason, RawLog, TransactionContext};
