//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Log matching using alloy-dyn-abi
//! - ABI artifact scanning
//! - OpenChain signature lookups

pub mod abi;

pub use abi::{AbiScanner, AlloyLogMatcher, OpenChainCandidateStore};
