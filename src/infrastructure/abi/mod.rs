//! ABI infrastructure - Alloy-based matching, artifact scanning and remote lookups

mod decoder;
mod openchain;
mod scanner;

pub use decoder::AlloyLogMatcher;
pub use openchain::{OpenChainCandidateStore, DEFAULT_OPENCHAIN_URL};
pub use scanner::{AbiScanner, ScanReport};
