//! Candidate fragment stores

pub mod fragments;
pub mod layered;
pub mod memory;

pub use fragments::{FragmentStats, SqliteCandidateStore};
pub use layered::LayeredCandidateStore;
pub use memory::MemoryCandidateStore;
