//! Core decoding flow
//!
//! - `identifier`: first-topic heuristic for candidate lookups
//! - `resolver`: best-effort decoding from candidate fragments
//! - `orchestrator`: top-level routing between verified and guessed decodes

pub mod identifier;
pub mod orchestrator;
pub mod resolver;

pub use identifier::{derive_candidate_identifier, IdentifierError};
pub use orchestrator::LogDecoder;
pub use resolver::{CandidateResolver, CANDIDATE_LOOKUP_LIMIT, MAX_CANDIDATE_MATCHES};
