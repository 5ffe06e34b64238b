//! ABI domain models and contracts
//!
//! This module defines the traits and types for log decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod candidate;
mod decoder;
mod descriptor;

pub use candidate::{CandidateFragment, CandidateStore, LookupError};
pub use decoder::{ArgumentMapping, DecodedArg, LogMatcher, MatchError, MatchedLog};
pub use descriptor::{
    DefinitionError, DescriptorKind, InterfaceDefinition, InterfaceDescriptor, ParamSpec,
};
