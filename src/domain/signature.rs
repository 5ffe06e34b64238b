//! Human-readable call signatures

use super::abi::DecodedArg;

/// Render `name(type [indexed ]param, ...)` from a decoded argument mapping
///
/// Only names, types and indexed flags are used; values never appear.
pub fn format_signature(name: &str, arguments: &[DecodedArg]) -> String {
    let params: Vec<String> = arguments
        .iter()
        .map(|arg| {
            if arg.indexed {
                format!("{} indexed {}", arg.kind, arg.name)
            } else {
                format!("{} {}", arg.kind, arg.name)
            }
        })
        .collect();
    format!("{}({})", name, params.join(", "))
}
