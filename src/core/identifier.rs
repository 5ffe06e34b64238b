//! Candidate identifier heuristic
//!
//! Unverified logs are looked up by a 4-byte key derived from their first
//! topic. For event logs that topic is a 32-byte signature hash, so the key
//! is a truncation and different events can share it. Every candidate is
//! still matched against the full log.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("log has no first topic")]
    MissingTopic,

    #[error("first topic is not 0x-prefixed hex")]
    Malformed,
}

/// Derive the 4-byte candidate key from a log's first topic
///
/// The topic is read as one big-endian unsigned integer, re-encoded in its
/// minimal byte form (leading zero bytes dropped), and its leading four bytes
/// are the key. Returns `Ok(None)` when the minimal form is shorter than four
/// bytes, since no stored identifier can equal it.
pub fn derive_candidate_identifier(
    first_topic: Option<&str>,
) -> Result<Option<[u8; 4]>, IdentifierError> {
    let topic = first_topic.ok_or(IdentifierError::MissingTopic)?;
    let digits = topic
        .strip_prefix("0x")
        .ok_or(IdentifierError::Malformed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdentifierError::Malformed);
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(None);
    }
    let even = if significant.len() % 2 == 1 {
        format!("0{significant}")
    } else {
        significant.to_string()
    };
    let minimal = hex::decode(even).map_err(|_| IdentifierError::Malformed)?;

    Ok(minimal.get(..4).and_then(|lead| lead.try_into().ok()))
}
