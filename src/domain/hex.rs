//! Hex codec for `0x`-prefixed topics and payloads
//!
//! Absent values pass straight through, so optional topic slots can be fed in
//! without unwrapping them first.

use thiserror::Error;

/// The text was not valid hex once the `0x` prefix was removed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid hex: {0}")]
pub struct InvalidHex(#[from] pub hex::FromHexError);

/// Decode optional `0x`-prefixed hex text into bytes
///
/// Only a lowercase `0x` prefix is stripped; digits may be any case.
/// Odd-length input or non-hex characters fail with [`InvalidHex`].
pub fn decode_hex(value: Option<&str>) -> Result<Option<Vec<u8>>, InvalidHex> {
    let Some(value) = value else {
        return Ok(None);
    };
    let digits = value.strip_prefix("0x").unwrap_or(value);
    Ok(Some(hex::decode(digits)?))
}

/// Encode optional bytes as lowercase `0x`-prefixed hex text
pub fn encode_hex(bytes: Option<&[u8]>) -> Option<String> {
    bytes.map(|bytes| format!("0x{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_passes_through() {
        assert_eq!(decode_hex(None).unwrap(), None);
        assert_eq!(encode_hex(None), None);
    }

    #[test]
    fn test_decode_prefixed_and_bare() {
        assert_eq!(
            decode_hex(Some("0xa9059cbb")).unwrap(),
            Some(vec![0xa9, 0x05, 0x9c, 0xbb])
        );
        assert_eq!(decode_hex(Some("A9059CBB")).unwrap(), Some(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(decode_hex(Some("0x")).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(decode_hex(Some("0Xa9")).is_err());
    }

    #[test]
    fn test_rejects_odd_length_and_bad_digits() {
        assert!(decode_hex(Some("0xabc")).is_err());
        assert!(decode_hex(Some("0xzz")).is_err());
        // only a single prefix is stripped
        assert!(decode_hex(Some("0x0xab")).is_err());
    }

    #[test]
    fn test_round_trip_is_stable_after_canonicalising() {
        for input in ["0xDEADbeef", "0x", "00ff10", "0xa9059cbb000000000000"] {
            let once = decode_hex(Some(input)).unwrap();
            let encoded = encode_hex(once.as_deref());
            let twice = decode_hex(encoded.as_deref()).unwrap();
            assert_eq!(once, twice);
            assert_eq!(encoded.as_deref().map(str::to_lowercase), encoded);
        }
    }
}
