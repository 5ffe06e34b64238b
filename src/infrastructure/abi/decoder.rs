//! Log matcher implementation using alloy-dyn-abi

use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue, DynToken};
use alloy_primitives::B256;

use crate::domain::abi::{
    ArgumentMapping, DecodedArg, DescriptorKind, InterfaceDefinition, InterfaceDescriptor,
    LogMatcher, MatchError, MatchedLog,
};
use crate::domain::hex::decode_hex;
use crate::domain::log::RawLog;
use crate::domain::{DiagnosticSink, TracingSink};

/// Log matcher implementation using alloy-dyn-abi
pub struct AlloyLogMatcher {
    sink: Arc<dyn DiagnosticSink>,
}

impl AlloyLogMatcher {
    /// Create a matcher that reports failures to `sink`
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    fn try_match(
        definition: &InterfaceDefinition,
        log: &RawLog,
    ) -> Result<MatchedLog, MatchError> {
        let words = decode_topics(log)?;

        let mut rejections = Vec::new();
        for descriptor in definition.iter() {
            match decode_with(descriptor, &words, &log.data) {
                Ok(arguments) => {
                    return Ok(MatchedLog {
                        descriptor: descriptor.clone(),
                        arguments,
                    })
                }
                Err(err) => rejections.push((descriptor.signature(), err)),
            }
        }

        Err(MatchError::NoMatch { rejections })
    }
}

impl Default for AlloyLogMatcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl LogMatcher for AlloyLogMatcher {
    fn match_log(
        &self,
        definition: &InterfaceDefinition,
        log: &RawLog,
    ) -> Result<MatchedLog, MatchError> {
        let result = Self::try_match(definition, log);
        if let Err(err) = &result {
            self.sink.decode_failed(log.transaction_hash.as_deref(), err);
        }
        result
    }
}

/// Decode all topic slots up front; one bad topic spoils every descriptor
fn decode_topics(log: &RawLog) -> Result<[Option<B256>; 4], MatchError> {
    let mut words = [None; 4];
    for (slot, topic) in words.iter_mut().zip(log.topics()) {
        if let Some(bytes) = decode_hex(topic)? {
            if bytes.len() != 32 {
                return Err(MatchError::BadTopicLength(bytes.len()));
            }
            *slot = Some(B256::from_slice(&bytes));
        }
    }
    Ok(words)
}

/// Decode the log against a single descriptor
fn decode_with(
    descriptor: &InterfaceDescriptor,
    words: &[Option<B256>; 4],
    data: &[u8],
) -> Result<ArgumentMapping, MatchError> {
    let indexed_words: Vec<B256> = if descriptor.is_anonymous() {
        words.iter().flatten().copied().collect()
    } else {
        let first = words[0].ok_or(MatchError::MissingIdentifier)?;
        let fits = match descriptor.kind() {
            DescriptorKind::Event => first.as_slice() == descriptor.identifier(),
            DescriptorKind::Function => first.as_slice().starts_with(descriptor.identifier()),
        };
        if !fits {
            return Err(MatchError::IdentifierMismatch {
                expected: descriptor.identifier_hex(),
            });
        }
        words[1..].iter().flatten().copied().collect()
    };

    let expected = descriptor.inputs().iter().filter(|p| p.indexed).count();
    if expected != indexed_words.len() {
        return Err(MatchError::ArityMismatch {
            expected,
            found: indexed_words.len(),
        });
    }

    // Parse types from descriptor inputs
    let types: Vec<DynSolType> = descriptor
        .inputs()
        .iter()
        .map(|param| {
            DynSolType::parse(&param.kind).map_err(|err| MatchError::UnsupportedType {
                kind: param.kind.clone(),
                reason: err.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let body_types: Vec<DynSolType> = descriptor
        .inputs()
        .iter()
        .zip(&types)
        .filter(|(param, _)| !param.indexed)
        .map(|(_, ty)| ty.clone())
        .collect();
    let mut body_values = decode_body(body_types, data)?.into_iter();
    let mut topic_words = indexed_words.into_iter();

    let mut arguments = Vec::with_capacity(types.len());
    for (idx, (param, ty)) in descriptor.inputs().iter().zip(&types).enumerate() {
        let value = if param.indexed {
            let word = topic_words.next().ok_or(MatchError::ArityMismatch {
                expected,
                found: idx,
            })?;
            decode_topic(ty, word)?
        } else {
            body_values
                .next()
                .ok_or_else(|| MatchError::AbiDecode("payload ended early".to_string()))?
        };

        let name = if param.name.trim().is_empty() {
            format!("arg{}", idx)
        } else {
            param.name.clone()
        };

        arguments.push(DecodedArg {
            name,
            kind: param.kind.clone(),
            indexed: param.indexed,
            value: format_dyn_sol_value(&value),
        });
    }

    Ok(arguments)
}

/// Decode one indexed parameter from its topic word
///
/// Value types sit in the word directly. Reference types (string, bytes,
/// arrays, tuples) are stored as the keccak256 of their encoding, so the
/// word itself is all that can be recovered.
fn decode_topic(ty: &DynSolType, word: B256) -> Result<DynSolValue, MatchError> {
    match ty {
        DynSolType::Address
        | DynSolType::Function
        | DynSolType::Bool
        | DynSolType::FixedBytes(_)
        | DynSolType::Int(_)
        | DynSolType::Uint(_) => ty
            .detokenize(DynToken::Word(word))
            .map_err(|err| MatchError::AbiDecode(format!("topic decode: {err}"))),
        _ => Ok(DynSolValue::FixedBytes(word, 32)),
    }
}

/// Decode the non-indexed parameters from the data payload
///
/// The canonical re-encoding must span exactly the payload, so a descriptor
/// that leaves bytes over (or reads past the end) does not fit.
fn decode_body(types: Vec<DynSolType>, data: &[u8]) -> Result<Vec<DynSolValue>, MatchError> {
    if types.is_empty() {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        return Err(MatchError::LayoutMismatch {
            expected: 0,
            actual: data.len(),
        });
    }

    let tuple_type = DynSolType::Tuple(types);
    let decoded = tuple_type
        .abi_decode_sequence(data)
        .map_err(|err| MatchError::AbiDecode(err.to_string()))?;

    let spanned = decoded.abi_encode_params().len();
    if spanned != data.len() {
        return Err(MatchError::LayoutMismatch {
            expected: spanned,
            actual: data.len(),
        });
    }

    Ok(match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    })
}

/// Render a decoded value without losing any of it
///
/// Integers are always decimal and a top-level string is its raw text.
/// Strings nested in arrays or tuples are quoted so the items stay separable.
fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::String(s) => s.clone(),
        other => format_nested(other),
    }
}

fn format_nested(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("{:?}", s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            let items: Vec<String> = items.iter().map(format_nested).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_nested).collect();
            format!("({})", items.join(", "))
        }
    }
}
