//! Interface descriptors - functions and events parsed from a contract ABI

use alloy_json_abi::{Event, Function};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Whether a descriptor names a callable function or an emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Function,
    Event,
}

/// A parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Event parameter stored in a topic word instead of the data payload
    #[serde(default)]
    pub indexed: bool,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            indexed: true,
            ..Self::new(name, kind)
        }
    }
}

/// One function or event definition
///
/// Descriptors are immutable once built; the identifier is derived from the
/// canonical signature at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    kind: DescriptorKind,
    name: String,
    inputs: Vec<ParamSpec>,
    #[serde(default)]
    anonymous: bool,
    /// 4-byte selector for functions, 32-byte signature hash for events
    #[serde(with = "hex_identifier")]
    identifier: Vec<u8>,
}

impl InterfaceDescriptor {
    /// Parse a human-readable function signature, e.g. `transfer(address,uint256)`
    pub fn parse_function(signature: &str) -> Result<Self, DefinitionError> {
        Function::parse(signature)
            .map(|function| Self::from(&function))
            .map_err(|err| DefinitionError::Signature {
                signature: signature.to_string(),
                reason: err.to_string(),
            })
    }

    /// Parse a human-readable event signature,
    /// e.g. `Transfer(address indexed from, address indexed to, uint256 value)`
    pub fn parse_event(signature: &str) -> Result<Self, DefinitionError> {
        Event::parse(signature)
            .map(|event| Self::from(&event))
            .map_err(|err| DefinitionError::Signature {
                signature: signature.to_string(),
                reason: err.to_string(),
            })
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ParamSpec] {
        &self.inputs
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn identifier(&self) -> &[u8] {
        &self.identifier
    }

    /// Identifier as lowercase hex without a prefix
    pub fn identifier_hex(&self) -> String {
        hex::encode(&self.identifier)
    }

    /// Canonical signature (e.g., "transfer(address,uint256)")
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.kind.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Leading 4 bytes of the identifier, the key fragments are stored under
    pub fn short_identifier(&self) -> Option<[u8; 4]> {
        self.identifier.get(..4)?.try_into().ok()
    }
}

impl From<&Function> for InterfaceDescriptor {
    fn from(function: &Function) -> Self {
        Self {
            kind: DescriptorKind::Function,
            name: function.name.clone(),
            inputs: function
                .inputs
                .iter()
                .map(|param| ParamSpec::new(&param.name, param.selector_type()))
                .collect(),
            anonymous: false,
            identifier: function.selector().to_vec(),
        }
    }
}

impl From<&Event> for InterfaceDescriptor {
    fn from(event: &Event) -> Self {
        Self {
            kind: DescriptorKind::Event,
            name: event.name.clone(),
            inputs: event
                .inputs
                .iter()
                .map(|param| ParamSpec {
                    name: param.name.clone(),
                    kind: param.selector_type().into_owned(),
                    indexed: param.indexed,
                })
                .collect(),
            anonymous: event.anonymous,
            identifier: event.selector().to_vec(),
        }
    }
}

/// Errors reading an interface definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("interface JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected an ABI array or an object with an `abi` field")]
    NotAnAbi,

    #[error("ABI entry {index} is malformed: {source}")]
    Entry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid signature `{signature}`: {reason}")]
    Signature { signature: String, reason: String },
}

/// Ordered list of descriptors describing a contract's surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceDefinition {
    descriptors: Vec<InterfaceDescriptor>,
}

impl InterfaceDefinition {
    pub fn new(descriptors: Vec<InterfaceDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Parse a standard JSON ABI (or a build artifact carrying one)
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build from an already-parsed JSON ABI value
    ///
    /// Functions and events keep their declaration order; constructors,
    /// errors, fallback and receive entries are skipped.
    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut object) => match object.remove("abi") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(DefinitionError::NotAnAbi),
            },
            _ => return Err(DefinitionError::NotAnAbi),
        };

        let mut descriptors = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            // `type` defaults to "function" when omitted
            let kind = entry
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("function")
                .to_string();
            match kind.as_str() {
                "function" => {
                    let function: Function = serde_json::from_value(entry)
                        .map_err(|source| DefinitionError::Entry { index, source })?;
                    descriptors.push(InterfaceDescriptor::from(&function));
                }
                "event" => {
                    let event: Event = serde_json::from_value(entry)
                        .map_err(|source| DefinitionError::Entry { index, source })?;
                    descriptors.push(InterfaceDescriptor::from(&event));
                }
                _ => {}
            }
        }

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[InterfaceDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterfaceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl From<InterfaceDescriptor> for InterfaceDefinition {
    fn from(descriptor: InterfaceDescriptor) -> Self {
        Self::new(vec![descriptor])
    }
}

mod hex_identifier {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text.strip_prefix("0x").unwrap_or(&text)).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERC20_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"supply","type":"uint256"}],"stateMutability":"nonpayable"},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]},
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
            "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
            "outputs":[{"name":"","type":"bool"}]},
        {"type":"error","name":"Insufficient","inputs":[]},
        {"type":"event","name":"Approval","anonymous":false,"inputs":[
            {"name":"owner","type":"address","indexed":true},
            {"name":"spender","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    #[test]
    fn test_declaration_order_is_kept() {
        let definition = InterfaceDefinition::from_json(ERC20_ABI).unwrap();
        let names: Vec<&str> = definition.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Transfer", "transfer", "Approval"]);
    }

    #[test]
    fn test_identifiers() {
        let definition = InterfaceDefinition::from_json(ERC20_ABI).unwrap();
        let transfer_event = &definition.descriptors()[0];
        assert_eq!(transfer_event.kind(), DescriptorKind::Event);
        assert_eq!(
            transfer_event.identifier_hex(),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(transfer_event.short_identifier(), Some([0xdd, 0xf2, 0x52, 0xad]));

        let transfer_fn = &definition.descriptors()[1];
        assert_eq!(transfer_fn.kind(), DescriptorKind::Function);
        assert_eq!(transfer_fn.identifier_hex(), "a9059cbb");
        assert_eq!(transfer_fn.signature(), "transfer(address,uint256)");
    }

    #[test]
    fn test_indexed_flags() {
        let definition = InterfaceDefinition::from_json(ERC20_ABI).unwrap();
        let flags: Vec<bool> = definition.descriptors()[0]
            .inputs()
            .iter()
            .map(|p| p.indexed)
            .collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn test_artifact_object_and_tuple_types() {
        let artifact = r#"{"abi":[{"type":"function","name":"submit","stateMutability":"nonpayable",
            "inputs":[{"name":"order","type":"tuple","components":[
                {"name":"amount","type":"uint256"},{"name":"maker","type":"address"}]}],
            "outputs":[]}]}"#;
        let definition = InterfaceDefinition::from_json(artifact).unwrap();
        assert_eq!(definition.descriptors()[0].inputs()[0].kind, "(uint256,address)");
    }

    #[test]
    fn test_rejects_non_abi() {
        assert!(matches!(
            InterfaceDefinition::from_json(r#"{"bytecode":"0x"}"#),
            Err(DefinitionError::NotAnAbi)
        ));
        assert!(matches!(
            InterfaceDefinition::from_json("not json"),
            Err(DefinitionError::Json(_))
        ));
    }

    #[test]
    fn test_parse_function_signature() {
        let descriptor = InterfaceDescriptor::parse_function("transfer(address,uint256)").unwrap();
        assert_eq!(descriptor.identifier(), &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(descriptor.inputs().len(), 2);
        assert!(InterfaceDescriptor::parse_function("transfer(address,").is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_identifier() {
        let descriptor = InterfaceDescriptor::parse_event(
            "Transfer(address indexed from, address indexed to, uint256 value)",
        )
        .unwrap();
        let definition = InterfaceDefinition::from(descriptor);
        let json = serde_json::to_string(&definition).unwrap();
        let back: InterfaceDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, definition);
    }
}
