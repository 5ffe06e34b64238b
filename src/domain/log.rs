//! Raw event-log records as they arrive from a chain client

use serde::Deserialize;
use thiserror::Error;

use super::hex::{decode_hex, InvalidHex};

/// An undecoded log record
///
/// Topics are kept as the hex text the node returned. They are only decoded
/// when a matcher looks at them, so a malformed topic turns into a decode
/// failure rather than being rejected at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLog {
    pub first_topic: Option<String>,
    pub second_topic: Option<String>,
    pub third_topic: Option<String>,
    pub fourth_topic: Option<String>,
    /// ABI-encoded non-indexed payload
    pub data: Vec<u8>,
    /// Contract that emitted the log
    pub address: String,
    /// Originating transaction, used to identify the log in diagnostics
    pub transaction_hash: Option<String>,
}

impl RawLog {
    /// Build a log from up to four topic slots, in order
    pub fn new<I>(address: impl Into<String>, topics: I, data: Vec<u8>) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut slots = topics.into_iter();
        Self {
            first_topic: slots.next().flatten(),
            second_topic: slots.next().flatten(),
            third_topic: slots.next().flatten(),
            fourth_topic: slots.next().flatten(),
            data,
            address: address.into(),
            transaction_hash: None,
        }
    }

    pub fn with_transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    /// All four topic slots in order
    pub fn topics(&self) -> [Option<&str>; 4] {
        [
            self.first_topic.as_deref(),
            self.second_topic.as_deref(),
            self.third_topic.as_deref(),
            self.fourth_topic.as_deref(),
        ]
    }
}

/// Errors turning an RPC log object into a [`RawLog`]
#[derive(Debug, Error)]
pub enum LogParseError {
    #[error("log has {0} topics, at most 4 are allowed")]
    TooManyTopics(usize),

    #[error("log data is not valid hex: {0}")]
    Data(#[from] InvalidHex),
}

/// Log object in the shape returned by `eth_getLogs` / receipts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<Option<String>>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl TryFrom<RpcLog> for RawLog {
    type Error = LogParseError;

    fn try_from(log: RpcLog) -> Result<Self, Self::Error> {
        if log.topics.len() > 4 {
            return Err(LogParseError::TooManyTopics(log.topics.len()));
        }
        let data = decode_hex(log.data.as_deref())?.unwrap_or_default();
        let mut raw = RawLog::new(log.address, log.topics, data);
        raw.transaction_hash = log.transaction_hash;
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_slots_in_order() {
        let log = RawLog::new(
            "0xabc",
            vec![Some("0x01".to_string()), None, Some("0x03".to_string())],
            vec![],
        );
        assert_eq!(log.topics(), [Some("0x01"), None, Some("0x03"), None]);
    }

    #[test]
    fn test_rpc_log_conversion() {
        let json = r#"{
            "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "data": "0x00ff",
            "transactionHash": "0xfeed"
        }"#;
        let rpc: RpcLog = serde_json::from_str(json).unwrap();
        let log = RawLog::try_from(rpc).unwrap();
        assert_eq!(log.data, vec![0x00, 0xff]);
        assert_eq!(log.transaction_hash.as_deref(), Some("0xfeed"));
        assert!(log.second_topic.is_none());
    }

    #[test]
    fn test_rpc_log_rejects_bad_data() {
        let rpc = RpcLog {
            address: "0x00".into(),
            topics: vec![],
            data: Some("0xnothex".into()),
            transaction_hash: None,
        };
        assert!(matches!(RawLog::try_from(rpc), Err(LogParseError::Data(_))));
    }

    #[test]
    fn test_rpc_log_rejects_five_topics() {
        let rpc = RpcLog {
            address: "0x00".into(),
            topics: vec![None, None, None, None, None],
            data: None,
            transaction_hash: None,
        };
        assert!(matches!(
            RawLog::try_from(rpc),
            Err(LogParseError::TooManyTopics(5))
        ));
    }
}
