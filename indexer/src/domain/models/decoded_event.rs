use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ArgValue, RawLog};
use crate::domain::errors::DecodeError;

/// Result of matching a raw log against a contract ABI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    pub name: String,
    /// Canonical event signature, e.g. `ProducerRecordAdded(address)`
    pub signature: String,
    /// 0x-prefixed keccak hash of the signature (topic 0)
    pub topic: String,
    /// Arguments in ABI declaration order
    pub args: Vec<ArgValue>,
}

/// How event rows are keyed inside their stream partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKeying {
    /// One row per transaction; a later event of the same transaction
    /// replaces an earlier one.
    #[default]
    TransactionHash,
    /// One row per log: `"{transactionHash}:{logIndex}"`
    TransactionHashAndLogIndex,
}

impl EventKeying {
    pub fn row_key(&self, transaction_hash: &str, log_index: u64) -> String {
        match self {
            EventKeying::TransactionHash => transaction_hash.to_string(),
            EventKeying::TransactionHashAndLogIndex => format!("{}:{}", transaction_hash, log_index),
        }
    }
}

impl FromStr for EventKeying {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tx_hash" => Ok(EventKeying::TransactionHash),
            "tx_hash_log_index" => Ok(EventKeying::TransactionHashAndLogIndex),
            other => Err(format!("unknown event row key scheme: {}", other)),
        }
    }
}

impl fmt::Display for EventKeying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKeying::TransactionHash => write!(f, "tx_hash"),
            EventKeying::TransactionHashAndLogIndex => write!(f, "tx_hash_log_index"),
        }
    }
}

/// One on-chain log entry decoded and ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedEvent {
    pub partition_key: String,
    pub row_key: String,
    #[serde(with = "decimal_string")]
    pub block_number: u64,
    pub block_hash: String,
    pub transaction_hash: String,
    pub transaction_index: u64,
    pub log_index: u64,
    #[serde(rename = "eAddress")]
    pub address: String,
    #[serde(rename = "eData")]
    pub data: String,
    pub topics: Vec<String>,
    pub args: Vec<ArgValue>,
    #[serde(rename = "eSignature")]
    pub signature: String,
    #[serde(rename = "eName")]
    pub name: String,
    #[serde(rename = "eTopic")]
    pub topic: String,
    /// Wall-clock time of decoding, not the block timestamp
    #[serde(rename = "eTimestamp")]
    pub decoded_at: DateTime<Utc>,
}

impl DecodedEvent {
    /// Combine a raw log with its decoded form under `stream`
    pub fn from_log(
        stream: &str,
        log: &RawLog,
        decoded: DecodedLog,
        keying: EventKeying,
        decoded_at: DateTime<Utc>,
    ) -> Result<Self, DecodeError> {
        let block_number = log
            .block_number
            .ok_or(DecodeError::IncompleteLog("blockNumber"))?;
        let block_hash = log
            .block_hash
            .ok_or(DecodeError::IncompleteLog("blockHash"))?;
        let transaction_hash = log
            .transaction_hash
            .ok_or(DecodeError::IncompleteLog("transactionHash"))?
            .to_string();
        let log_index = log.log_index.ok_or(DecodeError::IncompleteLog("logIndex"))?;

        Ok(Self {
            partition_key: stream.to_string(),
            row_key: keying.row_key(&transaction_hash, log_index),
            block_number,
            block_hash: block_hash.to_string(),
            transaction_hash,
            transaction_index: log.transaction_index.unwrap_or_default(),
            log_index,
            address: log.address.to_checksum(None),
            data: format!("0x{}", hex::encode(&log.data)),
            topics: log.topics.iter().map(|t| t.to_string()).collect(),
            args: decoded.args,
            signature: decoded.signature,
            name: decoded.name,
            topic: decoded.topic,
            decoded_at,
        })
    }
}

mod decimal_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        String::deserialize(d)?.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256};

    fn raw_log() -> RawLog {
        RawLog {
            address: Address::repeat_byte(0x11),
            topics: vec![B256::repeat_byte(0x01)],
            data: Bytes::from(vec![0xde, 0xad]),
            block_number: Some(100),
            block_hash: Some(B256::repeat_byte(0xaa)),
            transaction_hash: Some(B256::with_last_byte(0xbc)),
            transaction_index: Some(3),
            log_index: Some(7),
            removed: false,
        }
    }

    fn decoded() -> DecodedLog {
        DecodedLog {
            name: "ProducerRecordAdded".into(),
            signature: "ProducerRecordAdded(address)".into(),
            topic: B256::repeat_byte(0x01).to_string(),
            args: vec![ArgValue::Address("0xP1".into())],
        }
    }

    #[test]
    fn builds_event_from_log() {
        let event = DecodedEvent::from_log(
            "LedUpBlockchain",
            &raw_log(),
            decoded(),
            EventKeying::TransactionHash,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(event.partition_key, "LedUpBlockchain");
        assert_eq!(event.row_key, event.transaction_hash);
        assert_eq!(event.block_number, 100);
        assert_eq!(event.data, "0xdead");
        assert_eq!(event.log_index, 7);
        assert_eq!(event.name, "ProducerRecordAdded");
    }

    #[test]
    fn log_index_keying_separates_events_of_one_transaction() {
        let event = DecodedEvent::from_log(
            "LedUpBlockchain",
            &raw_log(),
            decoded(),
            EventKeying::TransactionHashAndLogIndex,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(event.row_key, format!("{}:7", event.transaction_hash));
    }

    #[test]
    fn rejects_pending_log() {
        let mut log = raw_log();
        log.block_number = None;

        let err = DecodedEvent::from_log(
            "LedUpBlockchain",
            &log,
            decoded(),
            EventKeying::TransactionHash,
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, DecodeError::IncompleteLog("blockNumber")));
    }

    #[test]
    fn serializes_with_table_field_names() {
        let event = DecodedEvent::from_log(
            "LedUpBlockchain",
            &raw_log(),
            decoded(),
            EventKeying::TransactionHash,
            Utc::now(),
        )
        .unwrap();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["blockNumber"], "100");
        assert_eq!(json["eName"], "ProducerRecordAdded");
        assert_eq!(json["eSignature"], "ProducerRecordAdded(address)");
        assert!(json["eTimestamp"].is_string());

        let back: DecodedEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn parses_row_key_scheme() {
        assert_eq!("tx_hash".parse::<EventKeying>(), Ok(EventKeying::TransactionHash));
        assert_eq!(
            "TX_HASH_LOG_INDEX".parse::<EventKeying>(),
            Ok(EventKeying::TransactionHashAndLogIndex)
        );
        assert!("by_block".parse::<EventKeying>().is_err());
    }
}
