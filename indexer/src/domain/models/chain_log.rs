use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block bound of a log query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Earliest,
    Latest,
    Number(u64),
}

impl BlockTag {
    /// Value for the `fromBlock`/`toBlock` fields of `eth_getLogs`
    pub fn to_rpc_param(&self) -> String {
        match self {
            BlockTag::Earliest => "earliest".to_string(),
            BlockTag::Latest => "latest".to_string(),
            BlockTag::Number(n) => format!("0x{:x}", n),
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Earliest => write!(f, "earliest"),
            BlockTag::Latest => write!(f, "latest"),
            BlockTag::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Log entry as returned by `eth_getLogs`.
///
/// Position fields are optional because nodes report them as `null` for
/// pending logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default, with = "quantity")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default, with = "quantity")]
    pub transaction_index: Option<u64>,
    #[serde(default, with = "quantity")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

/// Hex quantities (`"0x1a"`) as used by Ethereum JSON-RPC
mod quantity {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => s.serialize_str(&format!("0x{:x}", n)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| {
            let digits = s.strip_prefix("0x").unwrap_or(&s);
            u64::from_str_radix(digits, 16)
                .map_err(|e| D::Error::custom(format!("invalid quantity {:?}: {}", s, e)))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_rpc_block_params() {
        assert_eq!(BlockTag::Number(101).to_rpc_param(), "0x65");
        assert_eq!(BlockTag::Latest.to_rpc_param(), "latest");
        assert_eq!(BlockTag::Earliest.to_rpc_param(), "earliest");
    }

    #[test]
    fn parses_rpc_log() {
        let log: RawLog = serde_json::from_value(json!({
            "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "topics": ["0x0000000000000000000000000000000000000000000000000000000000000001"],
            "data": "0x",
            "blockNumber": "0x64",
            "blockHash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000abc",
            "transactionIndex": "0x2",
            "logIndex": "0x5",
            "removed": false
        }))
        .unwrap();

        assert_eq!(log.block_number, Some(100));
        assert_eq!(log.transaction_index, Some(2));
        assert_eq!(log.log_index, Some(5));
        assert_eq!(log.topics.len(), 1);
        assert!(log.data.is_empty());
    }

    #[test]
    fn pending_log_has_no_position() {
        let log: RawLog = serde_json::from_value(json!({
            "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "topics": [],
            "data": "0x",
            "blockNumber": null,
            "blockHash": null,
            "transactionHash": null,
            "transactionIndex": null,
            "logIndex": null
        }))
        .unwrap();

        assert_eq!(log.block_number, None);
        assert_eq!(log.transaction_hash, None);
    }
}
