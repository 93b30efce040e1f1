//! Contract ABI based log decoding

use alloy_dyn_abi::{DynSolValue, EventExt};
use alloy_json_abi::{Event, JsonAbi};
use alloy_primitives::B256;
use std::collections::HashMap;
use std::fs;

use crate::config::{ContractKind, StreamConfig};
use crate::domain::errors::DecodeError;
use crate::domain::models::{ArgValue, DecodedLog, RawLog};

const DATA_REGISTRY_ABI: &str = include_str!("../../../abi/DataRegistry.json");
const COMPENSATION_ABI: &str = include_str!("../../../abi/Compensation.json");

/// Decodes logs of one contract, matching topic 0 against its event selectors
#[derive(Debug, Clone)]
pub struct AbiEventDecoder {
    contract: String,
    events: HashMap<B256, Event>,
}

impl AbiEventDecoder {
    /// Build a decoder from an ABI JSON document
    pub fn from_json(contract: &str, abi_json: &str) -> Result<Self, DecodeError> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| DecodeError::InvalidAbi(e.to_string()))?;

        // Anonymous events carry no selector and cannot be matched by topic
        let events = abi
            .events()
            .filter(|event| !event.anonymous)
            .map(|event| (event.selector(), event.clone()))
            .collect();

        Ok(Self {
            contract: contract.to_string(),
            events,
        })
    }

    /// Decoder for the ABI shipped with the crate
    pub fn builtin(kind: ContractKind) -> Result<Self, DecodeError> {
        let abi_json = match kind {
            ContractKind::DataRegistry => DATA_REGISTRY_ABI,
            ContractKind::Compensation => COMPENSATION_ABI,
        };
        Self::from_json(&kind.to_string(), abi_json)
    }

    /// Decoder for a configured stream, preferring its ABI file when set
    pub fn for_stream(stream: &StreamConfig) -> Result<Self, DecodeError> {
        match &stream.abi_path {
            Some(path) => {
                let abi_json = fs::read_to_string(path).map_err(|e| {
                    DecodeError::InvalidAbi(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_json(&stream.contract.to_string(), &abi_json)
            }
            None => Self::builtin(stream.contract),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Names of all decodable events, sorted
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.events.values().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Decode a log into its event name, signature, topic and arguments
    pub fn decode(&self, log: &RawLog) -> Result<DecodedLog, DecodeError> {
        let topic = log.topics.first().ok_or(DecodeError::MissingTopic)?;
        let event = self
            .events
            .get(topic)
            .ok_or_else(|| DecodeError::UnknownTopic(topic.to_string()))?;

        let decoded = event
            .decode_log_parts(log.topics.iter().copied(), &log.data, true)
            .map_err(|e| DecodeError::InvalidArguments {
                event: event.name.clone(),
                reason: e.to_string(),
            })?;

        // Indexed and body values come back split; restore declaration order
        let mut indexed = decoded.indexed.iter();
        let mut body = decoded.body.iter();
        let args = event
            .inputs
            .iter()
            .map(|input| {
                let value = if input.indexed { indexed.next() } else { body.next() };
                value
                    .ok_or_else(|| format!("missing value for input {}", input.name))
                    .and_then(arg_value)
                    .map_err(|reason| DecodeError::InvalidArguments {
                        event: event.name.clone(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DecodedLog {
            name: event.name.clone(),
            signature: event.signature(),
            topic: topic.to_string(),
            args,
        })
    }
}

/// Values with no JSON representation in the event store are rejected
fn arg_value(value: &DynSolValue) -> Result<ArgValue, String> {
    let converted = match value {
        DynSolValue::Address(address) => ArgValue::Address(address.to_checksum(None)),
        DynSolValue::Bool(b) => ArgValue::Bool(*b),
        DynSolValue::Uint(n, _) => ArgValue::Uint(n.to_string()),
        DynSolValue::Int(n, _) => ArgValue::Int(n.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            ArgValue::FixedBytes(format!("0x{}", hex::encode(&word.as_slice()[..*size])))
        }
        DynSolValue::Bytes(bytes) => ArgValue::Bytes(format!("0x{}", hex::encode(bytes))),
        DynSolValue::String(s) => ArgValue::String(s.clone()),
        DynSolValue::Function(function) => {
            ArgValue::FixedBytes(format!("0x{}", hex::encode(function.0.as_slice())))
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            ArgValue::Array(items.iter().map(arg_value).collect::<Result<_, _>>()?)
        }
        DynSolValue::Tuple(items) => {
            ArgValue::Tuple(items.iter().map(arg_value).collect::<Result<_, _>>()?)
        }
        // Only present when another crate enables alloy-dyn-abi's eip712 feature
        #[allow(unreachable_patterns)]
        other => return Err(format!("unsupported value type {:?}", other.as_type())),
    };
    Ok(converted)
}
