//! Raw event logs as handed over by the transport.

use alloy_primitives::{Address, B256};

use crate::descriptor::parse_address;

/// An undecoded log entry from a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// Contract that emitted the log
    pub address: Address,
    /// topics[0] is the event signature hash (unless anonymous);
    /// topics[1..] are indexed parameters.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed parameters
    pub data: Vec<u8>,
}

impl RawLog {
    pub fn new(address: Address, topics: Vec<B256>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    /// Build from hex strings as they appear in JSON-RPC receipts.
    pub fn from_hex(address: &str, topics: &[String], data: &str) -> Result<Self, String> {
        let address = parse_address(address)?;
        let topics = topics
            .iter()
            .map(|t| {
                let bytes = hex::decode(t.strip_prefix("0x").unwrap_or(t))
                    .map_err(|e| format!("invalid topic hex '{t}': {e}"))?;
                if bytes.len() != 32 {
                    return Err(format!("topic '{t}' is {} bytes, expected 32", bytes.len()));
                }
                Ok(B256::from_slice(&bytes))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let data = hex::decode(data.strip_prefix("0x").unwrap_or(data))
            .map_err(|e| format!("invalid data hex: {e}"))?;
        Ok(Self::new(address, topics, data))
    }

    /// topics[0] as a byte array, if present.
    pub fn signature_topic(&self) -> Option<[u8; 32]> {
        self.topics.first().map(|t| t.0)
    }
}
