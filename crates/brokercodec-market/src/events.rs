//! Typed eBlocBroker events.

use alloy_primitives::{Address, B256, U256};
use brokercodec_core::{error::CodecError, DecodedResult, RawLog};
use brokercodec_evm::{decode_event, event_for_topic, ContractCodec};
use serde::Serialize;

use crate::error::MarketError;
use crate::types::{Fields, StorageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogJob {
    pub cluster: Address,
    pub job_key: String,
    pub index: U256,
    pub storage: StorageId,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogReceipt {
    pub cluster: Address,
    pub job_key: String,
    pub index: U256,
    pub recipient: Address,
    pub received: U256,
    pub returned: U256,
    pub end_time: U256,
    pub result_ipfs_hash: String,
    pub storage: StorageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogCluster {
    pub cluster: Address,
    pub core_number: u32,
    pub email: String,
    pub federated_cloud_id: String,
    pub mini_lock_id: String,
    pub core_minute_price: U256,
    pub ipfs_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogUser {
    pub user: Address,
    pub email: String,
    pub federated_cloud_id: String,
    pub mini_lock_id: String,
    pub ipfs_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRefund {
    pub cluster: Address,
    pub job_key: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSetJob {
    pub cluster: Address,
    pub job_key: String,
    pub index: u32,
    pub start_time: U256,
}

/// Any event the contract emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum BrokerEvent {
    LogJob(LogJob),
    LogReceipt(LogReceipt),
    LogCluster(LogCluster),
    LogUser(LogUser),
    LogRefund(LogRefund),
    LogSetJob(LogSetJob),
}

impl BrokerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BrokerEvent::LogJob(_) => "LogJob",
            BrokerEvent::LogReceipt(_) => "LogReceipt",
            BrokerEvent::LogCluster(_) => "LogCluster",
            BrokerEvent::LogUser(_) => "LogUser",
            BrokerEvent::LogRefund(_) => "LogRefund",
            BrokerEvent::LogSetJob(_) => "LogSetJob",
        }
    }

    /// Build the typed event from a generic decode of `name`.
    pub fn from_decoded(name: &str, res: &DecodedResult) -> Result<Self, MarketError> {
        let f = Fields::new(name, res);
        let small_u32 = |i: usize| -> Result<u32, MarketError> {
            u32::try_from(f.small(i)?).map_err(|_| f.unexpected(i, "value exceeds uint32"))
        };
        Ok(match name {
            "LogJob" => BrokerEvent::LogJob(LogJob {
                cluster: f.address(0)?,
                job_key: f.string(1)?,
                index: f.uint(2)?,
                storage: f.storage(3)?,
                description: f.string(4)?,
            }),
            "LogReceipt" => BrokerEvent::LogReceipt(LogReceipt {
                cluster: f.address(0)?,
                job_key: f.string(1)?,
                index: f.uint(2)?,
                recipient: f.address(3)?,
                received: f.uint(4)?,
                returned: f.uint(5)?,
                end_time: f.uint(6)?,
                result_ipfs_hash: f.string(7)?,
                storage: f.storage(8)?,
            }),
            "LogCluster" => BrokerEvent::LogCluster(LogCluster {
                cluster: f.address(0)?,
                core_number: small_u32(1)?,
                email: f.string(2)?,
                federated_cloud_id: f.string(3)?,
                mini_lock_id: f.string(4)?,
                core_minute_price: f.uint(5)?,
                ipfs_address: f.string(6)?,
            }),
            "LogUser" => BrokerEvent::LogUser(LogUser {
                user: f.address(0)?,
                email: f.string(1)?,
                federated_cloud_id: f.string(2)?,
                mini_lock_id: f.string(3)?,
                ipfs_address: f.string(4)?,
            }),
            "LogRefund" => BrokerEvent::LogRefund(LogRefund {
                cluster: f.address(0)?,
                job_key: f.string(1)?,
                index: small_u32(2)?,
            }),
            "LogSetJob" => BrokerEvent::LogSetJob(LogSetJob {
                cluster: f.address(0)?,
                job_key: f.string(1)?,
                index: small_u32(2)?,
                start_time: f.uint(3)?,
            }),
            other => {
                return Err(MarketError::UnexpectedResult {
                    function: other.into(),
                    reason: "not an eBlocBroker event".into(),
                })
            }
        })
    }
}

/// Decode `log` into a typed event.
///
/// Returns `Ok(None)` for logs emitted by another address or carrying a
/// topic 0 the contract does not declare; malformed payloads are errors.
pub fn decode_log(codec: &ContractCodec, log: &RawLog) -> Result<Option<BrokerEvent>, MarketError> {
    if log.address != codec.address() {
        return Ok(None);
    }
    let Some(topic0) = log.signature_topic() else {
        return Ok(None);
    };
    let Ok(spec) = event_for_topic(codec.descriptor(), &topic0) else {
        tracing::trace!(topic = %B256::from(topic0), "unknown topic, skipping log");
        return Ok(None);
    };
    let values = decode_event(spec, &log.topics, &log.data).map_err(CodecError::from)?;
    BrokerEvent::from_decoded(&spec.name, &values).map(Some)
}
