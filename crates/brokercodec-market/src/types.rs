//! eBlocBroker domain types: storage backends, job states, and the typed
//! shapes of query results and transaction inputs.

use alloy_primitives::{Address, U256};
use brokercodec_core::{AbiValue, DecodedResult};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, ValidationError};

/// Where a job's input data lives. Encoded as `uint8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageId {
    Ipfs = 0,
    Eudat = 1,
    IpfsGpg = 2,
    Github = 3,
    Gdrive = 4,
}

impl StorageId {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Exact job key length the backend produces, if it has a fixed one.
    /// IPFS keys are base58 multihashes (46 chars); Google Drive ids are 33.
    pub fn required_key_len(self) -> Option<usize> {
        match self {
            StorageId::Ipfs | StorageId::IpfsGpg => Some(46),
            StorageId::Gdrive => Some(33),
            StorageId::Eudat | StorageId::Github => None,
        }
    }
}

impl TryFrom<u8> for StorageId {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => StorageId::Ipfs,
            1 => StorageId::Eudat,
            2 => StorageId::IpfsGpg,
            3 => StorageId::Github,
            4 => StorageId::Gdrive,
            other => return Err(ValidationError::UnknownStorageId(other)),
        })
    }
}

impl std::fmt::Display for StorageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StorageId::Ipfs => "ipfs",
            StorageId::Eudat => "eudat",
            StorageId::IpfsGpg => "ipfs_gpg",
            StorageId::Github => "github",
            StorageId::Gdrive => "gdrive",
        };
        write!(f, "{s}")
    }
}

/// Job lifecycle state as stored by the contract (`uint8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStateCode {
    Null = 0,
    Completed = 1,
    Refunded = 2,
    Pending = 3,
    Running = 4,
    BootFail = 5,
    Cancelled = 6,
    Configuring = 7,
    Completing = 8,
    Failed = 9,
    NodeFail = 10,
    Preempted = 11,
    Revoked = 12,
    SpecialExit = 13,
    Stopped = 14,
    Suspended = 15,
    Timeout = 16,
}

impl JobStateCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// States after which the job will not change again.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            JobStateCode::Completed | JobStateCode::Refunded | JobStateCode::Cancelled | JobStateCode::Failed
        )
    }
}

impl TryFrom<u8> for JobStateCode {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use JobStateCode::*;
        Ok(match code {
            0 => Null,
            1 => Completed,
            2 => Refunded,
            3 => Pending,
            4 => Running,
            5 => BootFail,
            6 => Cancelled,
            7 => Configuring,
            8 => Completing,
            9 => Failed,
            10 => NodeFail,
            11 => Preempted,
            12 => Revoked,
            13 => SpecialExit,
            14 => Stopped,
            15 => Suspended,
            16 => Timeout,
            other => return Err(ValidationError::UnknownJobState(other)),
        })
    }
}

// ─── Query results ────────────────────────────────────────────────────────────

/// `getClusterInfo(address)` → `(blockReadFrom, coreNumber, coreMinutePrice)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    /// Block holding the cluster's latest `LogCluster` event
    pub block_read_from: U256,
    pub core_number: U256,
    /// Wei per core-minute
    pub core_minute_price: U256,
}

impl ClusterInfo {
    pub(crate) fn from_result(res: &DecodedResult) -> Result<Self, MarketError> {
        let f = Fields::new("getClusterInfo", res);
        Ok(Self {
            block_read_from: f.uint(0)?,
            core_number: f.uint(1)?,
            core_minute_price: f.uint(2)?,
        })
    }
}

/// `getJobInfo(address,string,uint256)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub status: JobStateCode,
    pub core: u32,
    pub start_time: U256,
    pub received: U256,
    pub core_minute_price: U256,
    pub core_minute_gas: U256,
    pub job_owner: Address,
}

impl JobInfo {
    pub(crate) fn from_result(res: &DecodedResult) -> Result<Self, MarketError> {
        let f = Fields::new("getJobInfo", res);
        let status = u8::try_from(f.small(0)?).map_err(|_| f.unexpected(0, "status does not fit uint8"))?;
        Ok(Self {
            status: JobStateCode::try_from(status)?,
            core: u32::try_from(f.small(1)?).map_err(|_| f.unexpected(1, "core does not fit uint32"))?,
            start_time: f.uint(2)?,
            received: f.uint(3)?,
            core_minute_price: f.uint(4)?,
            core_minute_gas: f.uint(5)?,
            job_owner: f.address(6)?,
        })
    }
}

/// One entry of a cluster's core-usage timeline: at `time`, `core` cores
/// were added (positive) or released (negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptNode {
    pub time: U256,
    pub core: i32,
}

impl ReceiptNode {
    pub(crate) fn from_result(res: &DecodedResult) -> Result<Self, MarketError> {
        let f = Fields::new("getClusterReceiptNode", res);
        let core = f
            .value(1)?
            .as_int()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| f.unexpected(1, "expected int32"))?;
        Ok(Self {
            time: f.uint(0)?,
            core,
        })
    }
}

// ─── Transaction inputs ───────────────────────────────────────────────────────

/// `registerUser(userEmail, fID, miniLockID, ipfsAddress)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    pub email: String,
    /// EUDAT federated cloud id
    pub federated_cloud_id: String,
    pub mini_lock_id: String,
    /// IPFS swarm address
    pub ipfs_address: String,
}

/// Arguments shared by `registerCluster` and `updateCluster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRegistration {
    pub core_number: u32,
    pub email: String,
    pub federated_cloud_id: String,
    pub mini_lock_id: String,
    /// Wei per core-minute
    pub core_minute_price: U256,
    pub ipfs_address: String,
}

/// A job to run on a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSubmission {
    pub cluster: Address,
    pub job_key: String,
    pub core: u32,
    pub description: String,
    /// Requested run time in minutes
    pub core_minute_gas: u32,
    pub storage: StorageId,
}

impl JobSubmission {
    /// Client-side checks mirroring the contract's `require`s, so a doomed
    /// transaction is never sent. `cluster_cores` is the cluster's core
    /// count when known.
    pub fn validate(&self, cluster_cores: Option<u32>) -> Result<(), ValidationError> {
        let key_len = self.job_key.chars().count();
        if let Some(expected) = self.storage.required_key_len() {
            if key_len != expected {
                return Err(ValidationError::JobKeyLength {
                    storage: self.storage.to_string(),
                    expected,
                    got: key_len,
                });
            }
        }
        if key_len >= 64 {
            return Err(ValidationError::JobKeyTooLong { got: key_len });
        }
        let desc_len = self.description.chars().count();
        if desc_len >= 128 {
            return Err(ValidationError::DescriptionTooLong { got: desc_len });
        }
        if self.core_minute_gas == 0 {
            return Err(ValidationError::ZeroCoreMinuteGas);
        }
        if let Some(available) = cluster_cores {
            if self.core > available {
                return Err(ValidationError::TooManyCores {
                    requested: self.core,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Wei to attach: `core × core_minute_price × core_minute_gas`.
    pub fn payment(&self, core_minute_price: U256) -> Result<U256, ValidationError> {
        U256::from(self.core)
            .checked_mul(core_minute_price)
            .and_then(|v| v.checked_mul(U256::from(self.core_minute_gas)))
            .ok_or(ValidationError::PaymentOverflow {
                core: self.core,
                core_minute_price,
                core_minute_gas: self.core_minute_gas,
            })
    }
}

/// Run time in minutes from a days/hours/minutes split.
pub fn core_minute_gas(days: u32, hours: u32, minutes: u32) -> u32 {
    minutes
        .saturating_add(hours.saturating_mul(60))
        .saturating_add(days.saturating_mul(1440))
}

/// `receiptCheck(jobKey, index, jobRunTimeMinute, resultIpfsHash, storageID, endTime)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReceipt {
    pub job_key: String,
    pub index: u32,
    pub run_time_minutes: u32,
    pub result_ipfs_hash: String,
    pub storage: StorageId,
    pub end_time: U256,
}

// ─── Field access ─────────────────────────────────────────────────────────────

/// Positional / named access to a `DecodedResult` with errors that name the
/// function being decoded.
pub(crate) struct Fields<'a> {
    function: &'a str,
    res: &'a DecodedResult,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(function: &'a str, res: &'a DecodedResult) -> Self {
        Self { function, res }
    }

    pub(crate) fn unexpected(&self, index: usize, reason: &str) -> MarketError {
        MarketError::UnexpectedResult {
            function: self.function.into(),
            reason: format!("value {index}: {reason}"),
        }
    }

    pub(crate) fn value(&self, index: usize) -> Result<&'a AbiValue, MarketError> {
        self.res
            .get(index)
            .ok_or_else(|| self.unexpected(index, "missing"))
    }

    pub(crate) fn uint(&self, index: usize) -> Result<U256, MarketError> {
        self.value(index)?
            .as_uint()
            .ok_or_else(|| self.unexpected(index, "expected unsigned integer"))
    }

    /// Unsigned value that must fit `u64`.
    pub(crate) fn small(&self, index: usize) -> Result<u64, MarketError> {
        self.value(index)?
            .as_u64()
            .ok_or_else(|| self.unexpected(index, "expected small unsigned integer"))
    }

    pub(crate) fn address(&self, index: usize) -> Result<Address, MarketError> {
        self.value(index)?
            .as_address()
            .ok_or_else(|| self.unexpected(index, "expected address"))
    }

    pub(crate) fn string(&self, index: usize) -> Result<String, MarketError> {
        self.value(index)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.unexpected(index, "expected string"))
    }

    pub(crate) fn boolean(&self, index: usize) -> Result<bool, MarketError> {
        self.value(index)?
            .as_bool()
            .ok_or_else(|| self.unexpected(index, "expected bool"))
    }

    pub(crate) fn storage(&self, index: usize) -> Result<StorageId, MarketError> {
        let code = u8::try_from(self.small(index)?).map_err(|_| self.unexpected(index, "storage id does not fit uint8"))?;
        Ok(StorageId::try_from(code)?)
    }
}
