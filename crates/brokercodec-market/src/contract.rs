//! The deployed eBlocBroker contract: address, bundled ABI, and typed call
//! builders for its four function groups.
//!
//! Every builder resolves its function by full signature, encodes the
//! arguments and returns a `PreparedCall`; the matching `decode_*` method
//! turns the bytes a node returns into a typed value.

use alloy_primitives::{Address, U256};
use brokercodec_core::{AbiValue, ContractDescriptor, DecodedResult, FunctionSpec};
use brokercodec_evm::{encode_call, load_descriptor, ContractCodec};

use crate::error::MarketError;
use crate::types::{
    ClusterInfo, ClusterRegistration, Fields, JobInfo, JobReceipt, JobStateCode, JobSubmission, ReceiptNode,
    UserRegistration,
};

/// Address of the eBlocBroker deployment the bundled ABI belongs to.
pub const EBLOCBROKER_ADDRESS: &str = "0x8c22de03d3ce0b9dcb39617e7c31483ec484c720";

/// The eBlocBroker ABI document.
pub const EBLOCBROKER_ABI: &str = include_str!("../abi/eBlocBroker.json");

/// Build the descriptor for the bundled deployment.
pub fn descriptor() -> Result<ContractDescriptor, MarketError> {
    Ok(load_descriptor(EBLOCBROKER_ADDRESS, EBLOCBROKER_ABI)?)
}

/// Canonical signatures of every eBlocBroker function.
pub mod signatures {
    pub const REGISTER_USER: &str = "registerUser(string,string,string,string)";
    pub const REGISTER_CLUSTER: &str = "registerCluster(uint32,string,string,string,uint256,string)";
    pub const UPDATE_CLUSTER: &str = "updateCluster(uint32,string,string,string,uint256,string)";
    pub const DEREGISTER_CLUSTER: &str = "deregisterCluster()";
    pub const SUBMIT_JOB: &str = "submitJob(address,string,uint32,string,uint32,uint8)";
    pub const SET_JOB_STATUS: &str = "setJobStatus(string,uint32,uint8,uint256)";
    pub const RECEIPT_CHECK: &str = "receiptCheck(string,uint32,uint32,string,uint8,uint256)";
    pub const REFUND: &str = "refund(address,string,uint32)";
    pub const IS_USER_EXIST: &str = "isUserExist(address)";
    pub const IS_CLUSTER_EXIST: &str = "isClusterExist(address)";
    pub const GET_USER_INFO: &str = "getUserInfo(address)";
    pub const GET_CLUSTER_INFO: &str = "getClusterInfo(address)";
    pub const GET_CLUSTER_ADDRESSES: &str = "getClusterAddresses()";
    pub const GET_CLUSTER_RECEIVED_AMOUNT: &str = "getClusterReceivedAmount(address)";
    pub const GET_CLUSTER_RECEIPT_SIZE: &str = "getClusterReceiptSize(address)";
    pub const GET_CLUSTER_RECEIPT_NODE: &str = "getClusterReceiptNode(address,uint32)";
    pub const GET_DEPLOYED_BLOCK_NUMBER: &str = "getDeployedBlockNumber()";
    pub const GET_JOB_INFO: &str = "getJobInfo(address,string,uint256)";
    pub const GET_JOB_SIZE: &str = "getJobSize(address,string)";
}

use signatures as sig;

/// An encoded invocation, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    /// Canonical signature of the target function
    pub signature: String,
    pub to: Address,
    /// selector ++ arguments
    pub calldata: Vec<u8>,
    /// Wei attached (non-zero only for payable functions)
    pub value: U256,
}

/// Typed view of the eBlocBroker contract.
#[derive(Debug, Clone)]
pub struct BrokerContract {
    codec: ContractCodec,
}

impl BrokerContract {
    pub fn new(codec: ContractCodec) -> Self {
        Self { codec }
    }

    /// The bundled deployment.
    pub fn bundled() -> Result<Self, MarketError> {
        Ok(Self::new(ContractCodec::new(descriptor()?)))
    }

    pub fn codec(&self) -> &ContractCodec {
        &self.codec
    }

    pub fn address(&self) -> Address {
        self.codec.address()
    }

    fn spec(&self, signature: &str) -> Result<&FunctionSpec, MarketError> {
        Ok(self.codec.function(signature)?)
    }

    fn prepare(&self, signature: &str, args: Vec<AbiValue>, value: U256) -> Result<PreparedCall, MarketError> {
        let spec = self.spec(signature)?;
        let call = encode_call(spec, &args).map_err(brokercodec_core::CodecError::from)?;
        tracing::debug!(function = %signature, bytes = call.arguments.len(), "prepared call");
        Ok(PreparedCall {
            signature: signature.into(),
            to: self.address(),
            calldata: call.to_calldata(),
            value,
        })
    }

    /// Decode the raw return data of `call`.
    pub fn decode(&self, call: &PreparedCall, raw: &[u8]) -> Result<DecodedResult, MarketError> {
        Ok(self.codec.decode_result(&call.signature, raw)?)
    }

    // ─── Identity registration ────────────────────────────────────────────────

    pub fn register_user(&self, user: &UserRegistration) -> Result<PreparedCall, MarketError> {
        self.prepare(
            sig::REGISTER_USER,
            vec![
                user.email.as_str().into(),
                user.federated_cloud_id.as_str().into(),
                user.mini_lock_id.as_str().into(),
                user.ipfs_address.as_str().into(),
            ],
            U256::ZERO,
        )
    }

    // ─── Cluster lifecycle ────────────────────────────────────────────────────

    pub fn register_cluster(&self, cluster: &ClusterRegistration) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::REGISTER_CLUSTER, cluster_args(cluster), U256::ZERO)
    }

    pub fn update_cluster(&self, cluster: &ClusterRegistration) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::UPDATE_CLUSTER, cluster_args(cluster), U256::ZERO)
    }

    pub fn deregister_cluster(&self) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::DEREGISTER_CLUSTER, vec![], U256::ZERO)
    }

    // ─── Job lifecycle ────────────────────────────────────────────────────────

    /// Validate `job` and build the payable `submitJob` call.
    ///
    /// `cluster` (from `getClusterInfo`) supplies the core limit and the
    /// per-minute price the attached payment is computed from.
    pub fn submit_job(&self, job: &JobSubmission, cluster: &ClusterInfo) -> Result<PreparedCall, MarketError> {
        let cores = u32::try_from(cluster.core_number).unwrap_or(u32::MAX);
        job.validate(Some(cores))?;
        let value = job.payment(cluster.core_minute_price)?;
        self.prepare(
            sig::SUBMIT_JOB,
            vec![
                job.cluster.into(),
                job.job_key.as_str().into(),
                job.core.into(),
                job.description.as_str().into(),
                job.core_minute_gas.into(),
                job.storage.code().into(),
            ],
            value,
        )
    }

    pub fn set_job_status(
        &self,
        job_key: &str,
        index: u32,
        state: JobStateCode,
        start_time: U256,
    ) -> Result<PreparedCall, MarketError> {
        self.prepare(
            sig::SET_JOB_STATUS,
            vec![job_key.into(), index.into(), state.code().into(), start_time.into()],
            U256::ZERO,
        )
    }

    pub fn receipt_check(&self, receipt: &JobReceipt) -> Result<PreparedCall, MarketError> {
        self.prepare(
            sig::RECEIPT_CHECK,
            vec![
                receipt.job_key.as_str().into(),
                receipt.index.into(),
                receipt.run_time_minutes.into(),
                receipt.result_ipfs_hash.as_str().into(),
                receipt.storage.code().into(),
                receipt.end_time.into(),
            ],
            U256::ZERO,
        )
    }

    pub fn refund(&self, cluster: Address, job_key: &str, index: u32) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::REFUND, vec![cluster.into(), job_key.into(), index.into()], U256::ZERO)
    }

    // ─── Queries ──────────────────────────────────────────────────────────────

    pub fn is_user_exist(&self, user: Address) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::IS_USER_EXIST, vec![user.into()], U256::ZERO)
    }

    pub fn is_cluster_exist(&self, cluster: Address) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::IS_CLUSTER_EXIST, vec![cluster.into()], U256::ZERO)
    }

    pub fn get_user_info(&self, user: Address) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_USER_INFO, vec![user.into()], U256::ZERO)
    }

    pub fn get_cluster_info(&self, cluster: Address) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_CLUSTER_INFO, vec![cluster.into()], U256::ZERO)
    }

    pub fn get_cluster_addresses(&self) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_CLUSTER_ADDRESSES, vec![], U256::ZERO)
    }

    pub fn get_cluster_received_amount(&self, cluster: Address) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_CLUSTER_RECEIVED_AMOUNT, vec![cluster.into()], U256::ZERO)
    }

    pub fn get_cluster_receipt_size(&self, cluster: Address) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_CLUSTER_RECEIPT_SIZE, vec![cluster.into()], U256::ZERO)
    }

    pub fn get_cluster_receipt_node(&self, cluster: Address, index: u32) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_CLUSTER_RECEIPT_NODE, vec![cluster.into(), index.into()], U256::ZERO)
    }

    pub fn get_deployed_block_number(&self) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_DEPLOYED_BLOCK_NUMBER, vec![], U256::ZERO)
    }

    pub fn get_job_info(&self, cluster: Address, job_key: &str, index: U256) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_JOB_INFO, vec![cluster.into(), job_key.into(), index.into()], U256::ZERO)
    }

    pub fn get_job_size(&self, cluster: Address, job_key: &str) -> Result<PreparedCall, MarketError> {
        self.prepare(sig::GET_JOB_SIZE, vec![cluster.into(), job_key.into()], U256::ZERO)
    }

    // ─── Typed decoding ───────────────────────────────────────────────────────

    /// Single `bool` result (existence checks and the transaction functions'
    /// `success` flag).
    pub fn decode_bool(&self, call: &PreparedCall, raw: &[u8]) -> Result<bool, MarketError> {
        let res = self.decode(call, raw)?;
        Fields::new(&call.signature, &res).boolean(0)
    }

    /// Single unsigned integer result (`getUserInfo`, `getJobSize`, ...).
    pub fn decode_uint(&self, call: &PreparedCall, raw: &[u8]) -> Result<U256, MarketError> {
        let res = self.decode(call, raw)?;
        Fields::new(&call.signature, &res).uint(0)
    }

    pub fn decode_addresses(&self, call: &PreparedCall, raw: &[u8]) -> Result<Vec<Address>, MarketError> {
        let res = self.decode(call, raw)?;
        let fields = Fields::new(&call.signature, &res);
        let items = fields
            .value(0)?
            .as_array()
            .ok_or_else(|| fields.unexpected(0, "expected address[]"))?;
        items
            .iter()
            .map(|v| v.as_address().ok_or_else(|| fields.unexpected(0, "expected address element")))
            .collect()
    }

    pub fn decode_cluster_info(&self, call: &PreparedCall, raw: &[u8]) -> Result<ClusterInfo, MarketError> {
        ClusterInfo::from_result(&self.decode(call, raw)?)
    }

    pub fn decode_job_info(&self, call: &PreparedCall, raw: &[u8]) -> Result<JobInfo, MarketError> {
        JobInfo::from_result(&self.decode(call, raw)?)
    }

    pub fn decode_receipt_node(&self, call: &PreparedCall, raw: &[u8]) -> Result<ReceiptNode, MarketError> {
        ReceiptNode::from_result(&self.decode(call, raw)?)
    }
}

fn cluster_args(cluster: &ClusterRegistration) -> Vec<AbiValue> {
    vec![
        cluster.core_number.into(),
        cluster.email.as_str().into(),
        cluster.federated_cloud_id.as_str().into(),
        cluster.mini_lock_id.as_str().into(),
        cluster.core_minute_price.into(),
        cluster.ipfs_address.as_str().into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageId;
    use brokercodec_evm::encode_result;

    fn contract() -> BrokerContract {
        BrokerContract::bundled().unwrap()
    }

    #[test]
    fn bundled_descriptor_has_every_function() {
        let d = descriptor().unwrap();
        assert_eq!(d.function_count(), 19);
        assert_eq!(d.event_count(), 6);
        for s in [
            sig::REGISTER_USER,
            sig::REGISTER_CLUSTER,
            sig::UPDATE_CLUSTER,
            sig::DEREGISTER_CLUSTER,
            sig::SUBMIT_JOB,
            sig::SET_JOB_STATUS,
            sig::RECEIPT_CHECK,
            sig::REFUND,
            sig::IS_USER_EXIST,
            sig::IS_CLUSTER_EXIST,
            sig::GET_USER_INFO,
            sig::GET_CLUSTER_INFO,
            sig::GET_CLUSTER_ADDRESSES,
            sig::GET_CLUSTER_RECEIVED_AMOUNT,
            sig::GET_CLUSTER_RECEIPT_SIZE,
            sig::GET_CLUSTER_RECEIPT_NODE,
            sig::GET_DEPLOYED_BLOCK_NUMBER,
            sig::GET_JOB_INFO,
            sig::GET_JOB_SIZE,
        ] {
            assert!(d.function(s).is_some(), "{s} missing");
        }
    }

    #[test]
    fn is_user_exist_selector_and_decode() {
        let c = contract();
        let call = c.is_user_exist(Address::repeat_byte(0x86)).unwrap();
        assert_eq!(&call.calldata[..4], &[0x02, 0x55, 0xfa, 0x1e]);
        assert_eq!(call.value, U256::ZERO);

        let mut raw = [0u8; 32];
        raw[31] = 1;
        assert!(c.decode_bool(&call, &raw).unwrap());
        assert!(!c.decode_bool(&call, &[0u8; 32]).unwrap());
    }

    #[test]
    fn submit_job_attaches_payment() {
        let c = contract();
        let job = JobSubmission {
            cluster: Address::repeat_byte(0x4e),
            job_key: "QmefdYEriRiSbeVqGvLx15DKh4WqSMVL8nT4BwvsgVZ7a5".into(),
            core: 2,
            description: "Science".into(),
            core_minute_gas: 10,
            storage: StorageId::Ipfs,
        };
        let cluster = ClusterInfo {
            block_read_from: U256::from(100u64),
            core_number: U256::from(4u64),
            core_minute_price: U256::from(5u64),
        };
        let call = c.submit_job(&job, &cluster).unwrap();
        assert_eq!(call.value, U256::from(100u64));
        assert_eq!(&call.calldata[..4], &[0xad, 0x5b, 0x94, 0x72]);
    }

    #[test]
    fn submit_job_validation_runs_before_encoding() {
        let c = contract();
        let job = JobSubmission {
            cluster: Address::repeat_byte(0x4e),
            job_key: "short".into(),
            core: 1,
            description: String::new(),
            core_minute_gas: 1,
            storage: StorageId::Ipfs,
        };
        let cluster = ClusterInfo {
            block_read_from: U256::ZERO,
            core_number: U256::from(1u64),
            core_minute_price: U256::from(1u64),
        };
        assert!(matches!(c.submit_job(&job, &cluster), Err(MarketError::Validation(_))));
    }

    #[test]
    fn job_info_typed_decode() {
        let c = contract();
        let call = c.get_job_info(Address::repeat_byte(0x01), "QmKey", U256::ZERO).unwrap();
        let spec = c.codec().function(sig::GET_JOB_INFO).unwrap();
        let owner = Address::repeat_byte(0x57);
        let raw = encode_result(
            spec,
            &[
                AbiValue::from(4u8),
                AbiValue::from(2u32),
                AbiValue::from(1_533_000_000u64),
                AbiValue::from(1000u64),
                AbiValue::from(5u64),
                AbiValue::from(60u64),
                AbiValue::Address(owner),
            ],
        )
        .unwrap();
        let info = c.decode_job_info(&call, &raw).unwrap();
        assert_eq!(info.status, JobStateCode::Running);
        assert_eq!(info.core, 2);
        assert_eq!(info.job_owner, owner);
    }

    #[test]
    fn cluster_addresses_typed_decode() {
        let c = contract();
        let call = c.get_cluster_addresses().unwrap();
        assert_eq!(call.calldata, vec![0x8c, 0xd7, 0x28, 0xc9]);
        let spec = c.codec().function(sig::GET_CLUSTER_ADDRESSES).unwrap();
        let clusters = vec![Address::repeat_byte(0x0a), Address::repeat_byte(0x0b)];
        let raw = encode_result(
            spec,
            &[AbiValue::Array(clusters.iter().copied().map(AbiValue::Address).collect())],
        )
        .unwrap();
        assert_eq!(c.decode_addresses(&call, &raw).unwrap(), clusters);
    }

    #[test]
    fn receipt_node_negative_core() {
        let c = contract();
        let call = c.get_cluster_receipt_node(Address::repeat_byte(0x01), 3).unwrap();
        let spec = c.codec().function(sig::GET_CLUSTER_RECEIPT_NODE).unwrap();
        let raw = encode_result(
            spec,
            &[
                AbiValue::from(60u64),
                AbiValue::Int(alloy_primitives::I256::try_from(-2i64).unwrap()),
            ],
        )
        .unwrap();
        let node = c.decode_receipt_node(&call, &raw).unwrap();
        assert_eq!(node.core, -2);
        assert_eq!(node.time, U256::from(60u64));
    }
}
