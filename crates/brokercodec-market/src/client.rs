//! `BrokerClient`: typed async access to eBlocBroker through a transport.
//!
//! Queries go out as `eth_call` and come back as typed values. Transactions
//! are tracked from `send` until their receipt is confirmed; the receipt's
//! logs are decoded into `BrokerEvent`s.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use alloy_primitives::{Address, B256, U256};

use crate::contract::{BrokerContract, PreparedCall};
use crate::error::{MarketError, ValidationError};
use crate::events::{self, BrokerEvent};
use crate::transport::{ContractTransport, TransactionRequest};
use crate::types::{
    ClusterInfo, ClusterRegistration, JobInfo, JobReceipt, JobStateCode, JobSubmission, ReceiptNode,
    UserRegistration,
};

/// A transaction that has been broadcast but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub signature: String,
    pub value: U256,
}

/// What a confirmed transaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub function: String,
    pub block_number: u64,
    pub gas_used: u64,
    /// Contract events from the receipt, in log order
    pub events: Vec<BrokerEvent>,
}

pub struct BrokerClient<T: ContractTransport + ?Sized = dyn ContractTransport> {
    contract: BrokerContract,
    transport: Arc<T>,
    sender: Option<Address>,
    in_flight: RwLock<HashMap<B256, InFlight>>,
}

impl<T: ContractTransport + ?Sized> BrokerClient<T> {
    pub fn new(contract: BrokerContract, transport: Arc<T>) -> Self {
        Self {
            contract,
            transport,
            sender: None,
            in_flight: RwLock::new(HashMap::new()),
        }
    }

    /// Account transactions are sent from; also checked for registration
    /// before a job is submitted.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn contract(&self) -> &BrokerContract {
        &self.contract
    }

    /// Transactions sent but not yet confirmed, keyed by hash.
    pub fn in_flight(&self) -> HashMap<B256, InFlight> {
        self.in_flight
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn forget(&self, tx_hash: &B256) {
        self.in_flight
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tx_hash);
    }

    async fn query(&self, call: &PreparedCall) -> Result<Vec<u8>, MarketError> {
        tracing::trace!(function = %call.signature, "eth_call");
        Ok(self.transport.call(call.to, call.calldata.clone()).await?)
    }

    // ─── Queries ──────────────────────────────────────────────────────────────

    pub async fn is_user_exist(&self, user: Address) -> Result<bool, MarketError> {
        let call = self.contract.is_user_exist(user)?;
        self.contract.decode_bool(&call, &self.query(&call).await?)
    }

    pub async fn is_cluster_exist(&self, cluster: Address) -> Result<bool, MarketError> {
        let call = self.contract.is_cluster_exist(cluster)?;
        self.contract.decode_bool(&call, &self.query(&call).await?)
    }

    /// Block number the user registered at.
    pub async fn get_user_info(&self, user: Address) -> Result<U256, MarketError> {
        let call = self.contract.get_user_info(user)?;
        self.contract.decode_uint(&call, &self.query(&call).await?)
    }

    pub async fn get_cluster_info(&self, cluster: Address) -> Result<ClusterInfo, MarketError> {
        let call = self.contract.get_cluster_info(cluster)?;
        self.contract.decode_cluster_info(&call, &self.query(&call).await?)
    }

    pub async fn get_cluster_addresses(&self) -> Result<Vec<Address>, MarketError> {
        let call = self.contract.get_cluster_addresses()?;
        self.contract.decode_addresses(&call, &self.query(&call).await?)
    }

    pub async fn get_cluster_received_amount(&self, cluster: Address) -> Result<U256, MarketError> {
        let call = self.contract.get_cluster_received_amount(cluster)?;
        self.contract.decode_uint(&call, &self.query(&call).await?)
    }

    pub async fn get_cluster_receipt_size(&self, cluster: Address) -> Result<u32, MarketError> {
        let call = self.contract.get_cluster_receipt_size(cluster)?;
        let size = self.contract.decode_uint(&call, &self.query(&call).await?)?;
        u32::try_from(size).map_err(|_| MarketError::UnexpectedResult {
            function: call.signature,
            reason: format!("receipt size {size} exceeds uint32"),
        })
    }

    pub async fn get_cluster_receipt_node(&self, cluster: Address, index: u32) -> Result<ReceiptNode, MarketError> {
        let call = self.contract.get_cluster_receipt_node(cluster, index)?;
        self.contract.decode_receipt_node(&call, &self.query(&call).await?)
    }

    pub async fn get_deployed_block_number(&self) -> Result<U256, MarketError> {
        let call = self.contract.get_deployed_block_number()?;
        self.contract.decode_uint(&call, &self.query(&call).await?)
    }

    pub async fn get_job_info(&self, cluster: Address, job_key: &str, index: U256) -> Result<JobInfo, MarketError> {
        let call = self.contract.get_job_info(cluster, job_key, index)?;
        self.contract.decode_job_info(&call, &self.query(&call).await?)
    }

    /// Number of jobs submitted to `cluster` under `job_key`.
    pub async fn get_job_size(&self, cluster: Address, job_key: &str) -> Result<U256, MarketError> {
        let call = self.contract.get_job_size(cluster, job_key)?;
        self.contract.decode_uint(&call, &self.query(&call).await?)
    }

    // ─── Transactions ─────────────────────────────────────────────────────────

    /// Broadcast `call` and track it until `confirm` sees its receipt.
    pub async fn send(&self, call: PreparedCall) -> Result<B256, MarketError> {
        let tx = TransactionRequest {
            from: self.sender,
            to: call.to,
            data: call.calldata,
            value: call.value,
        };
        let tx_hash = self.transport.send_transaction(tx).await?;
        tracing::debug!(%tx_hash, function = %call.signature, value = %call.value, "transaction sent");
        self.in_flight
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                tx_hash,
                InFlight {
                    signature: call.signature,
                    value: call.value,
                },
            );
        Ok(tx_hash)
    }

    /// Wait for the receipt of a tracked transaction and decode its events.
    ///
    /// A retryable transport error leaves the transaction tracked so the
    /// caller can confirm again. A receipt, successful or not, ends tracking,
    /// and so does a transport error that will not go away on retry.
    pub async fn confirm(&self, tx_hash: B256) -> Result<TxOutcome, MarketError> {
        let function = self
            .in_flight
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tx_hash)
            .map(|f| f.signature.clone())
            .ok_or(MarketError::UnknownTransaction(tx_hash))?;

        let receipt = match self.transport.wait_for_receipt(tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) if e.is_retryable() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(%tx_hash, %function, error = %e, "receipt lookup failed, dropping transaction");
                self.forget(&tx_hash);
                return Err(e.into());
            }
        };
        self.forget(&tx_hash);

        if !receipt.success {
            tracing::warn!(%tx_hash, %function, "transaction reverted");
            return Err(MarketError::Reverted { tx_hash, function });
        }

        let mut decoded = Vec::with_capacity(receipt.logs.len());
        for (i, log) in receipt.logs.iter().enumerate() {
            match events::decode_log(self.contract.codec(), log) {
                Ok(Some(ev)) => decoded.push(ev),
                Ok(None) => {}
                Err(e) => tracing::warn!(%tx_hash, log_index = i, error = %e, "undecodable log"),
            }
        }
        tracing::debug!(%tx_hash, %function, events = decoded.len(), "transaction confirmed");
        Ok(TxOutcome {
            tx_hash,
            function,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            events: decoded,
        })
    }

    pub async fn register_user(&self, user: &UserRegistration) -> Result<B256, MarketError> {
        self.send(self.contract.register_user(user)?).await
    }

    pub async fn register_cluster(&self, cluster: &ClusterRegistration) -> Result<B256, MarketError> {
        self.send(self.contract.register_cluster(cluster)?).await
    }

    pub async fn update_cluster(&self, cluster: &ClusterRegistration) -> Result<B256, MarketError> {
        self.send(self.contract.update_cluster(cluster)?).await
    }

    pub async fn deregister_cluster(&self) -> Result<B256, MarketError> {
        self.send(self.contract.deregister_cluster()?).await
    }

    /// Check registration, validate against the cluster's current terms and
    /// submit with the computed payment attached.
    pub async fn submit_job(&self, job: &JobSubmission) -> Result<B256, MarketError> {
        if !self.is_cluster_exist(job.cluster).await? {
            return Err(ValidationError::UnknownCluster(job.cluster.to_string()).into());
        }
        if let Some(sender) = self.sender {
            if !self.is_user_exist(sender).await? {
                return Err(ValidationError::UnknownUser(sender.to_string()).into());
            }
        }
        let cluster = self.get_cluster_info(job.cluster).await?;
        self.send(self.contract.submit_job(job, &cluster)?).await
    }

    pub async fn set_job_status(
        &self,
        job_key: &str,
        index: u32,
        state: JobStateCode,
        start_time: U256,
    ) -> Result<B256, MarketError> {
        self.send(self.contract.set_job_status(job_key, index, state, start_time)?)
            .await
    }

    pub async fn receipt_check(&self, receipt: &JobReceipt) -> Result<B256, MarketError> {
        self.send(self.contract.receipt_check(receipt)?).await
    }

    pub async fn refund(&self, cluster: Address, job_key: &str, index: u32) -> Result<B256, MarketError> {
        self.send(self.contract.refund(cluster, job_key, index)?).await
    }
}
