//! The `ContractTransport` trait: the network boundary of the client.
//!
//! Nothing in this crate talks to a node directly. An implementation wraps
//! whatever RPC stack and signer the application uses.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use brokercodec_core::RawLog;

use crate::error::TransportError;

/// A transaction to be signed and broadcast by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sender; `None` lets the transport pick its default account.
    pub from: Option<Address>,
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
}

/// The parts of a mined receipt the client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    /// `false` when execution reverted
    pub success: bool,
    pub gas_used: u64,
    pub logs: Vec<RawLog>,
}

/// Async access to an Ethereum node.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the client shares them across tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn ContractTransport>`.
#[async_trait]
pub trait ContractTransport: Send + Sync + 'static {
    /// Execute a read-only call (`eth_call`) and return the raw return data.
    async fn call(&self, to: Address, calldata: Vec<u8>) -> Result<Vec<u8>, TransportError>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, TransportError>;

    /// Wait until `tx_hash` is mined and return its receipt.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, TransportError>;
}
