//! # brokercodec-market
//!
//! The eBlocBroker job/resource marketplace on top of `brokercodec-evm`:
//! the bundled contract artifact, typed calls and events, client-side
//! validation, and an async client behind a `ContractTransport` seam.
//!
//! ```ignore
//! let client = BrokerClient::new(BrokerContract::bundled()?, transport).with_sender(me);
//! let tx = client.submit_job(&job).await?;
//! let outcome = client.confirm(tx).await?;
//! ```

pub mod client;
pub mod contract;
pub mod error;
pub mod events;
pub mod transport;
pub mod types;

pub use client::{BrokerClient, InFlight, TxOutcome};
pub use contract::{descriptor, signatures, BrokerContract, PreparedCall, EBLOCBROKER_ABI, EBLOCBROKER_ADDRESS};
pub use error::{MarketError, TransportError, ValidationError};
pub use events::{decode_log, BrokerEvent, LogCluster, LogJob, LogReceipt, LogRefund, LogSetJob, LogUser};
pub use transport::{ContractTransport, TransactionRequest, TxReceipt};
pub use types::{
    core_minute_gas, ClusterInfo, ClusterRegistration, JobInfo, JobReceipt, JobStateCode, JobSubmission, ReceiptNode,
    StorageId, UserRegistration,
};
