//! Error types for the marketplace layer.

use alloy_primitives::{B256, U256};
use brokercodec_core::error::{CodecError, DescriptorError};
use thiserror::Error;

/// Errors reported by a `ContractTransport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The node rejected the request (execution reverted, bad nonce, ...)
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Request timed out after the configured duration.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// No receipt is known for this transaction hash.
    #[error("no receipt for transaction {0}")]
    ReceiptNotFound(B256),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ReceiptNotFound(_))
    }
}

/// Client-side checks run before a transaction is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("job key for {storage} must be {expected} characters, got {got}")]
    JobKeyLength {
        storage: String,
        expected: usize,
        got: usize,
    },

    #[error("job key must be shorter than 64 characters, got {got}")]
    JobKeyTooLong { got: usize },

    #[error("job description must be shorter than 128 characters, got {got}")]
    DescriptionTooLong { got: usize },

    #[error("core minute gas must be non-zero")]
    ZeroCoreMinuteGas,

    #[error("requested {requested} cores but the cluster has {available}")]
    TooManyCores { requested: u32, available: u32 },

    #[error("payment for {core} cores at {core_minute_price} wei for {core_minute_gas} minutes overflows uint256")]
    PaymentOverflow {
        core: u32,
        core_minute_price: U256,
        core_minute_gas: u32,
    },

    #[error("storage id {0} is not one of 0..=4")]
    UnknownStorageId(u8),

    #[error("job state {0} is not a known state code")]
    UnknownJobState(u8),

    #[error("cluster {0} is not registered")]
    UnknownCluster(String),

    #[error("user {0} is not registered")]
    UnknownUser(String),
}

/// Umbrella error for the marketplace client and typed wrappers.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The transaction was mined but execution failed.
    #[error("transaction {tx_hash} ({function}) reverted")]
    Reverted { tx_hash: B256, function: String },

    /// A result decoded cleanly but does not have the shape the wrapper expects.
    #[error("{function}: unexpected result: {reason}")]
    UnexpectedResult { function: String, reason: String },

    #[error("transaction {0} is not tracked by this client")]
    UnknownTransaction(B256),
}

impl From<DescriptorError> for MarketError {
    fn from(e: DescriptorError) -> Self {
        MarketError::Codec(CodecError::Descriptor(e))
    }
}

impl MarketError {
    /// Returns `true` if the caller may retry the same operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketError::Transport(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokercodec_core::error::NotFoundError;

    #[test]
    fn codec_errors_convert() {
        let e: MarketError = CodecError::from(NotFoundError::Event { name: "LogX".into() }).into();
        assert!(matches!(e, MarketError::Codec(CodecError::NotFound(_))));
        assert_eq!(e.to_string(), "event 'LogX' not found");
    }

    #[test]
    fn retryable_only_for_transient_transport_errors() {
        assert!(MarketError::Transport(TransportError::Timeout { ms: 500 }).is_retryable());
        let rpc = TransportError::Rpc {
            code: -32000,
            message: "execution reverted".into(),
        };
        assert!(!MarketError::Transport(rpc).is_retryable());
        assert!(!MarketError::Validation(ValidationError::ZeroCoreMinuteGas).is_retryable());
    }
}
