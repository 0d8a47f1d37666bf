//! # brokercodec-core
//!
//! Data model shared by every BrokerCodec crate: ABI parameter types and
//! values, the immutable `ContractDescriptor`, encoded calls and decoded
//! results, raw logs, and the codec error kinds.

pub mod call;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod hash;
pub mod json;
pub mod types;

pub use call::{DecodedResult, EncodedCall};
pub use descriptor::{
    parse_address, ContractDescriptor, EventParam, EventSpec, FunctionSpec, ParamSpec,
    StateMutability,
};
pub use error::{CodecError, DecodingError, DescriptorError, EncodingError, NotFoundError};
pub use event::RawLog;
pub use types::{AbiValue, ParamType};

pub use alloy_primitives::{Address, B256, I256, U256};
