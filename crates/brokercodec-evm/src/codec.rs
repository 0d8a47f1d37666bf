//! `ContractCodec`: a descriptor bundled with the encode/decode operations.
//!
//! # Usage
//! ```ignore
//! let codec = ContractCodec::from_abi_json("0x8c22…c720", ABI_JSON)?;
//! let call = codec.encode_call("getJobSize", &[cluster.into(), "QmKey".into()])?;
//! let raw = transport.call(codec.address(), call.to_calldata()).await?;
//! let size = codec.decode_result("getJobSize", &raw)?;
//! ```

use std::sync::Arc;

use alloy_primitives::Address;
use brokercodec_core::{
    error::{CodecError, DescriptorError},
    types::{AbiValue, ParamType},
    ContractDescriptor, DecodedResult, EncodedCall, EventSpec, FunctionSpec, RawLog,
};

use crate::{abi, decoder, encoder, resolve};

/// Cheap to clone; the descriptor is shared.
#[derive(Debug, Clone)]
pub struct ContractCodec {
    descriptor: Arc<ContractDescriptor>,
}

impl ContractCodec {
    pub fn new(descriptor: ContractDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }

    pub fn from_abi_json(address: &str, abi_json: &str) -> Result<Self, DescriptorError> {
        abi::load_descriptor(address, abi_json).map(Self::new)
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    pub fn address(&self) -> Address {
        self.descriptor.address()
    }

    /// Resolve `query` (a name, or a full signature for overloads).
    pub fn function(&self, query: &str) -> Result<&FunctionSpec, CodecError> {
        Ok(resolve::resolve_function_query(&self.descriptor, query)?)
    }

    /// Resolve by name and explicit argument types.
    pub fn function_with_types(&self, name: &str, arg_types: &[ParamType]) -> Result<&FunctionSpec, CodecError> {
        Ok(resolve::resolve_function(&self.descriptor, name, arg_types)?)
    }

    pub fn event(&self, query: &str) -> Result<&EventSpec, CodecError> {
        Ok(resolve::resolve_event(&self.descriptor, query)?)
    }

    /// Resolve `query` and encode a call with `args`.
    pub fn encode_call(&self, query: &str, args: &[AbiValue]) -> Result<EncodedCall, CodecError> {
        let spec = self.function(query)?;
        Ok(encoder::encode_call(spec, args)?)
    }

    /// Resolve `query` and decode the bytes returned for it.
    pub fn decode_result(&self, query: &str, raw: &[u8]) -> Result<DecodedResult, CodecError> {
        let spec = self.function(query)?;
        Ok(decoder::decode_result(spec, raw)?)
    }

    /// Decode transaction input (selector plus arguments).
    pub fn decode_call(&self, calldata: &[u8]) -> Result<(&FunctionSpec, DecodedResult), CodecError> {
        decoder::decode_call(&self.descriptor, calldata)
    }

    /// Decode a log emitted by this contract, picking the event by topic 0.
    pub fn decode_log(&self, log: &RawLog) -> Result<(&EventSpec, DecodedResult), CodecError> {
        decoder::decode_log(&self.descriptor, log)
    }
}
