//! # brokercodec-evm
//!
//! ABI-driven call codec for EVM contracts.
//!
//! ## Implementation notes
//! - Selector = keccak256(signature)[..4]; event topic 0 = keccak256(signature)
//! - ABI JSON goes through `alloy-json-abi`, types resolve to `DynSolType`
//! - Head/tail layout is alloy's (`abi_encode_params` / `abi_decode_params`);
//!   value checks and parameter-path errors sit on top of it
//! - Decoding is strict: non-canonical words are errors, never truncated
//! - Indexed dynamic event params come back as their 32-byte hash

pub mod abi;
pub mod batch;
pub mod codec;
pub mod decoder;
pub mod encoder;
mod path;
pub mod resolve;

pub use abi::{descriptor_from_value, load_deployment, load_descriptor};
pub use batch::{decode_logs_parallel, DecodedLog};
pub use codec::ContractCodec;
pub use decoder::{decode_call, decode_event, decode_log, decode_result, decode_values};
pub use encoder::{encode_call, encode_constructor, encode_result, encode_values};
pub use resolve::{
    event_for_topic, function_for_selector, resolve_event, resolve_function, resolve_function_by_name,
    resolve_function_query,
};
