//! Error types for descriptor loading and the encode/decode pipeline.
//!
//! Every failure is local and recoverable. Encoding and decoding errors name
//! the offending parameter (as a path such as `jobKey` or `clusters[2]`) so
//! the caller can correct the input and retry.

use alloy_primitives::U256;
use thiserror::Error;

/// Lookup failures against a `ContractDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("function '{name}' not found")]
    Function { name: String },

    #[error("no overload of '{name}' accepts ({arg_types}); available: {}", .candidates.join(", "))]
    Overload {
        name: String,
        arg_types: String,
        candidates: Vec<String>,
    },

    #[error("function name '{name}' is overloaded; pass argument types to pick one of: {}", .candidates.join(", "))]
    Ambiguous { name: String, candidates: Vec<String> },

    #[error("event '{name}' not found")]
    Event { name: String },

    #[error("no function with selector 0x{}", hex::encode(.selector))]
    Selector { selector: [u8; 4] },

    #[error("no event with topic 0x{}", hex::encode(.topic))]
    Topic { topic: [u8; 32] },
}

/// Failures while encoding call arguments.
///
/// `index` is the top-level argument position; `param` is the parameter name
/// (or `arg{index}` when unnamed), extended with `[i]` / `.i` for nested
/// array elements and tuple components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("{function}: expected {expected} arguments, got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("argument {index} ('{param}'): expected {expected}, got {got}")]
    TypeMismatch {
        index: usize,
        param: String,
        expected: String,
        got: String,
    },

    #[error("argument {index} ('{param}'): value {value} does not fit {ty}")]
    OutOfRange {
        index: usize,
        param: String,
        ty: String,
        value: String,
    },

    #[error("argument {index} ('{param}'): invalid address: {reason}")]
    InvalidAddress {
        index: usize,
        param: String,
        reason: String,
    },

    #[error("argument {index} ('{param}'): not valid UTF-8 text")]
    InvalidText { index: usize, param: String },

    #[error("argument {index} ('{param}'): expected length {expected}, got {got}")]
    LengthMismatch {
        index: usize,
        param: String,
        expected: usize,
        got: usize,
    },
}

impl EncodingError {
    /// Path of the offending parameter, if the error concerns one.
    pub fn param(&self) -> Option<&str> {
        match self {
            EncodingError::ArgumentCount { .. } => None,
            EncodingError::TypeMismatch { param, .. }
            | EncodingError::OutOfRange { param, .. }
            | EncodingError::InvalidAddress { param, .. }
            | EncodingError::InvalidText { param, .. }
            | EncodingError::LengthMismatch { param, .. } => Some(param),
        }
    }

    /// Top-level argument index, if the error concerns one.
    pub fn index(&self) -> Option<usize> {
        match self {
            EncodingError::ArgumentCount { .. } => None,
            EncodingError::TypeMismatch { index, .. }
            | EncodingError::OutOfRange { index, .. }
            | EncodingError::InvalidAddress { index, .. }
            | EncodingError::InvalidText { index, .. }
            | EncodingError::LengthMismatch { index, .. } => Some(*index),
        }
    }
}

/// Failures while decoding return data, calldata or event logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    #[error("'{param}': need {needed} bytes at offset {offset}, buffer has {available}")]
    Truncated {
        param: String,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("'{param}': offset {offset} points outside the {len}-byte buffer")]
    OffsetOutOfBounds {
        param: String,
        offset: U256,
        len: usize,
    },

    #[error("'{param}': invalid boolean word")]
    InvalidBool { param: String },

    #[error("'{param}': value does not fit {ty}")]
    OutOfRange { param: String, ty: String },

    #[error("'{param}': non-zero padding in {ty} word")]
    DirtyPadding { param: String, ty: String },

    #[error("'{param}': string is not valid UTF-8")]
    InvalidUtf8 { param: String },

    #[error("'{param}': topic must be 32 bytes, got {got}")]
    InvalidTopic { param: String, got: usize },

    #[error("event {event}: expected {expected} topics, got {got}")]
    TopicCountMismatch {
        event: String,
        expected: usize,
        got: usize,
    },

    #[error("event {event}: topic 0 is 0x{}, expected 0x{}", hex::encode(.got), hex::encode(.expected))]
    SignatureMismatch {
        event: String,
        expected: [u8; 32],
        got: [u8; 32],
    },

    #[error("calldata too short: {len} bytes (need at least 4 for selector)")]
    MissingSelector { len: usize },

    /// Rejected by the alloy decoder after the strict checks passed.
    #[error("malformed ABI data: {0}")]
    Malformed(String),
}

/// Failures while building a `ContractDescriptor` from an ABI document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid ABI JSON: {0}")]
    InvalidJson(String),

    #[error("{entry}: parameter '{param}' has unsupported type '{ty}'")]
    UnsupportedType {
        entry: String,
        param: String,
        ty: String,
    },

    #[error("invalid contract address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("duplicate ABI signature {signature}")]
    DuplicateSignature { signature: String },

    #[error("selector 0x{selector} is shared by {first} and {second}")]
    SelectorCollision {
        selector: String,
        first: String,
        second: String,
    },

    #[error("unknown ABI entry type '{kind}'")]
    UnknownEntry { kind: String },

    #[error("{kind} entry is missing a name")]
    MissingName { kind: String },
}

/// Umbrella error for callers that chain several codec operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_error_names_parameter() {
        let err = EncodingError::OutOfRange {
            index: 2,
            param: "core".into(),
            ty: "uint32".into(),
            value: "4294967296".into(),
        };
        assert_eq!(err.param(), Some("core"));
        assert_eq!(err.index(), Some(2));
        assert_eq!(
            err.to_string(),
            "argument 2 ('core'): value 4294967296 does not fit uint32"
        );
    }

    #[test]
    fn selector_error_renders_hex() {
        let err = NotFoundError::Selector {
            selector: [0xde, 0xad, 0xbe, 0xef],
        };
        assert_eq!(err.to_string(), "no function with selector 0xdeadbeef");
    }

    #[test]
    fn codec_error_wraps_kinds() {
        let err: CodecError = NotFoundError::Function {
            name: "doesNotExist".into(),
        }
        .into();
        assert!(matches!(err, CodecError::NotFound(_)));
        assert_eq!(err.to_string(), "function 'doesNotExist' not found");
    }
}
