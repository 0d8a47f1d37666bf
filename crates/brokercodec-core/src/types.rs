//! ABI parameter types and the values that flow through the codec.
//!
//! `ParamType` is a closed set: every variant has exactly one encode and one
//! decode rule, so adding a type is a compile error until both codec
//! directions handle it. Type strings are parsed by alloy's `DynSolType`
//! and then narrowed; strings outside the set (`fixed128x18`, `function`,
//! `uint7`, ...) fail to parse.

use alloy_dyn_abi::DynSolType;
use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// A Solidity ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    /// `bool`
    Bool,
    /// `uint8` .. `uint256`. Width in bits.
    Uint(u16),
    /// `int8` .. `int256`. Width in bits.
    Int(u16),
    /// 20-byte account address
    Address,
    /// UTF-8 string
    String,
    /// Variable-length byte array
    Bytes,
    /// `bytes1` .. `bytes32`. Length in bytes.
    FixedBytes(u8),
    /// `T[]`
    Array(Box<ParamType>),
    /// `T[N]`
    FixedArray(Box<ParamType>, usize),
    /// `(T1,T2,...)`
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Whether values of this type live in the tail region of an encoding.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::String | ParamType::Bytes | ParamType::Array(_) => true,
            ParamType::FixedArray(elem, _) => elem.is_dynamic(),
            ParamType::Tuple(items) => items.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in the head region.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            ParamType::FixedArray(elem, len) => elem.head_size().saturating_mul(*len),
            ParamType::Tuple(items) => items
                .iter()
                .fold(0usize, |acc, t| acc.saturating_add(t.head_size())),
            _ => WORD,
        }
    }

    /// Narrow a resolved alloy type to the supported set.
    ///
    /// `function` and anything wider than the ABI allows map to `None`.
    pub fn from_sol_type(ty: &DynSolType) -> Option<Self> {
        Some(match ty {
            DynSolType::Bool => ParamType::Bool,
            DynSolType::Uint(bits) => ParamType::Uint(u16::try_from(*bits).ok()?),
            DynSolType::Int(bits) => ParamType::Int(u16::try_from(*bits).ok()?),
            DynSolType::Address => ParamType::Address,
            DynSolType::String => ParamType::String,
            DynSolType::Bytes => ParamType::Bytes,
            DynSolType::FixedBytes(size) => ParamType::FixedBytes(u8::try_from(*size).ok()?),
            DynSolType::Array(elem) => ParamType::Array(Box::new(Self::from_sol_type(elem)?)),
            DynSolType::FixedArray(elem, len) => ParamType::FixedArray(Box::new(Self::from_sol_type(elem)?), *len),
            DynSolType::Tuple(items) => {
                ParamType::Tuple(items.iter().map(Self::from_sol_type).collect::<Option<Vec<_>>>()?)
            }
            _ => return None,
        })
    }

    /// The alloy type used to lay out and read encodings of this type.
    pub fn to_sol_type(&self) -> DynSolType {
        match self {
            ParamType::Bool => DynSolType::Bool,
            ParamType::Uint(bits) => DynSolType::Uint(usize::from(*bits)),
            ParamType::Int(bits) => DynSolType::Int(usize::from(*bits)),
            ParamType::Address => DynSolType::Address,
            ParamType::String => DynSolType::String,
            ParamType::Bytes => DynSolType::Bytes,
            ParamType::FixedBytes(size) => DynSolType::FixedBytes(usize::from(*size)),
            ParamType::Array(elem) => DynSolType::Array(Box::new(elem.to_sol_type())),
            ParamType::FixedArray(elem, len) => DynSolType::FixedArray(Box::new(elem.to_sol_type()), *len),
            ParamType::Tuple(items) => DynSolType::Tuple(items.iter().map(ParamType::to_sol_type).collect()),
        }
    }
}

/// Integer widths, `bytesN` sizes and array lengths must be plain decimal:
/// no sign and no leading zero. alloy's parser reads them with
/// `str::parse`, which lets `bytes01` and `uint8[+2]` through.
pub fn has_canonical_sizes(ty: &str) -> bool {
    let raw = ty.as_bytes();
    raw.iter().enumerate().all(|(i, b)| match b {
        b'+' | b'-' => false,
        b'0' => i > 0 && raw[i - 1].is_ascii_digit(),
        _ => true,
    })
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Address => write!(f, "address"),
            ParamType::String => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Array(elem) => write!(f, "{elem}[]"),
            ParamType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            ParamType::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

/// Error returned when a type string is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported ABI type '{0}'")]
pub struct UnknownType(pub String);

impl FromStr for ParamType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = s.trim();
        if ty.is_empty() || !has_canonical_sizes(ty) {
            return Err(UnknownType(s.to_string()));
        }
        DynSolType::parse(ty)
            .ok()
            .as_ref()
            .and_then(ParamType::from_sol_type)
            .ok_or_else(|| UnknownType(s.to_string()))
    }
}

impl TryFrom<String> for ParamType {
    type Error = UnknownType;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ParamType> for String {
    fn from(ty: ParamType) -> Self {
        ty.to_string()
    }
}

/// A typed ABI value, the input to encoding and the output of decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    /// `bytesN`; indexed dynamic event params also decode to a 32-byte hash here
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Both `T[]` and `T[N]`
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Short variant name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Narrow a `Uint` to `u64`, if it fits.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_uint().and_then(|u| u64::try_from(u).ok())
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) | AbiValue::Tuple(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for AbiValue {
            fn from(v: $t) -> Self {
                AbiValue::Uint(U256::from(v))
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128);

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<Address> for AbiValue {
    fn from(a: Address) -> Self {
        AbiValue::Address(a)
    }
}

impl From<&str> for AbiValue {
    fn from(s: &str) -> Self {
        AbiValue::String(s.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(s: String) -> Self {
        AbiValue::String(s)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(b: Vec<u8>) -> Self {
        AbiValue::Bytes(b)
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => write!(f, "{s}"),
            AbiValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}
