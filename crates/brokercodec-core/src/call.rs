//! Products of the codec: an encoded call ready for transport, and a
//! decoded, positional result.

use crate::types::AbiValue;

/// Selector plus ABI-encoded arguments for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    /// First 4 bytes of keccak256(signature)
    pub selector: [u8; 4],
    /// Head/tail encoded argument tuple
    pub arguments: Vec<u8>,
}

impl EncodedCall {
    /// `selector ++ arguments`, the `data` field of a transaction or `eth_call`.
    pub fn to_calldata(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.arguments.len());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(&self.arguments);
        out
    }

    /// Selector as a hex string ("0xaabbccdd")
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    /// Full calldata as a `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_calldata()))
    }
}

/// Decoded values in declaration order, with their parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedResult {
    /// Parameter names (`arg{i}` for unnamed parameters)
    pub names: Vec<String>,
    pub values: Vec<AbiValue>,
}

impl DecodedResult {
    pub fn new(names: Vec<String>, values: Vec<AbiValue>) -> Self {
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Positional access.
    pub fn get(&self, index: usize) -> Option<&AbiValue> {
        self.values.get(index)
    }

    /// Look up a value by parameter name.
    pub fn field(&self, name: &str) -> Option<&AbiValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.values.get(i))
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbiValue)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<AbiValue> {
        self.values
    }
}
