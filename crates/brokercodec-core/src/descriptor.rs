//! The in-memory contract description: address plus typed function and
//! event entries.
//!
//! A `ContractDescriptor` is built once (usually from an ABI JSON document)
//! and is read-only afterwards. Functions and events are keyed by their
//! canonical signature, so overloads sharing a name coexist; declaration
//! order is preserved.

use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DescriptorError;
use crate::hash;
use crate::types::ParamType;

/// Solidity state mutability of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// `view` and `pure` functions do not change contract state.
    pub fn is_constant(self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

impl std::fmt::Display for StateMutability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        };
        write!(f, "{s}")
    }
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// May be empty (common for return values)
    pub name: String,
    pub ty: ParamType,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// The parameter name, or `arg{index}` when unnamed.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("arg{index}")
        } else {
            self.name.clone()
        }
    }
}

/// A callable contract entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub inputs: Vec<ParamSpec>,
    pub outputs: Vec<ParamSpec>,
    pub mutability: StateMutability,
    pub is_constant: bool,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<ParamSpec>,
        outputs: Vec<ParamSpec>,
        mutability: StateMutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            mutability,
            is_constant: mutability.is_constant(),
        }
    }

    /// Canonical signature, e.g. `submitJob(address,string,uint32,string,uint32,uint8)`.
    pub fn signature(&self) -> String {
        signature(&self.name, self.inputs.iter().map(|p| &p.ty))
    }

    pub fn selector(&self) -> [u8; 4] {
        hash::selector(&self.signature())
    }

    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.ty.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.ty.clone()).collect()
    }
}

/// One input of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParam {
    pub name: String,
    pub ty: ParamType,
    /// Indexed params are carried in topics instead of the data payload
    pub indexed: bool,
}

impl EventParam {
    pub fn new(name: impl Into<String>, ty: ParamType, indexed: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed,
        }
    }
}

/// A log entry the contract can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    pub name: String,
    pub inputs: Vec<EventParam>,
    /// Anonymous events do not spend topic 0 on their signature hash
    #[serde(default)]
    pub anonymous: bool,
}

impl EventSpec {
    pub fn new(name: impl Into<String>, inputs: Vec<EventParam>) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous: false,
        }
    }

    pub fn signature(&self) -> String {
        signature(&self.name, self.inputs.iter().map(|p| &p.ty))
    }

    /// keccak256 of the canonical signature; topic 0 of every non-anonymous log.
    pub fn topic(&self) -> [u8; 32] {
        hash::keccak256(self.signature().as_bytes())
    }

    /// Number of topics a log of this event carries.
    pub fn topic_count(&self) -> usize {
        let indexed = self.inputs.iter().filter(|p| p.indexed).count();
        if self.anonymous {
            indexed
        } else {
            indexed + 1
        }
    }
}

fn signature<'a>(name: &str, types: impl Iterator<Item = &'a ParamType>) -> String {
    let parts: Vec<String> = types.map(|t| t.to_string()).collect();
    format!("{name}({})", parts.join(","))
}

/// Parse a `0x`-prefixed (or bare) 40-hex-digit address.
pub fn parse_address(s: &str) -> Result<Address, String> {
    let hex_part = s.strip_prefix("0x").unwrap_or(s);
    if hex_part.len() != 40 {
        return Err(format!("expected 40 hex digits, got {}", hex_part.len()));
    }
    let bytes = hex::decode(hex_part).map_err(|e| e.to_string())?;
    Ok(Address::from_slice(&bytes))
}

/// Immutable description of one deployed contract.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    address: Address,
    functions: IndexMap<String, FunctionSpec>,
    events: IndexMap<String, EventSpec>,
    constructor: Vec<ParamSpec>,
    by_selector: HashMap<[u8; 4], usize>,
    by_topic: HashMap<[u8; 32], usize>,
}

impl ContractDescriptor {
    /// Build a descriptor, indexing entries by signature, selector and topic.
    ///
    /// # Errors
    /// `DuplicateSignature` if two functions (or two events) share a
    /// canonical signature, `SelectorCollision` if two distinct function
    /// signatures hash to the same 4-byte selector.
    pub fn new(
        address: Address,
        functions: Vec<FunctionSpec>,
        events: Vec<EventSpec>,
        constructor: Vec<ParamSpec>,
    ) -> Result<Self, DescriptorError> {
        let mut by_signature: IndexMap<String, FunctionSpec> = IndexMap::with_capacity(functions.len());
        let mut by_selector = HashMap::with_capacity(functions.len());
        for func in functions {
            let sig = func.signature();
            if by_signature.contains_key(&sig) {
                return Err(DescriptorError::DuplicateSignature { signature: sig });
            }
            if let Some((first, _)) = by_selector.get(&func.selector()).and_then(|&i| by_signature.get_index(i)) {
                return Err(DescriptorError::SelectorCollision {
                    selector: hex::encode(func.selector()),
                    first: first.clone(),
                    second: sig,
                });
            }
            by_selector.insert(func.selector(), by_signature.len());
            by_signature.insert(sig, func);
        }

        let mut events_by_signature = IndexMap::with_capacity(events.len());
        let mut by_topic = HashMap::with_capacity(events.len());
        for event in events {
            let sig = event.signature();
            if events_by_signature.contains_key(&sig) {
                return Err(DescriptorError::DuplicateSignature { signature: sig });
            }
            if !event.anonymous {
                by_topic.insert(event.topic(), events_by_signature.len());
            }
            events_by_signature.insert(sig, event);
        }

        Ok(Self {
            address,
            functions: by_signature,
            events: events_by_signature,
            constructor,
            by_selector,
            by_topic,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address string.
    pub fn address_hex(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.values()
    }

    /// Events in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &EventSpec> {
        self.events.values()
    }

    pub fn constructor(&self) -> &[ParamSpec] {
        &self.constructor
    }

    /// Exact lookup by canonical signature.
    pub fn function(&self, signature: &str) -> Option<&FunctionSpec> {
        self.functions.get(signature)
    }

    /// All overloads sharing `name`, in declaration order.
    pub fn functions_named(&self, name: &str) -> Vec<&FunctionSpec> {
        self.functions.values().filter(|f| f.name == name).collect()
    }

    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&FunctionSpec> {
        self.by_selector
            .get(&selector)
            .and_then(|&i| self.functions.get_index(i))
            .map(|(_, f)| f)
    }

    pub fn event(&self, signature: &str) -> Option<&EventSpec> {
        self.events.get(signature)
    }

    pub fn events_named(&self, name: &str) -> Vec<&EventSpec> {
        self.events.values().filter(|e| e.name == name).collect()
    }

    pub fn event_by_topic(&self, topic: &[u8; 32]) -> Option<&EventSpec> {
        self.by_topic
            .get(topic)
            .and_then(|&i| self.events.get_index(i))
            .map(|(_, e)| e)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> FunctionSpec {
        FunctionSpec::new(
            "transfer",
            vec![
                ParamSpec::new("to", ParamType::Address),
                ParamSpec::new("amount", ParamType::Uint(256)),
            ],
            vec![ParamSpec::new("", ParamType::Bool)],
            StateMutability::NonPayable,
        )
    }

    #[test]
    fn function_signature_and_selector() {
        let f = transfer();
        assert_eq!(f.signature(), "transfer(address,uint256)");
        assert_eq!(hex::encode(f.selector()), "a9059cbb");
        assert!(!f.is_constant);
    }

    #[test]
    fn event_topic_and_count() {
        let ev = EventSpec::new(
            "Transfer",
            vec![
                EventParam::new("from", ParamType::Address, true),
                EventParam::new("to", ParamType::Address, true),
                EventParam::new("value", ParamType::Uint(256), false),
            ],
        );
        assert_eq!(
            hex::encode(ev.topic()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(ev.topic_count(), 3);
    }

    #[test]
    fn descriptor_indexes_by_selector() {
        let d = ContractDescriptor::new(Address::ZERO, vec![transfer()], vec![], vec![]).unwrap();
        let f = d.function_by_selector([0xa9, 0x05, 0x9c, 0xbb]).unwrap();
        assert_eq!(f.name, "transfer");
        assert!(d.function("transfer(address,uint256)").is_some());
        assert_eq!(d.functions_named("transfer").len(), 1);
    }

    #[test]
    fn duplicate_signature_rejected() {
        let err = ContractDescriptor::new(Address::ZERO, vec![transfer(), transfer()], vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, DescriptorError::DuplicateSignature { .. }));
    }

    #[test]
    fn selector_collision_rejected() {
        // burn(uint256) and collate_propagate_storage(bytes16) are both 0x42966c68
        let burn = FunctionSpec::new(
            "burn",
            vec![ParamSpec::new("amount", ParamType::Uint(256))],
            vec![],
            StateMutability::NonPayable,
        );
        let collate = FunctionSpec::new(
            "collate_propagate_storage",
            vec![ParamSpec::new("", ParamType::FixedBytes(16))],
            vec![],
            StateMutability::NonPayable,
        );
        assert_eq!(burn.selector(), collate.selector());

        let err = ContractDescriptor::new(Address::ZERO, vec![burn, collate], vec![], vec![]).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::SelectorCollision {
                selector: "42966c68".into(),
                first: "burn(uint256)".into(),
                second: "collate_propagate_storage(bytes16)".into(),
            }
        );
    }

    #[test]
    fn address_parsing() {
        let a = parse_address("0x8c22de03d3ce0b9dcb39617e7c31483ec484c720").unwrap();
        assert_eq!(
            hex::encode(a.as_slice()),
            "8c22de03d3ce0b9dcb39617e7c31483ec484c720"
        );
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz22de03d3ce0b9dcb39617e7c31483ec484c720").is_err());
    }
}
