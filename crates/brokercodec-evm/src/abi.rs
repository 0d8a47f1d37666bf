//! ABI JSON loading.
//!
//! Accepts the standard Solidity ABI array, a build artifact wrapping it
//! (`{"abi": [...]}`), and the deployment document used by eBlocBroker
//! tooling (`{"address": "0x...", "abi": [...]}`). Both the current
//! `stateMutability` field and the legacy `constant` / `payable` flags are
//! understood. `fallback`, `receive` and `error` entries carry nothing the
//! codec needs and are skipped.
//!
//! Entries are read one at a time as `alloy_json_abi::AbiItem`s so the
//! descriptor keeps declaration order (`JsonAbi` regroups them by name).
//! Old compiler output omits `type`, `outputs` or `anonymous`; those are
//! filled in before alloy sees the entry.

use alloy_dyn_abi::{DynSolType, Specifier};
use alloy_json_abi::{AbiItem, Param, StateMutability as SolMutability};
use alloy_primitives::Address;
use brokercodec_core::{
    error::DescriptorError,
    parse_address,
    types::{has_canonical_sizes, ParamType},
    ContractDescriptor, EventParam, EventSpec, FunctionSpec, ParamSpec, StateMutability,
};
use serde_json::{Map, Value};

/// Build a descriptor from a contract address and its ABI JSON.
///
/// # Errors
/// - `InvalidAddress` if `address` is not 20 hex-encoded bytes
/// - `InvalidJson` if the document is not an ABI array (or wrapper)
/// - `UnsupportedType` for parameter types outside the supported set
/// - `DuplicateSignature` / `SelectorCollision` if two functions clash
pub fn load_descriptor(address: &str, abi_json: &str) -> Result<ContractDescriptor, DescriptorError> {
    let address = parse_address(address).map_err(|reason| DescriptorError::InvalidAddress {
        address: address.into(),
        reason,
    })?;
    let doc: Value = serde_json::from_str(abi_json).map_err(|e| DescriptorError::InvalidJson(e.to_string()))?;
    descriptor_from_value(address, &doc)
}

/// Build a descriptor from a deployment document carrying both the
/// `address` and the `abi`.
pub fn load_deployment(json: &str) -> Result<ContractDescriptor, DescriptorError> {
    let doc: Value = serde_json::from_str(json).map_err(|e| DescriptorError::InvalidJson(e.to_string()))?;
    let address = doc
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| DescriptorError::InvalidJson("deployment document has no \"address\" string".into()))?;
    let address = parse_address(address).map_err(|reason| DescriptorError::InvalidAddress {
        address: address.into(),
        reason,
    })?;
    descriptor_from_value(address, &doc)
}

/// Build a descriptor from an already-parsed ABI document.
pub fn descriptor_from_value(address: Address, doc: &Value) -> Result<ContractDescriptor, DescriptorError> {
    let entries = match doc {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("abi") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(DescriptorError::InvalidJson("\"abi\" is not an array".into())),
            None => return Err(DescriptorError::InvalidJson("object has no \"abi\" field".into())),
        },
        _ => return Err(DescriptorError::InvalidJson("expected an ABI array".into())),
    };

    let mut functions = Vec::new();
    let mut events = Vec::new();
    let mut constructor = Vec::new();

    for entry in entries {
        match read_item(entry)? {
            AbiItem::Function(f) => {
                let inputs = params(&f.name, &f.inputs)?;
                let outputs = params(&f.name, &f.outputs)?;
                functions.push(FunctionSpec::new(
                    f.name.as_str(),
                    inputs,
                    outputs,
                    mutability(f.state_mutability),
                ));
            }
            AbiItem::Event(e) => {
                let inputs = e
                    .inputs
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let ty = resolve(&e.name, i, &p.name, &p.ty, &p.components, p)?;
                        Ok(EventParam::new(p.name.clone(), ty, p.indexed))
                    })
                    .collect::<Result<Vec<_>, DescriptorError>>()?;
                let mut event = EventSpec::new(e.name.as_str(), inputs);
                event.anonymous = e.anonymous;
                events.push(event);
            }
            AbiItem::Constructor(c) => constructor = params("constructor", &c.inputs)?,
            other => {
                tracing::trace!(kind = other.json_type(), "skipping ABI entry");
            }
        }
    }

    let descriptor = ContractDescriptor::new(address, functions, events, constructor)?;
    tracing::debug!(
        address = %descriptor.address_hex(),
        functions = descriptor.function_count(),
        events = descriptor.event_count(),
        "loaded contract descriptor"
    );
    Ok(descriptor)
}

/// Fill in the fields old compilers leave out, check the entry kind and
/// name, and hand the entry to alloy.
fn read_item(entry: &Value) -> Result<AbiItem<'static>, DescriptorError> {
    let Value::Object(fields) = entry else {
        return Err(DescriptorError::InvalidJson("ABI entry is not an object".into()));
    };
    let mut fields: Map<String, Value> = fields.clone();
    let kind = match fields.get("type") {
        None => "function".to_string(),
        Some(Value::String(kind)) => kind.clone(),
        Some(_) => return Err(DescriptorError::InvalidJson("ABI entry \"type\" is not a string".into())),
    };

    match kind.as_str() {
        "function" | "event" => {
            let named = fields
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| !n.is_empty());
            if !named {
                return Err(DescriptorError::MissingName { kind });
            }
            fields.entry("inputs").or_insert_with(|| Value::Array(vec![]));
            if kind == "function" {
                fields.entry("outputs").or_insert_with(|| Value::Array(vec![]));
            } else {
                fields.entry("anonymous").or_insert(Value::Bool(false));
            }
        }
        "constructor" => {
            fields.entry("inputs").or_insert_with(|| Value::Array(vec![]));
        }
        "fallback" | "receive" | "error" => {}
        _ => return Err(DescriptorError::UnknownEntry { kind }),
    }
    fields.insert("type".into(), Value::String(kind));

    serde_json::from_value(Value::Object(fields)).map_err(|e| DescriptorError::InvalidJson(e.to_string()))
}

fn mutability(m: SolMutability) -> StateMutability {
    match m {
        SolMutability::Pure => StateMutability::Pure,
        SolMutability::View => StateMutability::View,
        SolMutability::NonPayable => StateMutability::NonPayable,
        SolMutability::Payable => StateMutability::Payable,
    }
}

fn params(entry: &str, raw: &[Param]) -> Result<Vec<ParamSpec>, DescriptorError> {
    raw.iter()
        .enumerate()
        .map(|(i, p)| Ok(ParamSpec::new(p.name.clone(), resolve(entry, i, &p.name, &p.ty, &p.components, p)?)))
        .collect()
}

/// Resolve a JSON parameter through alloy and narrow it to a `ParamType`.
fn resolve<S: Specifier<DynSolType>>(
    entry: &str,
    index: usize,
    name: &str,
    ty: &str,
    components: &[Param],
    param: &S,
) -> Result<ParamType, DescriptorError> {
    let resolved = if sizes_canonical(ty, components) {
        param.resolve().ok().as_ref().and_then(ParamType::from_sol_type)
    } else {
        None
    };
    resolved.ok_or_else(|| {
        tracing::warn!(entry, ty, "unsupported ABI parameter type");
        DescriptorError::UnsupportedType {
            entry: entry.into(),
            param: if name.is_empty() {
                format!("arg{index}")
            } else {
                name.to_string()
            },
            ty: ty.to_string(),
        }
    })
}

fn sizes_canonical(ty: &str, components: &[Param]) -> bool {
    has_canonical_sizes(ty) && components.iter().all(|c| sizes_canonical(&c.ty, &c.components))
}
