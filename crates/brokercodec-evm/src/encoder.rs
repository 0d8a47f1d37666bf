//! ABI encoder: argument values to head/tail encoded calldata.
//!
//! `to_sol_value` checks every value against its declared `ParamType`
//! (coercing where that is lossless) and reports failures with the path of
//! the offending parameter. The checked `DynSolValue` tree is then laid out
//! by alloy, which cannot fail.
//!
//! # Usage
//! ```ignore
//! let spec = resolve_function(&descriptor, "isUserExist", &[ParamType::Address])?;
//! let call = encode_call(spec, &[AbiValue::Address(user)])?;
//! transport.call(descriptor.address(), call.to_calldata()).await?;
//! ```

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, I256};
use brokercodec_core::{
    error::EncodingError,
    parse_address,
    types::{AbiValue, ParamType},
    EncodedCall, FunctionSpec, ParamSpec,
};

use crate::path::Path;

/// Encode a call to `spec` with positional `args`.
///
/// Fails with `EncodingError::ArgumentCount` when `args.len()` differs from
/// the declared inputs, and with a per-parameter error when a value does not
/// fit its type. Nothing is produced on failure.
pub fn encode_call(spec: &FunctionSpec, args: &[AbiValue]) -> Result<EncodedCall, EncodingError> {
    if args.len() != spec.inputs.len() {
        return Err(EncodingError::ArgumentCount {
            function: spec.signature(),
            expected: spec.inputs.len(),
            got: args.len(),
        });
    }
    let arguments = encode_params(&spec.inputs, args)?;
    tracing::trace!(
        function = %spec.name,
        bytes = arguments.len(),
        "encoded call arguments"
    );
    Ok(EncodedCall {
        selector: spec.selector(),
        arguments,
    })
}

/// Encode `values` as if they were the return data of `spec`.
///
/// This is what a node hands back from `eth_call`; useful for fixtures and
/// mock transports.
pub fn encode_result(spec: &FunctionSpec, values: &[AbiValue]) -> Result<Vec<u8>, EncodingError> {
    if values.len() != spec.outputs.len() {
        return Err(EncodingError::ArgumentCount {
            function: format!("{} outputs", spec.signature()),
            expected: spec.outputs.len(),
            got: values.len(),
        });
    }
    encode_params(&spec.outputs, values)
}

/// Encode constructor arguments (appended to the creation bytecode; no selector).
pub fn encode_constructor(inputs: &[ParamSpec], args: &[AbiValue]) -> Result<Vec<u8>, EncodingError> {
    if args.len() != inputs.len() {
        return Err(EncodingError::ArgumentCount {
            function: "constructor".into(),
            expected: inputs.len(),
            got: args.len(),
        });
    }
    encode_params(inputs, args)
}

/// Encode a bare value sequence against a list of types, as a tuple.
/// Parameters are reported as `arg{i}`.
pub fn encode_values(types: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, EncodingError> {
    let params: Vec<ParamSpec> = types
        .iter()
        .map(|t| ParamSpec::new(String::new(), t.clone()))
        .collect();
    if values.len() != params.len() {
        return Err(EncodingError::ArgumentCount {
            function: "values".into(),
            expected: params.len(),
            got: values.len(),
        });
    }
    encode_params(&params, values)
}

fn encode_params(params: &[ParamSpec], values: &[AbiValue]) -> Result<Vec<u8>, EncodingError> {
    let mut tokens = Vec::with_capacity(params.len());
    for (index, (param, value)) in params.iter().zip(values).enumerate() {
        let name = param.display_name(index);
        let path = Path::root(&name);
        tokens.push(to_sol_value(&param.ty, value, index, &path)?);
    }
    Ok(DynSolValue::Tuple(tokens).abi_encode_params())
}

// ─── Validation / coercion ────────────────────────────────────────────────────

/// Check `value` against `ty` and convert it to the alloy value that
/// encodes it.
fn to_sol_value(ty: &ParamType, value: &AbiValue, index: usize, path: &Path<'_>) -> Result<DynSolValue, EncodingError> {
    let mismatch = || EncodingError::TypeMismatch {
        index,
        param: path.to_string(),
        expected: ty.to_string(),
        got: value.kind().to_string(),
    };
    let out_of_range = |shown: String| EncodingError::OutOfRange {
        index,
        param: path.to_string(),
        ty: ty.to_string(),
        value: shown,
    };

    match ty {
        ParamType::Bool => match value {
            AbiValue::Bool(b) => Ok(DynSolValue::Bool(*b)),
            _ => Err(mismatch()),
        },

        ParamType::Uint(bits) => {
            let n = match value {
                AbiValue::Uint(u) => *u,
                AbiValue::Int(i) if i.is_negative() => return Err(out_of_range(i.to_string())),
                AbiValue::Int(i) => i.into_raw(),
                _ => return Err(mismatch()),
            };
            if n.bit_len() > usize::from(*bits) {
                return Err(out_of_range(n.to_string()));
            }
            Ok(DynSolValue::Uint(n, usize::from(*bits)))
        }

        ParamType::Int(bits) => {
            let n = match value {
                AbiValue::Int(i) => *i,
                AbiValue::Uint(u) if u.bit_len() >= usize::from(*bits) => {
                    return Err(out_of_range(u.to_string()))
                }
                AbiValue::Uint(u) => I256::from_raw(*u),
                _ => return Err(mismatch()),
            };
            if !int_fits(n, *bits) {
                return Err(out_of_range(n.to_string()));
            }
            Ok(DynSolValue::Int(n, usize::from(*bits)))
        }

        ParamType::Address => {
            let addr = match value {
                AbiValue::Address(a) => *a,
                AbiValue::Bytes(b) | AbiValue::FixedBytes(b) if b.len() == 20 => Address::from_slice(b),
                AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => {
                    return Err(EncodingError::InvalidAddress {
                        index,
                        param: path.to_string(),
                        reason: format!("expected 20 bytes, got {}", b.len()),
                    })
                }
                AbiValue::String(s) => parse_address(s).map_err(|reason| EncodingError::InvalidAddress {
                    index,
                    param: path.to_string(),
                    reason,
                })?,
                _ => return Err(mismatch()),
            };
            Ok(DynSolValue::Address(addr))
        }

        ParamType::String => match value {
            AbiValue::String(s) => Ok(DynSolValue::String(s.clone())),
            AbiValue::Bytes(b) => String::from_utf8(b.clone())
                .map(DynSolValue::String)
                .map_err(|_| EncodingError::InvalidText {
                    index,
                    param: path.to_string(),
                }),
            _ => Err(mismatch()),
        },

        ParamType::Bytes => match value {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Ok(DynSolValue::Bytes(b.clone())),
            _ => Err(mismatch()),
        },

        ParamType::FixedBytes(size) => match value {
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                let size = usize::from(*size);
                if b.len() > size {
                    return Err(EncodingError::LengthMismatch {
                        index,
                        param: path.to_string(),
                        expected: size,
                        got: b.len(),
                    });
                }
                let mut word = B256::ZERO;
                word[..b.len()].copy_from_slice(b);
                Ok(DynSolValue::FixedBytes(word, size))
            }
            _ => Err(mismatch()),
        },

        ParamType::Array(elem) => match value {
            AbiValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| to_sol_value(elem, item, index, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Array),
            _ => Err(mismatch()),
        },

        ParamType::FixedArray(elem, len) => match value {
            AbiValue::Array(items) if items.len() == *len => items
                .iter()
                .enumerate()
                .map(|(i, item)| to_sol_value(elem, item, index, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray),
            AbiValue::Array(items) => Err(EncodingError::LengthMismatch {
                index,
                param: path.to_string(),
                expected: *len,
                got: items.len(),
            }),
            _ => Err(mismatch()),
        },

        ParamType::Tuple(types) => match value {
            AbiValue::Tuple(items) | AbiValue::Array(items) if items.len() == types.len() => types
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (t, item))| to_sol_value(t, item, index, &path.field(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple),
            AbiValue::Tuple(items) | AbiValue::Array(items) => Err(EncodingError::LengthMismatch {
                index,
                param: path.to_string(),
                expected: types.len(),
                got: items.len(),
            }),
            _ => Err(mismatch()),
        },
    }
}

/// Whether `value` is representable as a two's-complement integer of `bits` bits.
pub(crate) fn int_fits(value: I256, bits: u16) -> bool {
    if bits >= 256 {
        return true;
    }
    let raw = value.into_raw();
    let magnitude = if value.is_negative() { !raw } else { raw };
    magnitude.bit_len() < usize::from(bits)
}
