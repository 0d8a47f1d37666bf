//! Strict ABI decoder for return data, calldata and event logs.
//!
//! Every buffer is walked once against its declared types before alloy
//! decodes it: offsets are bounds-checked against the enclosing tuple,
//! array lengths are checked against the bytes that remain, and every word
//! must be canonical (booleans are 0 or 1, narrow integers are zero/sign
//! extended, addresses and `bytesN` carry zero padding, strings are UTF-8).
//! Failures name the offending parameter path. Values are then produced by
//! `DynSolType::abi_decode_params` and `DynSolEvent`. Malformed input never
//! panics.

use alloy_dyn_abi::{DynSolEvent, DynSolType, DynSolValue};
use alloy_primitives::{B256, I256, U256};
use brokercodec_core::{
    error::{CodecError, DecodingError, NotFoundError},
    types::{AbiValue, ParamType, WORD},
    ContractDescriptor, DecodedResult, EventSpec, FunctionSpec, ParamSpec, RawLog,
};

use crate::encoder::int_fits;
use crate::path::Path;

/// Decode the raw return bytes of a call to `spec`.
///
/// An empty output list decodes to an empty result regardless of `raw`.
pub fn decode_result(spec: &FunctionSpec, raw: &[u8]) -> Result<DecodedResult, DecodingError> {
    let result = decode_params(&spec.outputs, raw)?;
    tracing::trace!(function = %spec.name, values = result.len(), "decoded result");
    Ok(result)
}

/// Decode raw bytes against a bare type list; values are named `arg{i}`.
pub fn decode_values(types: &[ParamType], raw: &[u8]) -> Result<DecodedResult, DecodingError> {
    let params: Vec<ParamSpec> = types
        .iter()
        .map(|t| ParamSpec::new(String::new(), t.clone()))
        .collect();
    decode_params(&params, raw)
}

/// Split calldata into selector and arguments, find the function and decode
/// its inputs.
pub fn decode_call<'d>(
    descriptor: &'d ContractDescriptor,
    calldata: &[u8],
) -> Result<(&'d FunctionSpec, DecodedResult), CodecError> {
    if calldata.len() < 4 {
        return Err(DecodingError::MissingSelector { len: calldata.len() }.into());
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&calldata[..4]);
    let spec = descriptor
        .function_by_selector(selector)
        .ok_or(NotFoundError::Selector { selector })?;
    let args = decode_params(&spec.inputs, &calldata[4..])?;
    Ok((spec, args))
}

/// Decode an emitted event.
///
/// `topics` must hold the signature hash first (unless the event is
/// anonymous) followed by one 32-byte topic per indexed parameter; `data`
/// holds the non-indexed parameters encoded as a tuple. Indexed parameters
/// of dynamic or composite type are only present as their keccak256 hash and
/// are returned as a 32-byte `FixedBytes`. The result lists every parameter
/// in declaration order.
pub fn decode_event<T: AsRef<[u8]>>(
    spec: &EventSpec,
    topics: &[T],
    data: &[u8],
) -> Result<DecodedResult, DecodingError> {
    let expected = spec.topic_count();
    if topics.len() != expected {
        return Err(DecodingError::TopicCountMismatch {
            event: spec.signature(),
            expected,
            got: topics.len(),
        });
    }

    let mut remaining = topics.iter().map(<T as AsRef<[u8]>>::as_ref);
    let mut words = Vec::with_capacity(expected);
    if !spec.anonymous {
        let first = remaining.next().unwrap_or_default();
        let got: [u8; 32] = first.try_into().map_err(|_| DecodingError::InvalidTopic {
            param: "topic0".into(),
            got: first.len(),
        })?;
        let expected = spec.topic();
        if got != expected {
            return Err(DecodingError::SignatureMismatch {
                event: spec.signature(),
                expected,
                got,
            });
        }
        words.push(B256::from(got));
    }

    let names: Vec<String> = spec
        .inputs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if p.name.is_empty() {
                format!("arg{i}")
            } else {
                p.name.clone()
            }
        })
        .collect();

    for (param, name) in spec.inputs.iter().zip(&names).filter(|(p, _)| p.indexed) {
        let topic = remaining.next().unwrap_or_default();
        let word = B256::try_from(topic).map_err(|_| DecodingError::InvalidTopic {
            param: name.clone(),
            got: topic.len(),
        })?;
        if !is_hashed_when_indexed(&param.ty) {
            check_value(&param.ty, topic, &Path::root(name))?;
        }
        words.push(word);
    }

    let body_types: Vec<&ParamType> = spec.inputs.iter().filter(|p| !p.indexed).map(|p| &p.ty).collect();
    let body_names: Vec<&String> = spec
        .inputs
        .iter()
        .zip(&names)
        .filter(|(p, _)| !p.indexed)
        .map(|(_, n)| n)
        .collect();
    check_sequence(&body_types, data, &|i| Path::root(body_names[i].as_str()))?;
    guard_sizes(&body_types, data.len(), &|i| Path::root(body_names[i].as_str()))?;

    let event = DynSolEvent::new_unchecked(
        (!spec.anonymous).then(|| B256::from(spec.topic())),
        spec.inputs.iter().filter(|p| p.indexed).map(|p| p.ty.to_sol_type()).collect(),
        DynSolType::Tuple(body_types.iter().map(|t| t.to_sol_type()).collect()),
    );
    let decoded = event
        .decode_log_parts(words, data, true)
        .map_err(|e| DecodingError::Malformed(e.to_string()))?;

    let mut indexed = decoded.indexed.into_iter();
    let mut body = decoded.body.into_iter();
    let mut values = Vec::with_capacity(spec.inputs.len());
    for param in &spec.inputs {
        let next = if param.indexed { indexed.next() } else { body.next() };
        // both iterators hold exactly as many values as there are params of their kind
        if let Some(v) = next {
            values.push(from_sol_value(v));
        }
    }

    tracing::trace!(event = %spec.name, values = values.len(), "decoded event");
    Ok(DecodedResult::new(names, values))
}

/// Find the event for `log.topics[0]` in `descriptor` and decode it.
pub fn decode_log<'d>(
    descriptor: &'d ContractDescriptor,
    log: &RawLog,
) -> Result<(&'d EventSpec, DecodedResult), CodecError> {
    let topic = log
        .signature_topic()
        .ok_or_else(|| DecodingError::TopicCountMismatch {
            event: "<unknown>".into(),
            expected: 1,
            got: 0,
        })?;
    let spec = descriptor
        .event_by_topic(&topic)
        .ok_or(NotFoundError::Topic { topic })?;
    let decoded = decode_event(spec, &log.topics, &log.data)?;
    Ok((spec, decoded))
}

fn is_hashed_when_indexed(ty: &ParamType) -> bool {
    matches!(
        ty,
        ParamType::String
            | ParamType::Bytes
            | ParamType::Array(_)
            | ParamType::FixedArray(..)
            | ParamType::Tuple(_)
    )
}

fn decode_params(params: &[ParamSpec], raw: &[u8]) -> Result<DecodedResult, DecodingError> {
    let names: Vec<String> = params.iter().enumerate().map(|(i, p)| p.display_name(i)).collect();
    let types: Vec<&ParamType> = params.iter().map(|p| &p.ty).collect();
    let path_of = |i: usize| Path::root(names[i].as_str());
    check_sequence(&types, raw, &path_of)?;
    guard_sizes(&types, raw.len(), &path_of)?;

    let tuple = DynSolType::Tuple(types.iter().map(|t| t.to_sol_type()).collect());
    let values = match tuple
        .abi_decode_params(raw)
        .map_err(|e| DecodingError::Malformed(e.to_string()))?
    {
        DynSolValue::Tuple(values) => values.into_iter().map(from_sol_value).collect(),
        other => vec![from_sol_value(other)],
    };
    Ok(DecodedResult::new(names, values))
}

/// alloy sizes its scratch tokens from the type alone, including the
/// element type of an empty `T[]`. A fixed array whose word count overflows,
/// or exceeds the byte length of the buffer, is turned away before alloy
/// allocates for it.
fn guard_sizes<'p>(types: &[&ParamType], len: usize, path_of: &dyn Fn(usize) -> Path<'p>) -> Result<(), DecodingError> {
    for (i, ty) in types.iter().enumerate() {
        if let Some(words) = oversized_fixed(ty, len) {
            return Err(DecodingError::Truncated {
                param: path_of(i).to_string(),
                offset: 0,
                needed: words.saturating_mul(WORD),
                available: len,
            });
        }
    }
    Ok(())
}

/// Word count of the first fixed array in `ty` needing more than `limit`
/// words (`usize::MAX` on overflow).
fn oversized_fixed(ty: &ParamType, limit: usize) -> Option<usize> {
    match ty {
        ParamType::Array(elem) => oversized_fixed(elem, limit),
        ParamType::FixedArray(elem, _) => match min_words(ty) {
            Some(words) if words <= limit => oversized_fixed(elem, limit),
            Some(words) => Some(words),
            None => Some(usize::MAX),
        },
        ParamType::Tuple(items) => items.iter().find_map(|t| oversized_fixed(t, limit)),
        _ => None,
    }
}

/// Minimum number of words an encoding of `ty` occupies, or `None` on overflow.
fn min_words(ty: &ParamType) -> Option<usize> {
    match ty {
        ParamType::FixedArray(elem, len) => min_words(elem)?.checked_mul(*len),
        ParamType::Tuple(items) => items.iter().try_fold(0usize, |acc, t| acc.checked_add(min_words(t)?)),
        _ => Some(1),
    }
}

fn from_sol_value(value: DynSolValue) -> AbiValue {
    match value {
        DynSolValue::Bool(b) => AbiValue::Bool(b),
        DynSolValue::Uint(n, _) => AbiValue::Uint(n),
        DynSolValue::Int(n, _) => AbiValue::Int(n),
        DynSolValue::Address(a) => AbiValue::Address(a),
        DynSolValue::FixedBytes(word, size) => AbiValue::FixedBytes(word[..size.min(WORD)].to_vec()),
        DynSolValue::Bytes(b) => AbiValue::Bytes(b),
        DynSolValue::String(s) => AbiValue::String(s),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            AbiValue::Array(items.into_iter().map(from_sol_value).collect())
        }
        DynSolValue::Tuple(items) => AbiValue::Tuple(items.into_iter().map(from_sol_value).collect()),
        // never requested: `ParamType` has no function pointer type
        other => AbiValue::FixedBytes(other.as_word().map(|w| w.to_vec()).unwrap_or_default()),
    }
}

// ─── Tuple walking ────────────────────────────────────────────────────────────

/// Check `types` as a tuple starting at `buf[0]`. Offsets of dynamic
/// members are relative to `buf`.
fn check_sequence<'p>(
    types: &[&ParamType],
    buf: &[u8],
    path_of: &dyn Fn(usize) -> Path<'p>,
) -> Result<(), DecodingError> {
    // reject short buffers up front, naming the first member that does not fit
    let mut head_end = 0usize;
    for (i, ty) in types.iter().enumerate() {
        let size = ty.head_size();
        if head_end.saturating_add(size) > buf.len() {
            return Err(DecodingError::Truncated {
                param: path_of(i).to_string(),
                offset: head_end,
                needed: size,
                available: buf.len().saturating_sub(head_end),
            });
        }
        head_end += size;
    }

    let mut pos = 0usize;
    for (i, ty) in types.iter().enumerate() {
        let path = path_of(i);
        if ty.is_dynamic() {
            let offset = read_offset(buf, pos, &path)?;
            check_value(ty, &buf[offset..], &path)?;
            pos += WORD;
        } else {
            let size = ty.head_size();
            check_value(ty, &buf[pos..pos + size], &path)?;
            pos += size;
        }
    }
    Ok(())
}

/// `len` copies of `elem` laid out as a tuple at `buf[0]`; `path` is the
/// array they belong to.
fn check_repeated(elem: &ParamType, len: usize, buf: &[u8], path: &Path<'_>) -> Result<(), DecodingError> {
    // every element occupies at least one word of the head
    let size = elem.head_size();
    let needed = len.saturating_mul(size.max(WORD));
    if needed > buf.len() {
        return Err(DecodingError::Truncated {
            param: path.to_string(),
            offset: 0,
            needed,
            available: buf.len(),
        });
    }
    for i in 0..len {
        let item = path.index(i);
        let pos = i * size;
        if elem.is_dynamic() {
            let offset = read_offset(buf, pos, &item)?;
            check_value(elem, &buf[offset..], &item)?;
        } else {
            check_value(elem, &buf[pos..pos + size], &item)?;
        }
    }
    Ok(())
}

/// Check one value whose encoding starts at `buf[0]`.
fn check_value(ty: &ParamType, buf: &[u8], path: &Path<'_>) -> Result<(), DecodingError> {
    match ty {
        ParamType::Bool => {
            let w = word_at(buf, 0, path)?;
            if w[..31].iter().any(|b| *b != 0) || w[31] > 1 {
                return Err(DecodingError::InvalidBool {
                    param: path.to_string(),
                });
            }
        }

        ParamType::Uint(bits) => {
            let n = U256::from_be_bytes(word_at(buf, 0, path)?);
            if n.bit_len() > usize::from(*bits) {
                return Err(DecodingError::OutOfRange {
                    param: path.to_string(),
                    ty: ty.to_string(),
                });
            }
        }

        ParamType::Int(bits) => {
            let n = I256::from_raw(U256::from_be_bytes(word_at(buf, 0, path)?));
            if !int_fits(n, *bits) {
                return Err(DecodingError::OutOfRange {
                    param: path.to_string(),
                    ty: ty.to_string(),
                });
            }
        }

        ParamType::Address => {
            let w = word_at(buf, 0, path)?;
            if w[..12].iter().any(|b| *b != 0) {
                return Err(dirty(ty, path));
            }
        }

        ParamType::FixedBytes(size) => {
            let w = word_at(buf, 0, path)?;
            if w[usize::from(*size)..].iter().any(|b| *b != 0) {
                return Err(dirty(ty, path));
            }
        }

        ParamType::Bytes => {
            read_packed(buf, path)?;
        }

        ParamType::String => {
            let raw = read_packed(buf, path)?;
            if std::str::from_utf8(raw).is_err() {
                return Err(DecodingError::InvalidUtf8 {
                    param: path.to_string(),
                });
            }
        }

        ParamType::Array(elem) => {
            let len = read_length(buf, path)?;
            check_repeated(elem, len, &buf[WORD..], path)?;
        }

        ParamType::FixedArray(elem, len) => {
            check_repeated(elem, *len, buf, path)?;
        }

        ParamType::Tuple(members) => {
            let types: Vec<&ParamType> = members.iter().collect();
            check_sequence(&types, buf, &move |i| path.field(i))?;
        }
    }
    Ok(())
}

// ─── Word access ──────────────────────────────────────────────────────────────

fn word_at(buf: &[u8], at: usize, path: &Path<'_>) -> Result<[u8; WORD], DecodingError> {
    buf.get(at..at.saturating_add(WORD))
        .and_then(|s| <[u8; WORD]>::try_from(s).ok())
        .ok_or_else(|| DecodingError::Truncated {
            param: path.to_string(),
            offset: at,
            needed: WORD,
            available: buf.len().saturating_sub(at),
        })
}

/// Read the offset word at `pos` and check that a full word fits behind it.
fn read_offset(buf: &[u8], pos: usize, path: &Path<'_>) -> Result<usize, DecodingError> {
    let raw = U256::from_be_bytes(word_at(buf, pos, path)?);
    usize::try_from(raw)
        .ok()
        .filter(|off| off.checked_add(WORD).is_some_and(|end| end <= buf.len()))
        .ok_or_else(|| DecodingError::OffsetOutOfBounds {
            param: path.to_string(),
            offset: raw,
            len: buf.len(),
        })
}

/// Length word at `buf[0]`, bounded by the buffer size.
fn read_length(buf: &[u8], path: &Path<'_>) -> Result<usize, DecodingError> {
    let raw = U256::from_be_bytes(word_at(buf, 0, path)?);
    usize::try_from(raw)
        .ok()
        .filter(|len| *len <= buf.len())
        .ok_or_else(|| DecodingError::Truncated {
            param: path.to_string(),
            offset: WORD,
            needed: usize::try_from(raw).unwrap_or(usize::MAX),
            available: buf.len() - WORD,
        })
}

/// Length-prefixed byte string at `buf[0]`.
fn read_packed<'b>(buf: &'b [u8], path: &Path<'_>) -> Result<&'b [u8], DecodingError> {
    let len = read_length(buf, path)?;
    buf.get(WORD..WORD + len).ok_or_else(|| DecodingError::Truncated {
        param: path.to_string(),
        offset: WORD,
        needed: len,
        available: buf.len() - WORD,
    })
}

fn dirty(ty: &ParamType, path: &Path<'_>) -> DecodingError {
    DecodingError::DirtyPadding {
        param: path.to_string(),
        ty: ty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_values;
    use alloy_primitives::Address;
    use brokercodec_core::{EventParam, StateMutability};

    fn word(n: u64) -> Vec<u8> {
        U256::from(n).to_be_bytes::<32>().to_vec()
    }

    fn ty(s: &str) -> ParamType {
        s.parse().unwrap()
    }

    #[test]
    fn decodes_bool_true() {
        let res = decode_values(&[ParamType::Bool], &word(1)).unwrap();
        assert_eq!(res.get(0), Some(&AbiValue::Bool(true)));
        assert_eq!(res.names, vec!["arg0".to_string()]);
    }

    #[test]
    fn bool_word_of_two_is_rejected() {
        let err = decode_values(&[ParamType::Bool], &word(2)).unwrap_err();
        assert_eq!(err, DecodingError::InvalidBool { param: "arg0".into() });
    }

    #[test]
    fn narrow_uint_with_high_bits_is_rejected() {
        let err = decode_values(&[ty("uint8")], &word(256)).unwrap_err();
        assert!(matches!(err, DecodingError::OutOfRange { .. }));
        assert!(decode_values(&[ty("uint8")], &word(255)).is_ok());
    }

    #[test]
    fn negative_int32_sign_extension() {
        let res = decode_values(&[ty("int32")], &[0xffu8; 32]).unwrap();
        assert_eq!(res.get(0), Some(&AbiValue::Int(I256::try_from(-1i64).unwrap())));

        // high bits set but value positive within 32 bits: not canonical
        let mut w = [0xffu8; 32];
        w[28] = 0x7f;
        let err = decode_values(&[ty("int32")], &w).unwrap_err();
        assert!(matches!(err, DecodingError::OutOfRange { .. }));
    }

    #[test]
    fn dirty_address_padding_is_rejected() {
        let mut w = word(0);
        w[0] = 1;
        let err = decode_values(&[ParamType::Address], &w).unwrap_err();
        assert!(matches!(err, DecodingError::DirtyPadding { .. }));
    }

    #[test]
    fn short_head_is_truncated() {
        let err = decode_values(&[ty("uint256"), ty("uint256")], &word(1)).unwrap_err();
        assert_eq!(
            err,
            DecodingError::Truncated {
                param: "arg1".into(),
                offset: 32,
                needed: 32,
                available: 0
            }
        );
    }

    #[test]
    fn offset_past_end_is_rejected() {
        let err = decode_values(&[ParamType::String], &word(4096)).unwrap_err();
        assert!(matches!(err, DecodingError::OffsetOutOfBounds { len: 32, .. }));
    }

    #[test]
    fn huge_offset_does_not_overflow() {
        let err = decode_values(&[ParamType::Bytes], &[0xffu8; 32]).unwrap_err();
        assert!(matches!(err, DecodingError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn string_length_past_end_is_truncated() {
        let raw = [word(32), word(100)].concat();
        let err = decode_values(&[ParamType::String], &raw).unwrap_err();
        assert!(matches!(err, DecodingError::Truncated { .. }));
    }

    #[test]
    fn huge_array_length_is_rejected_without_allocating() {
        let raw = [word(32), vec![0x7f; 32]].concat();
        let err = decode_values(&[ty("uint256[]")], &raw).unwrap_err();
        assert!(matches!(err, DecodingError::Truncated { .. }));
    }

    #[test]
    fn oversized_fixed_array_is_truncated_before_allocating() {
        let raw = [word(32), word(0)].concat();
        let err = decode_values(&[ty("string[4000000000000]")], &raw).unwrap_err();
        assert!(matches!(err, DecodingError::Truncated { ref param, .. } if param == "arg0"));

        let err = decode_values(&[ty("uint256[4000000000000]")], &word(0)).unwrap_err();
        assert!(matches!(err, DecodingError::Truncated { .. }));
    }

    #[test]
    fn empty_array_of_oversized_elements_is_refused() {
        let raw = [word(32), word(0)].concat();
        let err = decode_values(&[ty("uint8[1000000][]")], &raw).unwrap_err();
        assert!(matches!(err, DecodingError::Truncated { needed: 32_000_000, available: 64, .. }));

        let res = decode_values(&[ty("uint8[3][]")], &raw).unwrap();
        assert_eq!(res.get(0), Some(&AbiValue::Array(vec![])));
    }

    #[test]
    fn fixed_bytes_keep_declared_width() {
        let mut w = word(0);
        w[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let res = decode_values(&[ty("bytes4")], &w).unwrap();
        assert_eq!(res.get(0), Some(&AbiValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef])));

        w[4] = 1;
        let err = decode_values(&[ty("bytes4")], &w).unwrap_err();
        assert!(matches!(err, DecodingError::DirtyPadding { .. }));
    }

    #[test]
    fn invalid_utf8_string() {
        let mut data = vec![0xffu8, 0xfe];
        data.resize(32, 0);
        let raw = [word(32), word(2), data].concat();
        let err = decode_values(&[ParamType::String], &raw).unwrap_err();
        assert!(matches!(err, DecodingError::InvalidUtf8 { .. }));
    }

    #[test]
    fn empty_string_round_trip() {
        let raw = encode_values(&[ParamType::String], &[AbiValue::from("")]).unwrap();
        let res = decode_values(&[ParamType::String], &raw).unwrap();
        assert_eq!(res.get(0), Some(&AbiValue::String(String::new())));
    }

    #[test]
    fn nested_tuple_array_round_trip() {
        let types = vec![ty("(address,string)[]"), ty("uint32[2]")];
        let values = vec![
            AbiValue::Array(vec![
                AbiValue::Tuple(vec![AbiValue::Address(Address::repeat_byte(0x11)), AbiValue::from("x")]),
                AbiValue::Tuple(vec![AbiValue::Address(Address::repeat_byte(0x22)), AbiValue::from("")]),
            ]),
            AbiValue::Array(vec![AbiValue::from(7u32), AbiValue::from(9u32)]),
        ];
        let raw = encode_values(&types, &values).unwrap();
        let res = decode_values(&types, &raw).unwrap();
        assert_eq!(res.into_values(), values);
    }

    #[test]
    fn nested_error_path() {
        let types = vec![ty("uint8[]")];
        let raw = [word(32), word(2), word(1), word(999)].concat();
        let err = decode_values(&types, &raw).unwrap_err();
        assert_eq!(
            err,
            DecodingError::OutOfRange {
                param: "arg0[1]".into(),
                ty: "uint8".into()
            }
        );
    }

    #[test]
    fn zero_outputs_decode_to_empty() {
        let spec = FunctionSpec::new("deregisterCluster", vec![], vec![], StateMutability::NonPayable);
        assert!(decode_result(&spec, &[]).unwrap().is_empty());
    }

    fn transfer_event() -> EventSpec {
        EventSpec::new(
            "Transfer",
            vec![
                EventParam::new("from", ParamType::Address, true),
                EventParam::new("to", ParamType::Address, true),
                EventParam::new("value", ty("uint256"), false),
            ],
        )
    }

    fn address_topic(a: Address) -> [u8; 32] {
        let mut t = [0u8; 32];
        t[12..].copy_from_slice(a.as_slice());
        t
    }

    #[test]
    fn decodes_indexed_and_data_params_in_order() {
        let spec = transfer_event();
        let from = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let topics = vec![spec.topic(), address_topic(from), address_topic(to)];
        let res = decode_event(&spec, &topics, &word(1000)).unwrap();
        assert_eq!(res.names, vec!["from", "to", "value"]);
        assert_eq!(res.field("from"), Some(&AbiValue::Address(from)));
        assert_eq!(res.field("to"), Some(&AbiValue::Address(to)));
        assert_eq!(res.field("value").and_then(AbiValue::as_u64), Some(1000));
    }

    #[test]
    fn topic_count_checked() {
        let spec = transfer_event();
        let err = decode_event(&spec, &[spec.topic()], &word(1)).unwrap_err();
        assert!(matches!(err, DecodingError::TopicCountMismatch { expected: 3, got: 1, .. }));
    }

    #[test]
    fn wrong_signature_topic() {
        let spec = transfer_event();
        let topics = vec![[0u8; 32], [0u8; 32], [0u8; 32]];
        let err = decode_event(&spec, &topics, &word(1)).unwrap_err();
        assert!(matches!(err, DecodingError::SignatureMismatch { .. }));
    }

    #[test]
    fn indexed_string_is_returned_as_hash() {
        let spec = EventSpec::new(
            "Tagged",
            vec![
                EventParam::new("tag", ParamType::String, true),
                EventParam::new("n", ty("uint8"), false),
            ],
        );
        let hash = [0x42u8; 32];
        let res = decode_event(&spec, &[spec.topic(), hash], &word(3)).unwrap();
        assert_eq!(res.field("tag"), Some(&AbiValue::FixedBytes(hash.to_vec())));
    }

    #[test]
    fn anonymous_event_has_no_signature_topic() {
        let mut spec = transfer_event();
        spec.anonymous = true;
        let topics = vec![address_topic(Address::ZERO), address_topic(Address::ZERO)];
        let res = decode_event(&spec, &topics, &word(5)).unwrap();
        assert_eq!(res.len(), 3);
    }

    #[test]
    fn short_calldata_has_no_selector() {
        let d = ContractDescriptor::new(Address::ZERO, vec![], vec![], vec![]).unwrap();
        let err = decode_call(&d, &[0x01, 0x02]).unwrap_err();
        assert_eq!(err, CodecError::Decoding(DecodingError::MissingSelector { len: 2 }));
    }
}
