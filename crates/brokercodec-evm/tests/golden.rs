//! Golden fixture integration tests against the eBlocBroker ABI.
//!
//! Fixture hex in `fixtures/evm/` was produced independently of this crate;
//! selectors and topics are cross-checked with `alloy-json-abi`, encodings
//! with `alloy-dyn-abi`.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, U256};
use brokercodec_core::{
    error::{DecodingError, EncodingError, NotFoundError},
    parse_address,
    types::{AbiValue, ParamType},
    ContractDescriptor, RawLog,
};
use brokercodec_evm::{
    decode_call, decode_event, decode_log, decode_result, encode_call, encode_result, load_descriptor,
    resolve_event, resolve_function, resolve_function_query,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

const CONTRACT: &str = "0x8c22de03d3ce0b9dcb39617e7c31483ec484c720";

fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).unwrap_or_else(|e| panic!("bad hex '{s}': {e}"))
}

/// The shared fixtures live two levels above the crate root.
fn fixture(name: &str) -> serde_json::Value {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/evm");
    p.push(name);
    let text = std::fs::read_to_string(&p).unwrap_or_else(|e| panic!("fixture {}: {e}", p.display()));
    serde_json::from_str(&text).unwrap()
}

fn ebloc() -> ContractDescriptor {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../brokercodec-market/abi/eBlocBroker.json");
    let abi = std::fs::read_to_string(p).expect("eBlocBroker ABI not found");
    load_descriptor(CONTRACT, &abi).expect("ABI should load")
}

fn word(n: u64) -> Vec<u8> {
    U256::from(n).to_be_bytes::<32>().to_vec()
}

// ─── Selectors and topics ─────────────────────────────────────────────────────

const SELECTORS: &[(&str, &str)] = &[
    ("isUserExist(address)", "0255fa1e"),
    ("getJobInfo(address,string,uint256)", "12879bd6"),
    ("getClusterReceivedAmount(address)", "3355e771"),
    ("receiptCheck(string,uint32,uint32,string,uint8,uint256)", "36a9d00e"),
    ("getClusterReceiptSize(address)", "5a742da9"),
    ("getUserInfo(address)", "6386c1c7"),
    ("getClusterAddresses()", "8cd728c9"),
    ("registerUser(string,string,string,string)", "93e54a56"),
    ("getDeployedBlockNumber()", "94e150e7"),
    ("getClusterInfo(address)", "a318b70f"),
    ("deregisterCluster()", "a6084957"),
    ("submitJob(address,string,uint32,string,uint32,uint8)", "ad5b9472"),
    ("getClusterReceiptNode(address,uint32)", "bb69a709"),
    ("updateCluster(uint32,string,string,string,uint256,string)", "d5eedb94"),
    ("isClusterExist(address)", "d7e8916d"),
    ("getJobSize(address,string)", "e28a2a94"),
    ("registerCluster(uint32,string,string,string,uint256,string)", "e6b10120"),
    ("setJobStatus(string,uint32,uint8,uint256)", "eb84d509"),
    ("refund(address,string,uint32)", "fe55ba35"),
];

const TOPICS: &[(&str, &str)] = &[
    (
        "LogJob(address,string,uint256,uint8,string)",
        "711007a4be830d68a6d2a7b6546227b676bf9e7d7a0e3c248552ed72cfec2441",
    ),
    (
        "LogReceipt(address,string,uint256,address,uint256,uint256,uint256,string,uint8)",
        "c8112e3bb1670320064af6c9fb641efd71df7a65190620e2bdb041798e6f1cdc",
    ),
    (
        "LogCluster(address,uint32,string,string,string,uint256,string)",
        "6aadcf2590190f95aae62220dd5450b90a5ea3aa769241f861157cfbf5c8f144",
    ),
    (
        "LogUser(address,string,string,string,string)",
        "f133f13003e6926ceb37fe82f15fff86f83f50e80ca4e3669f948920f6e656b2",
    ),
    (
        "LogRefund(address,string,uint32)",
        "2e6f1feb300be02bc8f8db14b4204255c0c81b253febe6cdbb1c9b96cc97dfe8",
    ),
    (
        "LogSetJob(address,string,uint32,uint256)",
        "d1cba533206cc3c8eaf85e77cd384f4eacca3b87f51f6f8dd5ac331aebd023f8",
    ),
];

#[test]
fn every_function_selector_matches() {
    let d = ebloc();
    assert_eq!(d.function_count(), SELECTORS.len());
    for (sig, expected) in SELECTORS {
        let f = d.function(sig).unwrap_or_else(|| panic!("{sig} missing"));
        assert_eq!(hex::encode(f.selector()), *expected, "{sig}");

        let oracle = alloy_json_abi::Function::parse(&format!("function {sig}")).unwrap();
        assert_eq!(oracle.selector().0, f.selector(), "{sig} vs alloy");
    }
}

#[test]
fn every_event_topic_matches() {
    let d = ebloc();
    assert_eq!(d.event_count(), TOPICS.len());
    for (sig, expected) in TOPICS {
        let e = d.event(sig).unwrap_or_else(|| panic!("{sig} missing"));
        assert_eq!(hex::encode(e.topic()), *expected, "{sig}");

        let oracle = alloy_json_abi::Event::parse(&format!("event {sig}")).unwrap();
        assert_eq!(oracle.selector().0, e.topic(), "{sig} vs alloy");
    }
}

#[test]
fn mutability_from_legacy_flags() {
    let d = ebloc();
    assert!(d.function("getJobInfo(address,string,uint256)").unwrap().is_constant);
    assert!(!d.function("refund(address,string,uint32)").unwrap().is_constant);
    let submit = d
        .function("submitJob(address,string,uint32,string,uint32,uint8)")
        .unwrap();
    assert_eq!(submit.mutability, brokercodec_core::StateMutability::Payable);
}

// ─── Calls ────────────────────────────────────────────────────────────────────

#[test]
fn is_user_exist_round_trip() {
    let d = ebloc();
    let f = resolve_function(&d, "isUserExist", &[ParamType::Address]).unwrap();
    assert_eq!(f.outputs.len(), 1);
    assert_eq!(f.outputs[0].ty, ParamType::Bool);

    let user = Address::repeat_byte(0x42);
    let call = encode_call(f, &[AbiValue::Address(user)]).unwrap();
    assert_eq!(call.selector, [0x02, 0x55, 0xfa, 0x1e]);
    assert_eq!(call.arguments.len(), 32);

    let res = decode_result(f, &word(1)).unwrap();
    assert_eq!(res.get(0), Some(&AbiValue::Bool(true)));
}

#[test]
fn submit_job_matches_fixture_calldata() {
    let fx = fixture("eblocbroker-submitjob.json");
    let d = ebloc();
    let f = resolve_function_query(&d, fx["function"].as_str().unwrap()).unwrap();
    let args: Vec<AbiValue> = f
        .inputs
        .iter()
        .zip(fx["args"].as_array().unwrap())
        .map(|(p, v)| brokercodec_core::json::value_from_json(&p.ty, v).unwrap())
        .collect();
    let call = encode_call(f, &args).unwrap();
    assert_eq!(call.to_calldata(), hex_to_bytes(fx["calldata"].as_str().unwrap()));

    let (decoded_spec, decoded) = decode_call(&d, &call.to_calldata()).unwrap();
    assert_eq!(decoded_spec.name, "submitJob");
    assert_eq!(decoded.into_values(), args);
}

#[test]
fn submit_job_matches_alloy_dyn_abi() {
    let d = ebloc();
    let f = resolve_function_query(&d, "submitJob").unwrap();
    let cluster = parse_address("0x4e4a0750350796164d8defc442a712b7557bf282").unwrap();
    let ours = encode_call(
        f,
        &[
            AbiValue::Address(cluster),
            AbiValue::from("QmWmyoMoctfbAaiEs2G46gpeUmhqFRDW6KWo64y5r581Vz"),
            AbiValue::from(4u32),
            AbiValue::from(""),
            AbiValue::from(120u32),
            AbiValue::from(0u8),
        ],
    )
    .unwrap();

    let theirs = DynSolValue::Tuple(vec![
        DynSolValue::Address(cluster),
        DynSolValue::String("QmWmyoMoctfbAaiEs2G46gpeUmhqFRDW6KWo64y5r581Vz".into()),
        DynSolValue::Uint(U256::from(4u64), 32),
        DynSolValue::String(String::new()),
        DynSolValue::Uint(U256::from(120u64), 32),
        DynSolValue::Uint(U256::ZERO, 8),
    ])
    .abi_encode_params();
    assert_eq!(ours.arguments, theirs);
}

#[test]
fn get_job_info_decodes_fixture() {
    let fx = fixture("eblocbroker-getjobinfo.json");
    let d = ebloc();
    let f = resolve_function_query(&d, "getJobInfo").unwrap();
    let raw = hex_to_bytes(fx["returnData"].as_str().unwrap());
    let res = decode_result(f, &raw).unwrap();
    assert_eq!(res.len(), 7);
    let expected = fx["expected"].as_array().unwrap();
    for i in 0..6 {
        assert_eq!(res.get(i).and_then(AbiValue::as_u64), expected[i].as_u64(), "output {i}");
    }
    let owner = parse_address(expected[6].as_str().unwrap()).unwrap();
    assert_eq!(res.get(6).and_then(AbiValue::as_address), Some(owner));
}

#[test]
fn cluster_addresses_array_matches_alloy_decode() {
    let d = ebloc();
    let f = resolve_function_query(&d, "getClusterAddresses").unwrap();
    let clusters = vec![
        AbiValue::Address(Address::repeat_byte(0x01)),
        AbiValue::Address(Address::repeat_byte(0x02)),
        AbiValue::Address(Address::repeat_byte(0x03)),
    ];
    let raw = encode_result(f, &[AbiValue::Array(clusters.clone())]).unwrap();

    let oracle = DynSolType::Tuple(vec![DynSolType::Array(Box::new(DynSolType::Address))])
        .abi_decode_params(&raw)
        .unwrap();
    let DynSolValue::Tuple(outer) = oracle else { panic!("expected tuple") };
    let DynSolValue::Array(items) = &outer[0] else { panic!("expected array") };
    assert_eq!(items.len(), 3);
    assert_eq!(items[1], DynSolValue::Address(Address::repeat_byte(0x02)));

    let res = decode_result(f, &raw).unwrap();
    assert_eq!(res.get(0), Some(&AbiValue::Array(clusters)));
}

#[test]
fn receipt_node_carries_negative_int32() {
    let d = ebloc();
    let f = resolve_function_query(&d, "getClusterReceiptNode").unwrap();
    let neg = alloy_primitives::I256::try_from(-1i64).unwrap();
    let raw = encode_result(f, &[AbiValue::from(1_533_000_000u64), AbiValue::Int(neg)]).unwrap();
    assert_eq!(&raw[32..], &[0xffu8; 32]);
    let res = decode_result(f, &raw).unwrap();
    assert_eq!(res.get(1), Some(&AbiValue::Int(neg)));
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[test]
fn unknown_function_name() {
    let d = ebloc();
    let err = resolve_function(&d, "doesNotExist", &[]).unwrap_err();
    assert_eq!(err, NotFoundError::Function { name: "doesNotExist".into() });
}

#[test]
fn uint32_boundary() {
    let d = ebloc();
    let f = resolve_function_query(&d, "refund").unwrap();
    let cluster = AbiValue::Address(Address::repeat_byte(0x09));
    let max = AbiValue::Uint(U256::from(u32::MAX));
    assert!(encode_call(f, &[cluster.clone(), "QmKey".into(), max]).is_ok());

    let over = AbiValue::Uint(U256::from(1u64 << 32));
    let err = encode_call(f, &[cluster, "QmKey".into(), over]).unwrap_err();
    match err {
        EncodingError::OutOfRange { index, param, ty, .. } => {
            assert_eq!(index, 2);
            assert_eq!(param, "index");
            assert_eq!(ty, "uint32");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn empty_job_description_encodes_as_zero_length() {
    let d = ebloc();
    let f = resolve_function_query(&d, "setJobStatus").unwrap();
    let call = encode_call(
        f,
        &[AbiValue::from(""), AbiValue::from(0u32), AbiValue::from(4u8), AbiValue::from(0u64)],
    )
    .unwrap();
    // 4 head words, then a single zero length word for the empty key
    assert_eq!(call.arguments.len(), 5 * 32);
    assert_eq!(&call.arguments[..32], word(128).as_slice());
    assert_eq!(&call.arguments[128..], word(0).as_slice());
}

#[test]
fn truncated_return_data() {
    let d = ebloc();
    let f = resolve_function_query(&d, "getClusterInfo").unwrap();
    let err = decode_result(f, &[word(1), word(2)].concat()).unwrap_err();
    assert!(matches!(err, DecodingError::Truncated { ref param, .. } if param == "arg2"));
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[test]
fn log_job_fixture() {
    let fx = fixture("eblocbroker-logjob.json");
    let d = ebloc();
    let topics: Vec<String> = fx["topics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap().to_string())
        .collect();
    let log = RawLog::from_hex(
        fx["contractAddress"].as_str().unwrap(),
        &topics,
        fx["data"].as_str().unwrap(),
    )
    .unwrap();

    let (spec, res) = decode_log(&d, &log).unwrap();
    assert_eq!(spec.name, "LogJob");

    let expected = &fx["expectedFields"];
    let cluster = parse_address(expected["cluster"].as_str().unwrap()).unwrap();
    assert_eq!(res.field("cluster").and_then(AbiValue::as_address), Some(cluster));
    assert_eq!(res.field("jobKey").and_then(AbiValue::as_str), expected["jobKey"].as_str());
    assert_eq!(res.field("index").and_then(AbiValue::as_u64), Some(0));
    assert_eq!(res.field("storageID").and_then(AbiValue::as_u64), Some(0));
    assert_eq!(res.field("desc").and_then(AbiValue::as_str), Some("Science"));
    assert_eq!(
        res.names,
        vec!["cluster", "jobKey", "index", "storageID", "desc"]
    );
}

#[test]
fn log_refund_with_wrong_topic_is_rejected() {
    let d = ebloc();
    let spec = resolve_event(&d, "LogRefund").unwrap();
    let other = resolve_event(&d, "LogJob").unwrap();
    let err = decode_event(spec, &[other.topic()], &[]).unwrap_err();
    assert!(matches!(err, DecodingError::SignatureMismatch { .. }));
}
