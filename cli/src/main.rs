//! BrokerCodec CLI: work with the eBlocBroker contract ABI from the shell.
//!
//! # Commands
//! ```text
//! brokercodec functions
//! brokercodec events
//! brokercodec encode-call   --function <name|signature> --args <json>
//! brokercodec decode-call   --calldata <hex>
//! brokercodec decode-result --function <name|signature> --data <hex>
//! brokercodec decode-log    --topics <hex>... --data <hex>
//! brokercodec info
//! ```

use anyhow::{Context, Result};
use brokercodec_core::{
    json::{result_to_json, value_from_json},
    AbiValue, RawLog,
};
use brokercodec_evm::ContractCodec;
use brokercodec_observability::init_tracing;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(
    name = "brokercodec",
    about = "ABI-driven call codec for the eBlocBroker marketplace contract",
    long_about = "
BrokerCodec CLI: list the contract's functions and events, encode calls, and
decode calldata, return data and logs. Defaults to the bundled eBlocBroker
deployment.

ENVIRONMENT VARIABLES:
  BROKERCODEC_ADDRESS   Contract address override
  BROKERCODEC_ABI       Path to an ABI (or {address, abi}) JSON document
  RUST_LOG              Log filter, replaces the configured levels
",
    version
)]
struct Cli {
    /// YAML or JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Contract address (overrides config and environment)
    #[arg(long, global = true)]
    address: Option<String>,

    /// ABI JSON file (overrides config and environment)
    #[arg(long, global = true)]
    abi: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List functions with selectors and mutability
    Functions {
        #[arg(long)]
        json: bool,
    },

    /// List events with their topic hashes
    Events {
        #[arg(long)]
        json: bool,
    },

    /// Encode a function call to calldata
    #[command(name = "encode-call")]
    EncodeCall {
        /// Function name, or full signature for overloads
        #[arg(long)]
        function: String,
        /// JSON array of arguments, e.g. '["0x4e4a…f282", "QmKey", 1]'
        #[arg(long, default_value = "[]")]
        args: String,
    },

    /// Decode transaction input (selector + arguments)
    #[command(name = "decode-call")]
    DecodeCall {
        /// 0x-prefixed hex
        #[arg(long)]
        calldata: String,
        #[arg(long)]
        json: bool,
    },

    /// Decode the return data of a function
    #[command(name = "decode-result")]
    DecodeResult {
        /// Function name, or full signature for overloads
        #[arg(long)]
        function: String,
        /// 0x-prefixed hex
        #[arg(long)]
        data: String,
        #[arg(long)]
        json: bool,
    },

    /// Decode an event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// topics[0] = event signature hash, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        #[arg(long)]
        json: bool,
    },

    /// Show the loaded contract and build info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    config.apply_env();
    config.apply_flags(cli.address.clone(), cli.abi.clone());
    if cli.verbose {
        config.log.level = "debug".into();
    }
    init_tracing(&config.log).context("initialise logging")?;

    let codec = config.codec()?;

    match cli.command {
        Commands::Functions { json } => cmd_functions(&codec, json),
        Commands::Events { json } => cmd_events(&codec, json),
        Commands::EncodeCall { function, args } => cmd_encode_call(&codec, &function, &args),
        Commands::DecodeCall { calldata, json } => cmd_decode_call(&codec, &calldata, json),
        Commands::DecodeResult { function, data, json } => cmd_decode_result(&codec, &function, &data, json),
        Commands::DecodeLog { topics, data, json } => cmd_decode_log(&codec, &topics, &data, json),
        Commands::Info => cmd_info(&codec),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_functions(codec: &ContractCodec, as_json: bool) -> Result<()> {
    let functions = codec.descriptor().functions();
    if as_json {
        let list: Vec<Value> = functions
            .map(|f| {
                json!({
                    "signature": f.signature(),
                    "selector": format!("0x{}", hex::encode(f.selector())),
                    "stateMutability": f.mutability.to_string(),
                    "outputs": f.outputs.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for f in functions {
            let outputs: Vec<String> = f.outputs.iter().map(|p| p.ty.to_string()).collect();
            println!(
                "0x{}  {:11} {} -> ({})",
                hex::encode(f.selector()),
                f.mutability.to_string(),
                f.signature(),
                outputs.join(",")
            );
        }
    }
    Ok(())
}

fn cmd_events(codec: &ContractCodec, as_json: bool) -> Result<()> {
    let events = codec.descriptor().events();
    if as_json {
        let list: Vec<Value> = events
            .map(|e| {
                json!({
                    "signature": e.signature(),
                    "topic0": format!("0x{}", hex::encode(e.topic())),
                    "anonymous": e.anonymous,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for e in events {
            println!("0x{}  {}", hex::encode(e.topic()), e.signature());
        }
    }
    Ok(())
}

fn cmd_encode_call(codec: &ContractCodec, function: &str, args_json: &str) -> Result<()> {
    let spec = codec.function(function)?;
    let args = parse_args(&spec.input_types(), args_json)?;
    let call = codec.encode_call(&spec.signature(), &args)?;
    println!("{}", call.to_hex());
    Ok(())
}

fn cmd_decode_call(codec: &ContractCodec, calldata: &str, as_json: bool) -> Result<()> {
    let bytes = parse_hex(calldata).context("invalid calldata hex")?;
    let (spec, decoded) = codec.decode_call(&bytes)?;
    if as_json {
        let out = json!({
            "function": spec.signature(),
            "selector": format!("0x{}", hex::encode(spec.selector())),
            "inputs": result_to_json(&decoded),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Function:  {}", spec.signature());
        println!("Selector:  0x{}", hex::encode(spec.selector()));
        println!("Inputs:");
        for (name, val) in decoded.iter() {
            println!("  {}: {}", name, val);
        }
    }
    Ok(())
}

fn cmd_decode_result(codec: &ContractCodec, function: &str, data: &str, as_json: bool) -> Result<()> {
    let bytes = parse_hex(data).context("invalid return data hex")?;
    let decoded = codec.decode_result(function, &bytes)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&result_to_json(&decoded))?);
    } else {
        for (name, val) in decoded.iter() {
            println!("{}: {}", name, val);
        }
    }
    Ok(())
}

fn cmd_decode_log(codec: &ContractCodec, topics: &[String], data: &str, as_json: bool) -> Result<()> {
    let log = RawLog::from_hex(&codec.descriptor().address_hex(), topics, data).map_err(anyhow::Error::msg)?;
    let (spec, decoded) = codec.decode_log(&log)?;
    if as_json {
        let out = json!({
            "event": spec.name,
            "signature": spec.signature(),
            "fields": result_to_json(&decoded),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Event:   {}", spec.signature());
        println!("Fields:");
        for (name, val) in decoded.iter() {
            println!("  {}: {}", name, val);
        }
    }
    Ok(())
}

fn cmd_info(codec: &ContractCodec) -> Result<()> {
    let d = codec.descriptor();
    println!("BrokerCodec v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Contract:     {}", d.address_hex());
    println!("Functions:    {}", d.function_count());
    println!("Events:       {}", d.event_count());
    if !d.constructor().is_empty() {
        let inputs: Vec<String> = d.constructor().iter().map(|p| p.ty.to_string()).collect();
        println!("Constructor:  ({})", inputs.join(","));
    }
    Ok(())
}

// ─── Input parsing ───────────────────────────────────────────────────────────

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    Ok(hex::decode(s.strip_prefix("0x").unwrap_or(s))?)
}

/// Read a JSON argument array against the declared input types.
fn parse_args(types: &[brokercodec_core::ParamType], args_json: &str) -> Result<Vec<AbiValue>> {
    let value: Value = serde_json::from_str(args_json).context("parse args JSON")?;
    let Value::Array(items) = value else {
        anyhow::bail!("args must be a JSON array");
    };
    if items.len() != types.len() {
        anyhow::bail!("expected {} arguments, got {}", types.len(), items.len());
    }
    types
        .iter()
        .zip(&items)
        .enumerate()
        .map(|(i, (ty, item))| {
            value_from_json(ty, item).map_err(|e| anyhow::anyhow!("argument {i} ({ty}): {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokercodec_core::ParamType;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "brokercodec",
            "decode-result",
            "--function",
            "getJobSize",
            "--data",
            "0x00",
            "--abi",
            "abi.json",
        ])
        .unwrap();
        assert_eq!(cli.abi, Some(PathBuf::from("abi.json")));
        assert!(matches!(cli.command, Commands::DecodeResult { .. }));
    }

    #[test]
    fn args_follow_declared_types() {
        let types = [ParamType::Address, ParamType::String, ParamType::Uint(32)];
        let args = parse_args(
            &types,
            r#"["0x4e4a0750350796164d8defc442a712b7557bf282", "QmKey", "7"]"#,
        )
        .unwrap();
        assert_eq!(args[1], AbiValue::String("QmKey".into()));
        assert_eq!(args[2].as_u64(), Some(7));
    }

    #[test]
    fn args_count_is_checked() {
        let err = parse_args(&[ParamType::Bool], "[]").unwrap_err();
        assert!(err.to_string().contains("expected 1 arguments"));
    }

    #[test]
    fn bad_arg_names_position() {
        let err = parse_args(&[ParamType::Address], r#"[true]"#).unwrap_err();
        assert!(err.to_string().starts_with("argument 0 (address)"));
    }

    #[test]
    fn hex_with_or_without_prefix() {
        assert_eq!(parse_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(parse_hex("0102").unwrap(), vec![1, 2]);
        assert!(parse_hex("0xzz").is_err());
    }
}
