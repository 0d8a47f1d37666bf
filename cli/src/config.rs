//! CLI configuration: which contract to work against and how to log.
//!
//! Sources, lowest precedence first: the bundled eBlocBroker artifact, a
//! YAML or JSON config file, `BROKERCODEC_ADDRESS` / `BROKERCODEC_ABI`, and
//! the `--address` / `--abi` flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use brokercodec_evm::{load_deployment, load_descriptor, ContractCodec};
use brokercodec_market::{EBLOCBROKER_ABI, EBLOCBROKER_ADDRESS};
use brokercodec_observability::LogConfig;
use serde::Deserialize;

pub const ENV_ADDRESS: &str = "BROKERCODEC_ADDRESS";
pub const ENV_ABI: &str = "BROKERCODEC_ABI";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContractConfig {
    /// Contract address; may be omitted when the ABI file is a
    /// `{"address": ..., "abi": [...]}` deployment document.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub abi_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl CliConfig {
    /// Read a config file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read config '{}'", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text).with_context(|| format!("parse JSON config '{}'", path.display()))
        } else {
            serde_yaml::from_str(&text).with_context(|| format!("parse YAML config '{}'", path.display()))
        }
    }

    /// Apply `BROKERCODEC_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(address) = lookup(ENV_ADDRESS).filter(|v| !v.is_empty()) {
            self.contract.address = Some(address);
        }
        if let Some(abi) = lookup(ENV_ABI).filter(|v| !v.is_empty()) {
            self.contract.abi_path = Some(PathBuf::from(abi));
        }
    }

    /// Apply command-line overrides.
    pub fn apply_flags(&mut self, address: Option<String>, abi: Option<PathBuf>) {
        if address.is_some() {
            self.contract.address = address;
        }
        if abi.is_some() {
            self.contract.abi_path = abi;
        }
    }

    /// Build the codec for the configured contract.
    pub fn codec(&self) -> Result<ContractCodec> {
        let descriptor = match (&self.contract.abi_path, &self.contract.address) {
            (Some(path), address) => {
                let json = std::fs::read_to_string(path).with_context(|| format!("read ABI '{}'", path.display()))?;
                match address {
                    Some(address) => load_descriptor(address, &json),
                    None => load_deployment(&json),
                }
                .with_context(|| format!("load ABI '{}'", path.display()))?
            }
            (None, address) => {
                let address = address.as_deref().unwrap_or(EBLOCBROKER_ADDRESS);
                load_descriptor(address, EBLOCBROKER_ABI).context("load bundled eBlocBroker ABI")?
            }
        };
        tracing::debug!(
            address = %descriptor.address_hex(),
            functions = descriptor.function_count(),
            events = descriptor.event_count(),
            "contract loaded"
        );
        Ok(ContractCodec::new(descriptor))
    }
}
