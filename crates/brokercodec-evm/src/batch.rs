//! Rayon-powered log decoding for receipts and historical scans.

use brokercodec_core::{error::CodecError, ContractDescriptor, DecodedResult, RawLog};
use rayon::prelude::*;

use crate::decoder::decode_log;

/// One successfully decoded log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    /// Position of the log in the input slice
    pub log_index: usize,
    /// Event name, e.g. `LogJob`
    pub event: String,
    pub values: DecodedResult,
}

/// Decode a slice of logs in parallel using Rayon.
///
/// Logs emitted by other contracts are skipped. Returns `(successes, errors)`,
/// both in input order.
pub fn decode_logs_parallel(
    descriptor: &ContractDescriptor,
    logs: &[RawLog],
) -> (Vec<DecodedLog>, Vec<(usize, CodecError)>) {
    let address = descriptor.address();
    let results: Vec<(usize, Result<DecodedLog, CodecError>)> = logs
        .par_iter()
        .enumerate()
        .filter(|(_, log)| log.address == address)
        .map(|(idx, log)| {
            let decoded = decode_log(descriptor, log).map(|(spec, values)| DecodedLog {
                log_index: idx,
                event: spec.name.clone(),
                values,
            });
            (idx, decoded)
        })
        .collect();

    let mut events = Vec::new();
    let mut errors = Vec::new();
    for (idx, r) in results {
        match r {
            Ok(e) => events.push(e),
            Err(e) => errors.push((idx, e)),
        }
    }
    tracing::debug!(
        decoded = events.len(),
        failed = errors.len(),
        "batch log decode finished"
    );
    (events, errors)
}
