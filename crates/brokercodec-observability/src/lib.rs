//! # brokercodec-observability
//!
//! `tracing` subscriber setup shared by BrokerCodec binaries.
//!
//! Libraries in the workspace only emit events (`debug!` on encode/decode,
//! `warn!` on rejected descriptors and reverted transactions); installing a
//! subscriber is the application's job, done once through [`init_tracing`].

pub mod logging;

pub use logging::{init_tracing, LogConfig, LoggingError};
