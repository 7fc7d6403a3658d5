//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the correlation core to external systems:
//! - `auth` - API key storage
//! - `http` - Inbound REST surface
//! - `log_sink` - Exchange log sinks
//! - `preamble` - Preamble file loading
//! - `transport` - Chat backend client and session state

pub mod auth;
pub mod http;
pub mod log_sink;
pub mod preamble;
pub mod transport;
