//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! correlation core and the outside world. Adapters implement these ports.
//!
//! - `ChatTransport` - send, poll, and chat-listing operations against the chat backend
//! - `CredentialProvider` - login credentials and persisted session state
//! - `LogSink` - best-effort exchange logging
//! - `PreambleSource` - prompt/instructions text blocks
//! - `ApiKeyValidator` - HTTP surface guard

mod api_key_validator;
mod chat_transport;
mod credential_provider;
mod log_sink;
mod preamble_source;

pub use api_key_validator::ApiKeyValidator;
pub use chat_transport::{ChatSummary, ChatTransport, TransportError};
pub use credential_provider::{CredentialError, CredentialProvider, Credentials};
pub use log_sink::{ExchangeRecord, LogSink};
pub use preamble_source::{PreambleError, PreambleSource};
