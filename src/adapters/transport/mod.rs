//! Chat transport adapters: the HTTP backend client, its session state, the
//! file-backed credential provider, and an in-memory mock for tests.

mod credentials;
mod http_chat;
mod mock;
mod session;

pub use credentials::FileCredentialProvider;
pub use http_chat::{ChatBackendConfig, HttpChatTransport};
pub use mock::{MockChatTransport, SentMessage};
pub use session::Session;
