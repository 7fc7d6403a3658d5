//! HTTP middleware.

mod api_key;

pub use api_key::{api_key_middleware, ApiKeyState};
