//! HTTP adapters: the relay's inbound REST surface.

pub mod middleware;
pub mod relay;
