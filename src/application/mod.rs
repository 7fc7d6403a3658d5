//! Application layer: use cases wiring the domain core to the ports.

mod dispatch;
mod relay_service;

pub use dispatch::{DispatchError, DispatchQueue, DEFAULT_QUEUE_CAPACITY, DEFAULT_SEND_SPACING};
pub use relay_service::{RelayError, RelayService};
