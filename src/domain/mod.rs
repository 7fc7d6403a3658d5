//! Domain layer: the reply-correlation core.

pub mod correlation;
pub mod extraction;
pub mod foundation;
