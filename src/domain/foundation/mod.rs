//! Foundation value objects shared across the domain.

mod ids;
mod timestamp;

pub use ids::{ConversationId, CorrelationId, GroupId, IdError};
pub use timestamp::Timestamp;
