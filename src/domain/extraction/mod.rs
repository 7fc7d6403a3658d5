//! Content extraction from loosely-formatted chat replies.

mod extractor;

pub use extractor::{ContentExtractor, ExtractedPayload, REPLY_ID_FIELD};
