//! Reply content extraction.
//!
//! The chat transport renders structured replies inconsistently: sometimes
//! raw JSON, sometimes HTML-escaped JSON embedded in markup, sometimes
//! XML-wrapped. There is no schema contract with the producer, so extraction
//! is an ordered chain of fallback strategies that stops at the first
//! success and returns `None` when every strategy fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Name of the correlation field the downstream responder echoes back.
pub const REPLY_ID_FIELD: &str = "reply_id";

/// Wrapper the chat client renders around code-formatted replies.
static PRE_CODE_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<pre><code class="language-json">(.*?)</code></pre>"#)
        .expect("pre/code wrapper pattern is valid")
});

/// Markdown-style fenced block, with or without a `json` info string.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n(.*?)```").expect("fenced block pattern is valid")
});

/// Structured payload extracted from a raw chat message.
///
/// Only JSON objects qualify: the wire contract is a JSON object carrying at
/// minimum the correlation field, with every other field passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPayload {
    reply_id: Option<String>,
    fields: Map<String, Value>,
}

impl ExtractedPayload {
    fn from_object(fields: Map<String, Value>) -> Self {
        let reply_id = fields
            .get(REPLY_ID_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self { reply_id, fields }
    }

    /// Correlation field value, if the payload carried one.
    pub fn reply_id(&self) -> Option<&str> {
        self.reply_id.as_deref()
    }

    /// All extracted fields, correlation field included.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Looks up a single field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Consumes the payload into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Parses raw chat-message bodies into structured payloads.
///
/// Stateless and pure: extracting the same content twice yields the same
/// result.
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    /// Creates a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Runs the fallback chain over `raw`, returning the first payload that
    /// parses to a JSON object.
    ///
    /// Order:
    /// 1. direct JSON parse of the trimmed content;
    /// 2. XML parse, then JSON parse of the entity-decoded element text;
    /// 3. regex extraction from known wrapper patterns, entity-decoded and
    ///    stripped of control characters, then JSON parse.
    pub fn extract(&self, raw: &str) -> Option<ExtractedPayload> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(payload) = parse_json_object(trimmed) {
            return Some(payload);
        }

        if let Some(payload) = self.extract_from_xml(trimmed) {
            return Some(payload);
        }

        if let Some(payload) = self.extract_from_wrapper(trimmed) {
            return Some(payload);
        }

        tracing::debug!(
            content_len = trimmed.len(),
            "no extraction strategy produced a payload"
        );
        None
    }

    /// Strategy 2: treat the content as XML and JSON-parse the element text.
    ///
    /// The chat client frequently delivers replies as markup whose text
    /// nodes hold HTML-escaped JSON. Root text wins; when the root has no
    /// text of its own, the text of its immediate children is concatenated.
    fn extract_from_xml(&self, content: &str) -> Option<ExtractedPayload> {
        let candidate = sanitize_for_xml(content)?;
        if let Some(payload) = self.extract_from_xml_document(&candidate) {
            return Some(payload);
        }
        // Content with multiple sibling root elements only parses under a
        // synthetic root.
        let wrapped = format!("<root>{candidate}</root>");
        self.extract_from_xml_document(&wrapped)
    }

    fn extract_from_xml_document(&self, candidate: &str) -> Option<ExtractedPayload> {
        let document = roxmltree::Document::parse(candidate).ok()?;
        let root = document.root_element();

        let mut text = root
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .unwrap_or_default();
        if text.is_empty() {
            text = root
                .children()
                .filter(|node| node.is_element())
                .filter_map(|node| node.text())
                .collect::<Vec<_>>()
                .join("");
        }
        if text.trim().is_empty() {
            return None;
        }

        let decoded = html_escape::decode_html_entities(&text);
        parse_json_object(decoded.trim())
    }

    /// Strategy 3: pull a JSON fragment out of a known wrapper pattern.
    fn extract_from_wrapper(&self, content: &str) -> Option<ExtractedPayload> {
        for pattern in [&*PRE_CODE_WRAPPER, &*FENCED_BLOCK] {
            if let Some(captures) = pattern.captures(content) {
                let fragment = captures.get(1)?.as_str();
                let decoded = html_escape::decode_html_entities(fragment);
                let cleaned = strip_control_chars(&decoded);
                if let Some(payload) = parse_json_object(cleaned.trim()) {
                    return Some(payload);
                }
                tracing::debug!("wrapper fragment did not parse as a JSON object");
            }
        }
        None
    }
}

/// JSON-parses `candidate` and accepts only object payloads.
///
/// Arrays and scalars cannot carry the correlation field, so they are
/// treated as extraction failures rather than payloads.
fn parse_json_object(candidate: &str) -> Option<ExtractedPayload> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(fields)) => Some(ExtractedPayload::from_object(fields)),
        Ok(_) => None,
        Err(_) => None,
    }
}

/// Trims leading characters before the first `<` and trailing characters
/// after the last `>`, the shape XML-like chat content arrives in.
fn sanitize_for_xml(content: &str) -> Option<String> {
    let start = content.find('<')?;
    let end = content.rfind('>')?;
    if end <= start {
        return None;
    }
    Some(content[start..=end].to_string())
}

fn strip_control_chars(content: &str) -> String {
    content.chars().filter(|c| !('\u{0}'..='\u{1f}').contains(c)).collect()
}
