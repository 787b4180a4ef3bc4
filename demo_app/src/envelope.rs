//! Assembly of `tools/call` results.
//!
//! A successful result has three channels, all built from one counter reading:
//! * `content`: the human-readable message as a text block (left out when there is no message).
//! * `structuredContent`: `{"count": <value>}`, which the widget renders.
//! * `_meta`: a copy of the widget resource, its output template URI, flags telling the client the
//!   result renders as a widget, a summary line, and a construction timestamp.

use crate::registry::ResourceDescriptor;
use chrono::{DateTime, SecondsFormat, Utc};
use demo_app_protocol::{messages::CallToolResult, Content, Meta};
use serde_json::{json, Value};

/// The outcome of a counter tool: what to tell the user, and the count after the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterReply {
    pub message: String,
    pub count: i64,
}

impl CounterReply {
    pub fn new(message: impl Into<String>, count: i64) -> Self {
        Self {
            message: message.into(),
            count,
        }
    }

    /// Build the full result, embedding a snapshot of `widget` as it is at `now`.
    pub fn into_call_tool_result(
        self,
        widget: &ResourceDescriptor,
        now: DateTime<Utc>,
    ) -> CallToolResult {
        let mut content = Vec::new();
        if !self.message.is_empty() {
            content.push(Content::text(self.message));
        }

        CallToolResult {
            content,
            structured_content: Some(json!({ "count": self.count })),
            meta: Some(widget_meta(widget, self.count, now)),
            is_error: false,
        }
    }
}

fn widget_meta(widget: &ResourceDescriptor, count: i64, now: DateTime<Utc>) -> Meta {
    let snapshot = widget.snapshot();
    // Same shape as an embedded resource content block.
    let embedded = json!({
        "type": "resource",
        "resource": {
            "uri": snapshot.uri(),
            "mimeType": snapshot.mime_type(),
            "text": &*widget.text,
        }
    });

    let mut meta = Meta::new();
    meta.insert("openai/widget".into(), embedded);
    meta.insert("openai/outputTemplate".into(), Value::from(widget.uri.as_str()));
    meta.insert("openai/widgetAccessible".into(), Value::Bool(true));
    meta.insert("openai/resultCanProduceWidget".into(), Value::Bool(true));
    meta.insert(
        "customMessage".into(),
        Value::String(format!("Demo value is currently {count}")),
    );
    meta.insert(
        "timestamp".into(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    meta
}

/// A failed tool call, reported to the caller rather than raised as a protocol error.
pub fn tool_error(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(text)
}
