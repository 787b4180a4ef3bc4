use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Meta;

/// Metadata to describe a tool exposed by the MCP server.
/// A tool is like an RPC method and can be called by a model, either to fetch data, or perform
/// side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    /// Human-readable name shown by clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    /// A JSON Schema object defining the expected parameters
    pub input_schema: Value,
    /// Invocation hints for the client, e.g. which widget renders the result.
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            title: None,
            description: description.into(),
            input_schema,
            meta: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}
