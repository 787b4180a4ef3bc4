use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::Meta;

/// A known resource that the server is capable of reading. This struct provides metadata about
/// resources in list calls. Contents are provided by `ResourceContents`.
///
/// In contrast to `EmbeddedResource`, this struct is provided independently to a client (when they
/// list available resources), whereas EmbeddedResource is embedded into a tool call result.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// The URI of this resource. This is its identity: reads match it exactly.
    pub uri: String,
    /// A programmatic name for this resource.
    pub name: String,
    /// A human-readable name, used by clients to populate UI elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// The size of the raw resource content, in bytes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Rendering hints for the client.
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Resource {
    /// Creates a new Resource from a URI and a name.
    ///
    /// The URI must parse as a URL, although any scheme is allowed (e.g. `ui://`).
    pub fn new<U: Into<String>, N: Into<String>>(uri: U, name: N) -> Result<Self, ResourceError> {
        let uri = uri.into();
        Url::parse(&uri).map_err(|e| ResourceError::InvalidUri(uri.clone(), e.to_string()))?;

        Ok(Self {
            uri,
            name: name.into(),
            title: None,
            description: None,
            mime_type: None,
            size: None,
            meta: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// The contents of a resource, identified by the `uri` field in `Resource`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ResourceContents {
    /// UTF-8 text, such as HTML markup.
    TextResourceContents {
        uri: String,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        text: String,
        #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
    /// Binary data, base64 encoded.
    BlobResourceContents {
        uri: String,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        blob: String,
    },
}

impl ResourceContents {
    pub fn text<U, M, T>(uri: U, mime_type: M, text: T) -> Self
    where
        U: Into<String>,
        M: Into<String>,
        T: Into<String>,
    {
        ResourceContents::TextResourceContents {
            uri: uri.into(),
            mime_type: Some(mime_type.into()),
            text: text.into(),
            meta: None,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            ResourceContents::TextResourceContents { uri, .. }
            | ResourceContents::BlobResourceContents { uri, .. } => uri,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            ResourceContents::TextResourceContents { mime_type, .. }
            | ResourceContents::BlobResourceContents { mime_type, .. } => mime_type.as_deref(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Execution failed: {0}")]
    ExecutionError(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid URI: {0}. Error: {1}")]
    InvalidUri(String, String),
}
