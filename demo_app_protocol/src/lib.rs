pub mod content;
pub use content::{Content, EmbeddedResource, TextContent};
pub mod jsonrpc;
pub mod messages;
pub mod resource;
pub mod tool;

/// Free-form `_meta` object attached to tools, resources and results.
pub type Meta = serde_json::Map<String, serde_json::Value>;
