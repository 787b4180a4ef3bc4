//! demo_app is a [Model Context Protocol][mcp-spec] (MCP) server that exposes a shared counter
//! through three tools, and the HTML widget a client renders their results with.
//!
//! # Example
//!
//! ```rust,ignore
//! use demo_app::{serve, DispatcherBuilder, ServiceExt};
//! use demo_app::assets::{AssetDir, MarkupCache};
//! use demo_app::transport::StdioTransport;
//! use demo_app::widget::{load_demo_widget, WIDGET_COMPONENT};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cache = MarkupCache::new(AssetDir::new("assets"));
//!     let widget = load_demo_widget(&cache, WIDGET_COMPONENT).await?;
//!     let service = DispatcherBuilder::new("demo-app", widget).build()?;
//!
//!     serve(service.into_request_service(), StdioTransport::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Tools
//!
//! `increment` and `decrement` take an optional integer `amount` (default 1), and `reset` takes
//! nothing. Each successful call mutates the counter once and returns the new value in three
//! places: a text message, `structuredContent.count`, and a `_meta` block that embeds the widget.
//! Bad arguments and unknown tool names come back as results with `isError` set; they never
//! touch the counter.
//!
//! # Resources
//!
//! The catalog holds one resource, the widget at [`widget::WIDGET_URI`]. Its markup is read from
//! disk once, before the server starts taking requests; see [`assets`].
//!
//! # Middleware and layers
//!
//! [`Dispatcher`] is a [`tower::Service`] over single messages, so any [`tower`] layer can wrap
//! it. [`middleware::tracing::TracingLayer`] opens a span per message.
//!
//! # Transports
//!
//! [`serve`] speaks newline-delimited JSON-RPC over any byte stream, such as
//! [`transport::StdioTransport`]. [`transport::serve_http`] accepts the same requests as
//! `POST /mcp` bodies and also serves the widget's `.js` and `.css` files.
//!
//! # Logging
//!
//! Log messages go through [`tracing`]. When serving over stdio, stdout carries the protocol, so
//! the subscriber must write somewhere else, such as a log file.
//!
//! [mcp-spec]: https://modelcontextprotocol.io/specification/2024-11-05/
//! [tower]: https://github.com/tokio-rs/tower

pub mod assets;
pub mod envelope;
pub mod errors;
pub mod middleware;
pub mod registry;
pub mod schema;
mod serve;
mod service;
mod service_ext;
pub mod state;
pub mod tools;
pub mod transport;
pub mod widget;

// aliases
pub use serve::serve;
pub use service::{Dispatcher, DispatcherBuilder, PROTOCOL_VERSION};
pub use service_ext::{RequestService, ServiceExt};
pub use state::CounterStore;

// re-export certain MCP protocol types
pub use demo_app_protocol::{messages::CallToolResult, resource::ResourceError};
