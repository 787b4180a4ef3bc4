//! [`tower`] middleware for MCP message services.

pub mod tracing;
