use thiserror::Error;

/// Errors raised by a transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("LinesCodecError error: {0}")]
    LinesCodecError(#[from] tokio_util::codec::LinesCodecError),
}

/// A line read from the transport that couldn't be turned into a request.
#[derive(Error, Debug)]
pub enum MessageParseError {
    #[error("Failed to deserialise message: {0}")]
    Deserialisation(serde_json::Error),

    #[error("Failed to read line: {0}")]
    LinesCodecError(#[from] tokio_util::codec::LinesCodecError),
}

pub mod http;
mod stdio;
pub use http::serve_http;
pub use stdio::StdioTransport;
