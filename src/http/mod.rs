//! HTTP/1.1 client implementation
//!
//! This module turns structured requests into HTTP/1.1 bytes, exchanges them
//! over a blocking TCP socket and parses the raw reply back into a response.
//!
//! # Architecture
//!
//! Each call flows through the same pipeline:
//!
//! - `RequestSerializer` renders an `HttpRequest` to wire bytes
//! - `Transport` writes them and reads the reply over anything implementing
//!   `StreamOps` (a `Connection` in production, in-memory peers in tests)
//! - `ResponseParser` rebuilds an `HttpResponse`, handing chunked bodies to
//!   the `ChunkedDecoder`
//!
//! Requests always carry `Connection: close`, so the `Client` opens a fresh
//! connection for every call.
//!
//! # Examples
//!
//! ```no_run
//! use h1wire::http::{Client, Headers, QueryParams};
//!
//! let mut client = Client::connect("localhost", 8080).unwrap();
//!
//! let mut params = QueryParams::new();
//! params.insert("q", "rust");
//!
//! let mut headers = Headers::new();
//! headers.insert("Accept", "text/plain");
//!
//! let response = client.get("/search", &params, &headers).unwrap();
//! assert_eq!(response.status(), "200");
//! println!("{}", response);
//! ```

pub mod chunked;
pub mod client;
pub mod config;
pub mod connection;
pub mod headers;
pub mod message;
pub mod parser;
pub mod serializer;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use connection::{Connection, StreamOps};
pub use headers::Headers;
pub use message::{HttpRequest, HttpResponse, Method, QueryParams, Version};
pub use parser::{parse_response, ResponseParser};
pub use serializer::RequestSerializer;
pub use transport::Transport;

use std::net::SocketAddr;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to resolve host {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No address found for host: {0}")]
    NoAddress(String),

    #[error("Failed to create socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write request: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to read response: {0}")]
    Read(#[source] std::io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Response exceeds receive buffer of {capacity} bytes")]
    BufferExhausted { capacity: usize },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("Incomplete message")]
    Incomplete,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Map a socket read failure, keeping timeouts distinct
    pub(crate) fn read(err: std::io::Error) -> Self {
        if is_timeout(&err) {
            Error::Timeout
        } else {
            Error::Read(err)
        }
    }

    /// Map a socket write failure, keeping timeouts distinct
    pub(crate) fn write(err: std::io::Error) -> Self {
        if is_timeout(&err) {
            Error::Timeout
        } else {
            Error::Write(err)
        }
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

/// Default receive ceiling in bytes
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 500_000;

/// CRLF line ending
pub const CRLF: &str = "\r\n";

/// Find the next CRLF in a buffer
pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
