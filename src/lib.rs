//! h1wire - minimal HTTP/1.1 client over a raw TCP socket
//!
//! This crate builds HTTP/1.1 request messages by hand, sends them over a
//! single blocking TCP connection and parses the raw response back into
//! structured form, including chunked transfer-encoded bodies.

mod log;

pub mod http;

pub use http::{Client, ClientConfig, Error, Headers, HttpRequest, HttpResponse, Method, QueryParams, Result};
