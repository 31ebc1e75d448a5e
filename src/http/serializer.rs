//! HTTP request serialization
//!
//! Renders an [`HttpRequest`] into the exact bytes sent on the wire.

use super::message::{HttpRequest, Method};
use super::CRLF;
use crate::log::warning;
use bytes::{BufMut, Bytes, BytesMut};

/// Request serializer bound to the target host
///
/// Every request gets `Host` and `Connection: close` appended after the
/// caller's headers. POST requests also get a `Content-Length` computed
/// from the body; a caller-supplied `Content-Length` is never emitted.
#[derive(Debug, Clone)]
pub struct RequestSerializer {
    host: String,
}

impl RequestSerializer {
    /// Create a serializer for requests sent to `host`
    pub fn new(host: impl Into<String>) -> Self {
        RequestSerializer { host: host.into() }
    }

    /// Get the host written into the `Host` header
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Convert the request to wire format
    pub fn serialize(&self, request: &HttpRequest) -> Bytes {
        let mut buf = BytesMut::with_capacity(256 + request.body().len());

        // Request line
        buf.put_slice(request.method().as_str().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(request.path().as_bytes());
        match request.method() {
            Method::Get => put_query(&mut buf, request),
            Method::Post => {
                if !request.params().is_empty() {
                    warning!(
                        "dropping {} query parameters from POST {}",
                        request.params().len(),
                        request.path()
                    );
                }
            }
        }
        buf.put_u8(b' ');
        buf.put_slice(request.version().as_str().as_bytes());
        buf.put_slice(CRLF.as_bytes());

        // Caller headers, names upper-cased
        for (name, value) in request.headers().iter() {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            put_header(&mut buf, &name.to_ascii_uppercase(), value);
        }

        put_header(&mut buf, "Host", &self.host);
        put_header(&mut buf, "Connection", "close");

        if request.method() == Method::Post {
            put_header(&mut buf, "Content-Length", &request.body().len().to_string());
        }

        // Empty line
        buf.put_slice(CRLF.as_bytes());

        if request.method() == Method::Post {
            buf.put_slice(request.body());
        }

        buf.freeze()
    }
}

/// Append `?k1=v1&k2=v2`, verbatim, when there are parameters
fn put_query(buf: &mut BytesMut, request: &HttpRequest) {
    for (i, (name, value)) in request.params().iter().enumerate() {
        buf.put_u8(if i == 0 { b'?' } else { b'&' });
        buf.put_slice(name.as_bytes());
        buf.put_u8(b'=');
        buf.put_slice(value.as_bytes());
    }
}

fn put_header(buf: &mut BytesMut, name: &str, value: &str) {
    buf.put_slice(name.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(CRLF.as_bytes());
}
