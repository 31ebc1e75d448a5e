//! HTTP message types
//!
//! This module defines the request and response values exchanged by the client.

use super::{Error, Headers, Result, CRLF};
use bytes::Bytes;
use std::fmt;
use std::io;

/// HTTP methods supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Convert method to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    Http10,
    #[default]
    Http11,
}

impl Version {
    /// Parse version from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            _ => Err(Error::InvalidVersion(s.to_string())),
        }
    }

    /// Convert version to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical reason phrase for a status code
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        411 => "Length Required",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Query string parameters
///
/// An insertion-ordered map of names to values. Names are case-sensitive
/// and neither names nor values are percent-encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        QueryParams { params: Vec::new() }
    }

    /// Insert a parameter, replacing the value of an existing name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.params.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = QueryParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// HTTP request
///
/// Always HTTP/1.1. Built through [`HttpRequestBuilder`], which enforces
/// that the path is absolute and that GET requests carry no body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    params: QueryParams,
    headers: Headers,
    body: Bytes,
}

impl HttpRequest {
    /// Create a builder for constructing requests
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Get the request method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Get the request path, without the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the HTTP version
    pub fn version(&self) -> Version {
        Version::Http11
    }

    /// Get the query parameters
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Get the headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get the body
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Builder for HTTP requests
#[derive(Debug, Default)]
pub struct HttpRequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    params: QueryParams,
    headers: Headers,
    body: Bytes,
}

impl HttpRequestBuilder {
    /// Set the HTTP method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Replace all query parameters
    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all headers
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the request
    pub fn build(self) -> Result<HttpRequest> {
        let method = self.method.unwrap_or(Method::Get);
        let path = self.path.unwrap_or_else(|| "/".to_string());

        if !path.starts_with('/') {
            return Err(Error::InvalidRequest(format!(
                "Path must begin with '/': {}",
                path
            )));
        }

        if method == Method::Get && !self.body.is_empty() {
            return Err(Error::InvalidRequest(
                "GET request cannot carry a body".to_string(),
            ));
        }

        Ok(HttpRequest {
            method,
            path,
            params: self.params,
            headers: self.headers,
            body: self.body,
        })
    }
}

/// HTTP response
///
/// Header names are lower-case when produced by the parser, and the body is
/// always fully decoded.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    version: Version,
    status: String,
    reason: String,
    headers: Headers,
    body: Bytes,
}

impl HttpResponse {
    /// Create a builder for constructing responses
    pub fn builder() -> HttpResponseBuilder {
        HttpResponseBuilder::default()
    }

    /// Assemble a response from parsed wire fields
    pub(crate) fn from_parts(
        version: Version,
        status: String,
        reason: String,
        headers: Headers,
        body: Bytes,
    ) -> Self {
        HttpResponse {
            version,
            status,
            reason,
            headers,
            body,
        }
    }

    /// Get the HTTP version
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get the status code as received, e.g. `"200"`
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Get the status code as a number
    pub fn status_code(&self) -> Option<u16> {
        self.status.parse().ok()
    }

    /// Get the reason phrase
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Get the headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get the body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return its body
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Convert the response to wire format
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        // Status line
        buf.extend_from_slice(self.version.as_str().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.status.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.reason.as_bytes());
        buf.extend_from_slice(CRLF.as_bytes());

        // Headers
        for (name, value) in self.headers.iter() {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(CRLF.as_bytes());
        }

        // Empty line
        buf.extend_from_slice(CRLF.as_bytes());

        // Body
        buf.extend_from_slice(&self.body);

        buf
    }

    /// Render the response for humans to a text stream
    pub fn write_debug<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.version, self.status, self.reason)?;
        write!(f, "{}", self.headers)?;
        writeln!(f)?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.body))
    }
}

/// Builder for HTTP responses
#[derive(Debug, Default)]
pub struct HttpResponseBuilder {
    version: Option<Version>,
    status: Option<u16>,
    reason: Option<String>,
    headers: Headers,
    body: Bytes,
}

impl HttpResponseBuilder {
    /// Set the HTTP version
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the status code
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the reason phrase
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the response
    pub fn build(self) -> HttpResponse {
        let status = self.status.unwrap_or(200);
        let reason = self
            .reason
            .unwrap_or_else(|| reason_phrase(status).to_string());
        HttpResponse {
            version: self.version.unwrap_or_default(),
            status: format!("{:03}", status),
            reason,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_version_from_str() {
        assert_eq!(Version::from_str("HTTP/1.0").unwrap(), Version::Http10);
        assert_eq!(Version::from_str("HTTP/1.1").unwrap(), Version::Http11);
        assert!(matches!(
            Version::from_str("HTTP/2.0"),
            Err(Error::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_query_params_replace() {
        let mut params = QueryParams::new();
        params.insert("a", "1");
        params.insert("b", "2");
        assert_eq!(params.insert("a", "3"), Some("1".to_string()));

        let collected: Vec<_> = params.iter().collect();
        assert_eq!(collected, vec![("a", "3"), ("b", "2")]);
        // Names are case-sensitive
        params.insert("A", "4");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_request_builder() {
        let req = HttpRequest::builder()
            .method(Method::Post)
            .path("/test")
            .header("Content-Type", "text/plain")
            .body("Hello")
            .build()
            .unwrap();

        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.path(), "/test");
        assert_eq!(req.version(), Version::Http11);
        assert_eq!(req.body().as_ref(), b"Hello");
        assert_eq!(req.headers().get("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_request_builder_defaults() {
        let req = HttpRequest::builder().build().unwrap();
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.path(), "/");
        assert!(req.params().is_empty());
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_request_rejects_relative_path() {
        let result = HttpRequest::builder().path("index.html").build();
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_get_rejects_body() {
        let result = HttpRequest::builder()
            .method(Method::Get)
            .path("/")
            .body("oops")
            .build();
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_response_builder() {
        let resp = HttpResponse::builder()
            .status(404)
            .header("Content-Type", "text/html")
            .body("Not Found")
            .build();

        assert_eq!(resp.status(), "404");
        assert_eq!(resp.status_code(), Some(404));
        assert_eq!(resp.reason(), "Not Found");
        assert_eq!(resp.body().as_ref(), b"Not Found");
    }

    #[test]
    fn test_response_to_wire() {
        let resp = HttpResponse::builder()
            .status(200)
            .header("Content-Length", "0")
            .build();

        let wire = String::from_utf8(resp.to_wire()).unwrap();
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Content-Length: 0\r\n"));
        assert!(wire.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_response_debug_display() {
        let resp = HttpResponse::builder()
            .status(201)
            .header("content-type", "text/plain")
            .body("made it")
            .build();

        let mut out = Vec::new();
        resp.write_debug(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "HTTP/1.1 201 Created\ncontent-type: text/plain\n\nmade it\n"
        );
    }
}
