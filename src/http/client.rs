//! HTTP client implementation
//!
//! This module provides the public GET/POST facade.

use super::{
    parse_response, ClientConfig, Connection, Headers, HttpRequest, HttpResponse, Method,
    QueryParams, RequestSerializer, Result, Transport,
};
use crate::log::debug;
use bytes::Bytes;

/// HTTP client
///
/// Requests announce `Connection: close`, so every call runs on its own
/// connection. The constructor opens the first one eagerly, which surfaces
/// resolution and connection failures before any request is made; later
/// calls reconnect to the same host and port.
#[derive(Debug)]
pub struct Client {
    host: String,
    port: u16,
    config: ClientConfig,
    serializer: RequestSerializer,
    connection: Option<Connection>,
}

impl Client {
    /// Connect to `host:port` with the default configuration
    pub fn connect(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::with_config(host, port, ClientConfig::default())
    }

    /// Connect to `host:port` with a custom configuration
    pub fn with_config(host: impl Into<String>, port: u16, config: ClientConfig) -> Result<Self> {
        let host = host.into();
        let connection = Connection::open(&host, port, &config)?;

        Ok(Client {
            serializer: RequestSerializer::new(host.clone()),
            host,
            port,
            config,
            connection: Some(connection),
        })
    }

    /// Send a GET request
    pub fn get(
        &mut self,
        path: &str,
        params: &QueryParams,
        headers: &Headers,
    ) -> Result<HttpResponse> {
        let request = HttpRequest::builder()
            .method(Method::Get)
            .path(path)
            .params(params.clone())
            .headers(headers.clone())
            .build()?;

        self.request(&request)
    }

    /// Send a POST request with a body
    ///
    /// Query parameters are not part of a POST request line and are dropped.
    pub fn post(
        &mut self,
        path: &str,
        params: &QueryParams,
        headers: &Headers,
        body: impl Into<Bytes>,
    ) -> Result<HttpResponse> {
        let request = HttpRequest::builder()
            .method(Method::Post)
            .path(path)
            .params(params.clone())
            .headers(headers.clone())
            .body(body)
            .build()?;

        self.request(&request)
    }

    /// Send a request and wait for its response
    pub fn request(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => Connection::open(&self.host, self.port, &self.config)?,
        };

        debug!("{} {} to {}:{}", request.method(), request.path(), self.host, self.port);

        let wire = self.serializer.serialize(request);
        let mut transport = Transport::new(connection, self.config.max_response_size);

        let response = if self.config.read_until_close {
            let raw = transport.exchange(&wire)?;
            parse_response(&raw)
        } else {
            transport.round_trip(&wire)
        };

        // The connection is spent either way
        if let Err(_err) = transport.close() {
            debug!("closing connection failed: {}", _err);
        }
        response
    }

    /// Get the target host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the target port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Error;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Read a request head (and `Content-Length` body) from a raw stream
    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|l| l.strip_prefix("Content-Length: "))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(data).unwrap()
    }

    #[test]
    fn test_get_sends_expected_request() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);

            assert_eq!(
                request,
                "GET /test?q=1 HTTP/1.1\r\nACCEPT: text/plain\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n"
            );

            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK")
                .unwrap();
        });

        let mut client = Client::connect("127.0.0.1", addr.port()).unwrap();
        let params: QueryParams = [("q", "1")].into_iter().collect();
        let headers: Headers = [("Accept", "text/plain")].into_iter().collect();

        let response = client.get("/test", &params, &headers).unwrap();
        assert_eq!(response.status(), "200");
        assert_eq!(response.reason(), "OK");
        assert_eq!(response.headers().get("content-type"), Some("text/plain"));
        assert_eq!(response.body().as_ref(), b"OK");

        handle.join().unwrap();
    }

    #[test]
    fn test_post_helper() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);

            assert!(request.starts_with("POST /data HTTP/1.1\r\n"));
            assert!(request.contains("Content-Length: 9\r\n"));
            assert!(request.ends_with("\r\n\r\ntest data"));

            stream
                .write_all(b"HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n")
                .unwrap();
        });

        let mut client = Client::connect("127.0.0.1", addr.port()).unwrap();
        let response = client
            .post("/data", &QueryParams::new(), &Headers::new(), "test data")
            .unwrap();
        assert_eq!(response.status(), "201");
        assert!(response.body().is_empty());

        handle.join().unwrap();
    }

    #[test]
    fn test_invalid_path_is_rejected_before_sending() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = Client::connect("127.0.0.1", addr.port()).unwrap();
        let result = client.get("relative", &QueryParams::new(), &Headers::new());
        assert!(matches!(result, Err(Error::InvalidRequest(_))));

        assert_eq!(client.host(), "127.0.0.1");
        assert_eq!(client.port(), addr.port());
    }
}
