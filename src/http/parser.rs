//! HTTP response parsing
//!
//! This module turns the raw bytes of an HTTP/1.1 response into an
//! [`HttpResponse`]. Parsing runs strictly left to right: status line,
//! header lines up to the blank line, then the body according to its framing.

use super::chunked::ChunkedDecoder;
use super::message::{HttpResponse, Version};
use super::{find_crlf, Error, Headers, Result};
use crate::log::{debug, warning};
use bytes::{Buf, BytesMut};

/// Parsed status line and headers
#[derive(Debug)]
struct ResponseHead {
    version: Version,
    status: String,
    reason: String,
    headers: Headers,
}

/// How the end of the body is signalled
#[derive(Debug)]
enum BodyFraming {
    Chunked(ChunkedDecoder),
    Length(usize),
    Empty,
    Close,
}

/// Parse HTTP response status line
///
/// Format: VERSION SP STATUS [SP REASON]
/// Example: HTTP/1.1 200 OK
pub fn parse_status_line(line: &str) -> Result<(Version, String, String)> {
    let (version, rest) = line
        .split_once(' ')
        .ok_or_else(|| Error::Malformed(format!("No space in status line: {}", line)))?;

    let version = Version::from_str(version)?;

    let (status, reason) = rest.split_once(' ').unwrap_or((rest, ""));
    if status.len() != 3 || !status.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Malformed(format!("Invalid status code: {}", status)));
    }

    Ok((version, status.to_string(), reason.to_string()))
}

/// HTTP response parser
///
/// Feed bytes with [`parse`](ResponseParser::parse) as they arrive; it yields
/// the response as soon as the message is complete by its own framing
/// (`Content-Length`, terminal chunk, or a status without a body). Bodies
/// delimited by connection close are resolved with
/// [`finish`](ResponseParser::finish).
#[derive(Debug)]
pub struct ResponseParser {
    buffer: BytesMut,
    head: Option<ResponseHead>,
    framing: BodyFraming,
    body: BytesMut,
}

impl ResponseParser {
    /// Create a new response parser
    pub fn new() -> Self {
        ResponseParser {
            buffer: BytesMut::new(),
            head: None,
            framing: BodyFraming::Close,
            body: BytesMut::new(),
        }
    }

    /// Feed data to the parser
    ///
    /// Returns Ok(Some(response)) when a complete response is parsed,
    /// Ok(None) if more data is needed, or Err on parse error.
    pub fn parse(&mut self, data: &[u8]) -> Result<Option<HttpResponse>> {
        self.buffer.extend_from_slice(data);

        if self.head.is_none() && !self.parse_head()? {
            return Ok(None);
        }

        if self.parse_body()? {
            return self.complete().map(Some);
        }

        Ok(None)
    }

    /// Finish parsing at end of stream
    pub fn finish(mut self) -> Result<HttpResponse> {
        if self.head.is_none() {
            if self.buffer.is_empty() {
                return Err(Error::ConnectionClosed);
            }
            if !self.parse_head()? {
                return Err(Error::Malformed(
                    "Stream ended before end of headers".to_string(),
                ));
            }
        }

        if self.parse_body()? {
            return self.complete();
        }

        match &self.framing {
            BodyFraming::Close => {
                let rest = self.buffer.split();
                self.body.unsplit(rest);
            }
            BodyFraming::Chunked(decoder)
                if decoder.at_chunk_boundary() && self.buffer.is_empty() =>
            {
                debug!("chunked body ended without terminal chunk");
            }
            _ => return Err(Error::Incomplete),
        }

        self.complete()
    }

    /// Check whether the status line and headers have been parsed
    pub fn has_head(&self) -> bool {
        self.head.is_some()
    }

    /// Reset the parser for reuse
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.head = None;
        self.framing = BodyFraming::Close;
        self.body.clear();
    }

    /// Parse status line and headers once the blank line is buffered
    ///
    /// Interim 1xx heads are consumed and skipped; `101` is final.
    fn parse_head(&mut self) -> Result<bool> {
        loop {
            let Some(head_len) = find_head_end(&self.buffer) else {
                return Ok(false);
            };

            let head = std::str::from_utf8(&self.buffer[..head_len])
                .map_err(|_| Error::Malformed("Response head is not valid UTF-8".to_string()))?;
            let mut lines = head.split("\r\n");

            let status_line = lines.next().unwrap_or_default();
            let (version, status, reason) = parse_status_line(status_line)?;

            let mut headers = Headers::new();
            for line in lines.take_while(|line| !line.is_empty()) {
                let (name, value) = Headers::parse_header_line(line)?;
                headers.insert(name.to_ascii_lowercase(), value);
            }

            self.buffer.advance(head_len);

            if is_interim(&status) {
                debug!("skipping interim response: {} {}", status, reason);
                continue;
            }

            self.framing = body_framing(&status, &headers)?;
            self.head = Some(ResponseHead {
                version,
                status,
                reason,
                headers,
            });

            return Ok(true);
        }
    }

    /// Advance the body, returning true once it is complete
    fn parse_body(&mut self) -> Result<bool> {
        match &mut self.framing {
            BodyFraming::Chunked(decoder) => decoder.decode(&mut self.buffer, &mut self.body),
            BodyFraming::Length(len) => {
                if self.buffer.len() < *len {
                    return Ok(false);
                }
                let body = self.buffer.split_to(*len);
                self.body.unsplit(body);
                Ok(true)
            }
            BodyFraming::Empty => Ok(true),
            BodyFraming::Close => Ok(false),
        }
    }

    fn complete(&mut self) -> Result<HttpResponse> {
        let head = self
            .head
            .take()
            .ok_or_else(|| Error::Malformed("Missing response head".to_string()))?;

        if !self.buffer.is_empty() {
            warning!(
                "ignoring {} bytes after end of response body",
                self.buffer.len()
            );
            self.buffer.clear();
        }

        debug!(
            "parsed response: {} {} ({} body bytes)",
            head.status,
            head.reason,
            self.body.len()
        );

        Ok(HttpResponse::from_parts(
            head.version,
            head.status,
            head.reason,
            head.headers,
            self.body.split().freeze(),
        ))
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete raw response received up to end of stream
pub fn parse_response(raw: &[u8]) -> Result<HttpResponse> {
    let mut parser = ResponseParser::new();
    match parser.parse(raw)? {
        Some(response) => Ok(response),
        None => parser.finish(),
    }
}

/// Length of the head including the blank line, if fully buffered
fn find_head_end(buf: &[u8]) -> Option<usize> {
    let mut pos = find_crlf(buf)? + 2;

    loop {
        let line_len = find_crlf(&buf[pos..])?;
        pos += line_len + 2;
        if line_len == 0 {
            return Some(pos);
        }
    }
}

/// Decide how the body is delimited from the status and headers
fn body_framing(status: &str, headers: &Headers) -> Result<BodyFraming> {
    // Framing headers on these describe the resource, not a body
    if status.starts_with('1') || status == "204" || status == "304" {
        return Ok(BodyFraming::Empty);
    }

    if let Some(encoding) = headers.get("transfer-encoding") {
        if encoding.trim().eq_ignore_ascii_case("chunked") {
            return Ok(BodyFraming::Chunked(ChunkedDecoder::new()));
        }
    }

    if let Some(cl_str) = headers.get("content-length") {
        let len = cl_str
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::Malformed(format!("Invalid Content-Length: {}", cl_str)))?;
        return Ok(BodyFraming::Length(len));
    }

    Ok(BodyFraming::Close)
}

/// Informational status followed by the final response
fn is_interim(status: &str) -> bool {
    status.starts_with('1') && status != "101"
}
