//! Chunked transfer encoding support
//!
//! This module reassembles bodies sent with `Transfer-Encoding: chunked`.
//! Requests are never chunked, so only decoding is provided.

use super::{find_crlf, Error, Result};
use bytes::{Buf, Bytes, BytesMut};

/// Chunked decoder
///
/// A resumable state machine. Input may arrive in arbitrary slices; bytes
/// are consumed from the input buffer as soon as they are decoded, and
/// incomplete lines are left in place until more data arrives.
#[derive(Debug, Clone)]
pub struct ChunkedDecoder {
    state: DecoderState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DecoderState {
    ChunkSize,
    ChunkData { remaining: usize },
    ChunkEnd,
    Trailer,
    Complete,
}

impl ChunkedDecoder {
    /// Create a new chunked decoder
    pub fn new() -> Self {
        ChunkedDecoder {
            state: DecoderState::ChunkSize,
        }
    }

    /// Decode as much of `input` as possible into `output`
    ///
    /// Consumed bytes are removed from `input`. Returns `true` once the
    /// terminal chunk and its trailer section have been read.
    pub fn decode(&mut self, input: &mut BytesMut, output: &mut BytesMut) -> Result<bool> {
        loop {
            match self.state {
                DecoderState::ChunkSize => {
                    let Some(crlf_pos) = find_crlf(input) else {
                        return Ok(false);
                    };

                    let size = parse_chunk_size(&input[..crlf_pos])?;
                    input.advance(crlf_pos + 2);

                    self.state = if size == 0 {
                        DecoderState::Trailer
                    } else {
                        DecoderState::ChunkData { remaining: size }
                    };
                }

                DecoderState::ChunkData { remaining } => {
                    if input.is_empty() {
                        return Ok(false);
                    }

                    let to_copy = remaining.min(input.len());
                    output.extend_from_slice(&input[..to_copy]);
                    input.advance(to_copy);

                    self.state = if to_copy == remaining {
                        DecoderState::ChunkEnd
                    } else {
                        DecoderState::ChunkData {
                            remaining: remaining - to_copy,
                        }
                    };
                }

                DecoderState::ChunkEnd => {
                    if input.len() < 2 {
                        return Ok(false);
                    }
                    if &input[..2] != b"\r\n" {
                        return Err(Error::Malformed(
                            "Expected CRLF after chunk data".to_string(),
                        ));
                    }
                    input.advance(2);
                    self.state = DecoderState::ChunkSize;
                }

                DecoderState::Trailer => {
                    // Trailer fields are skipped up to the blank line
                    let Some(crlf_pos) = find_crlf(input) else {
                        return Ok(false);
                    };
                    input.advance(crlf_pos + 2);
                    if crlf_pos == 0 {
                        self.state = DecoderState::Complete;
                    }
                }

                DecoderState::Complete => return Ok(true),
            }
        }
    }

    /// Check if decoding is complete
    pub fn is_complete(&self) -> bool {
        self.state == DecoderState::Complete
    }

    /// Check if the decoder sits between chunks, waiting for a size line
    pub fn at_chunk_boundary(&self) -> bool {
        self.state == DecoderState::ChunkSize
    }

    /// Reset the decoder for reuse
    pub fn reset(&mut self) {
        self.state = DecoderState::ChunkSize;
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a chunk size line, ignoring chunk extensions
fn parse_chunk_size(line: &[u8]) -> Result<usize> {
    let line = String::from_utf8_lossy(line);
    let size_str = line.split(';').next().unwrap_or_default().trim();

    usize::from_str_radix(size_str, 16).map_err(|_| Error::InvalidChunkSize(size_str.to_string()))
}

/// Decode a complete chunked body
///
/// Input that stops cleanly between chunks, without a terminal chunk, is
/// accepted. Input that stops inside a size line or chunk is `Incomplete`.
pub fn decode_chunked_body(input: &[u8]) -> Result<Bytes> {
    let mut decoder = ChunkedDecoder::new();
    let mut input = BytesMut::from(input);
    let mut output = BytesMut::with_capacity(input.len());

    decoder.decode(&mut input, &mut output)?;

    if !decoder.is_complete() && !(decoder.at_chunk_boundary() && input.is_empty()) {
        return Err(Error::Incomplete);
    }

    Ok(output.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_chunk() {
        let output = decode_chunked_body(b"5\r\nhello\r\n0\r\n\r\n").unwrap();
        assert_eq!(output.as_ref(), b"hello");
    }

    #[test]
    fn test_decode_multiple_chunks() {
        let output = decode_chunked_body(b"3\r\nfoo\r\n3\r\nbar\r\n0\r\n\r\n").unwrap();
        assert_eq!(output.as_ref(), b"foobar");
    }

    #[test]
    fn test_decode_hex_sizes() {
        let body = "x".repeat(0x1a);
        let input = format!("1A\r\n{}\r\n0\r\n\r\n", body);
        let output = decode_chunked_body(input.as_bytes()).unwrap();
        assert_eq!(output.as_ref(), body.as_bytes());
    }

    #[test]
    fn test_decode_with_extension() {
        // Chunk extensions (after semicolon) should be ignored
        let output = decode_chunked_body(b"5;extension=value\r\nHello\r\n0\r\n\r\n").unwrap();
        assert_eq!(output.as_ref(), b"Hello");
    }

    #[test]
    fn test_decode_skips_trailers() {
        let input = b"5\r\nHello\r\n0\r\nExpires: never\r\nX-Sum: 1\r\n\r\n";
        let output = decode_chunked_body(input).unwrap();
        assert_eq!(output.as_ref(), b"Hello");
    }

    #[test]
    fn test_decode_without_terminal_chunk() {
        let output = decode_chunked_body(b"5\r\nHello\r\n").unwrap();
        assert_eq!(output.as_ref(), b"Hello");
    }

    #[test]
    fn test_decode_truncated_chunk() {
        let result = decode_chunked_body(b"a\r\nHello");
        assert!(matches!(result, Err(Error::Incomplete)));

        let result = decode_chunked_body(b"5\r\nHello\r\n0\r\n");
        assert!(matches!(result, Err(Error::Incomplete)));
    }

    #[test]
    fn test_decode_invalid_size() {
        let result = decode_chunked_body(b"zz\r\nHello\r\n0\r\n\r\n");
        assert!(matches!(result, Err(Error::InvalidChunkSize(_))));
    }

    #[test]
    fn test_decode_missing_crlf_after_data() {
        let result = decode_chunked_body(b"3\r\nfooX\r\n0\r\n\r\n");
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_decoder_incremental() {
        let input = b"5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new();
        let mut pending = BytesMut::new();
        let mut output = BytesMut::new();
        let mut complete = false;

        // Feed data in small slices that split lines and chunks
        for piece in input.chunks(4) {
            assert!(!complete);
            pending.extend_from_slice(piece);
            complete = decoder.decode(&mut pending, &mut output).unwrap();
        }

        assert!(complete);
        assert!(decoder.is_complete());
        assert!(pending.is_empty());
        assert_eq!(output.as_ref(), b"Hello World");
    }

    #[test]
    fn test_decoder_leaves_bytes_after_terminal_chunk() {
        let mut decoder = ChunkedDecoder::new();
        let mut input = BytesMut::from(&b"2\r\nok\r\n0\r\n\r\nextra"[..]);
        let mut output = BytesMut::new();

        assert!(decoder.decode(&mut input, &mut output).unwrap());
        assert_eq!(output.as_ref(), b"ok");
        assert_eq!(input.as_ref(), b"extra");

        decoder.reset();
        assert!(decoder.at_chunk_boundary());
    }
}
