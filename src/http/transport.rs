//! Blocking request/response exchange
//!
//! The transport writes a serialized request and reads the reply into a
//! receive buffer bounded by a fixed ceiling. The buffer grows on demand;
//! filling it completely means the reply may have been truncated, which is
//! reported as [`Error::BufferExhausted`].

use super::connection::StreamOps;
use super::parser::ResponseParser;
use super::{Error, HttpResponse, Result};
use crate::log::{debug, trace};
use bytes::{Bytes, BytesMut};

/// Size of a single socket read
const READ_CHUNK: usize = 4096;

/// Transport over a stream
pub struct Transport<S: StreamOps> {
    stream: S,
    capacity: usize,
}

impl<S: StreamOps> Transport<S> {
    /// Create a transport whose receive buffer holds at most `capacity` bytes
    pub fn new(stream: S, capacity: usize) -> Self {
        Transport { stream, capacity }
    }

    /// Get the receive ceiling
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write the whole message
    pub fn send(&mut self, wire: &[u8]) -> Result<()> {
        let mut written = 0;

        while written < wire.len() {
            let n = self.stream.write(&wire[written..])?;
            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
            written += n;
        }

        trace!("sent {} bytes", written);
        Ok(())
    }

    /// Send `wire`, then read until the peer closes
    ///
    /// Returns the raw reply without interpreting it. Length signals inside
    /// the reply are ignored.
    pub fn exchange(&mut self, wire: &[u8]) -> Result<Bytes> {
        self.send(wire)?;

        let mut buffer = BytesMut::new();
        loop {
            let received = buffer.len();
            if self.fill(&mut buffer, received)? == 0 {
                break;
            }
        }

        self.check_capacity(buffer.len())?;
        Ok(buffer.freeze())
    }

    /// Send `wire`, then read and parse the response
    ///
    /// Reading stops as soon as the response is complete by its own framing,
    /// or when the peer closes. The parser keeps the bytes; only their count
    /// is held against the ceiling here.
    pub fn round_trip(&mut self, wire: &[u8]) -> Result<HttpResponse> {
        self.send(wire)?;

        let mut parser = ResponseParser::new();
        let mut chunk = BytesMut::with_capacity(READ_CHUNK);
        let mut received = 0;

        loop {
            chunk.clear();
            let n = self.fill(&mut chunk, received)?;
            received += n;

            if n == 0 {
                self.check_capacity(received)?;
                debug!("peer closed after {} bytes", received);
                return parser.finish();
            }

            if let Some(response) = parser.parse(&chunk)? {
                debug!("response complete after {} bytes", received);
                return Ok(response);
            }
        }
    }

    /// Read once, appending to `buffer`
    ///
    /// `received` is what has been taken in so far. Returns 0 when the peer
    /// closed or the ceiling has been reached.
    fn fill(&mut self, buffer: &mut BytesMut, received: usize) -> Result<usize> {
        let room = self.capacity.saturating_sub(received);
        if room == 0 {
            return Ok(0);
        }

        let start = buffer.len();
        buffer.resize(start + room.min(READ_CHUNK), 0);
        let read = self.stream.read(&mut buffer[start..]);
        let n = match read {
            Ok(n) => n,
            Err(err) => {
                buffer.truncate(start);
                return Err(err);
            }
        };
        buffer.truncate(start + n);

        trace!("received {} bytes ({} total)", n, received + n);
        Ok(n)
    }

    fn check_capacity(&self, received: usize) -> Result<()> {
        if received >= self.capacity {
            return Err(Error::BufferExhausted {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Close the underlying stream
    pub fn close(&mut self) -> Result<()> {
        self.stream.close()
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consume the transport and return the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}
