//! TCP connection and stream operations
//!
//! This module owns the socket a request travels over. The transport never
//! touches the socket directly: it goes through the [`StreamOps`] trait, so
//! tests can run the exact same I/O loops against in-memory peers.

use super::{ClientConfig, Error, Result};
use crate::log::debug;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

/// Stream operations trait
///
/// The blocking byte-stream operations the transport needs.
pub trait StreamOps {
    /// Read data from the stream; 0 means the peer closed
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write data to the stream, returning how much was accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Close the stream
    fn close(&mut self) -> Result<()>;
}

impl<S: StreamOps + ?Sized> StreamOps for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A single TCP connection to a host
///
/// The socket is shut down by [`close`](Connection::close) or, at the
/// latest, when the connection is dropped. A closed connection cannot be
/// reopened.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    closed: bool,
}

impl Connection {
    /// Resolve `host`, then connect to the first address that accepts
    pub fn open(host: &str, port: u16, config: &ClientConfig) -> Result<Self> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| Error::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();

        let conn = first_reachable(host, addrs, |addr| Self::connect_addr(addr, config))?;
        debug!("connected to {} ({})", host, conn.peer);
        Ok(conn)
    }

    fn connect_addr(addr: SocketAddr, config: &ClientConfig) -> Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(Error::Socket)?;

        let sock_addr = SockAddr::from(addr);
        let connected = match config.connect_timeout {
            Some(timeout) => socket.connect_timeout(&sock_addr, timeout),
            None => socket.connect(&sock_addr),
        };
        connected.map_err(|source| Error::Connect { addr, source })?;

        socket.set_read_timeout(config.read_timeout)?;
        socket.set_write_timeout(config.write_timeout)?;

        Ok(Connection {
            stream: socket.into(),
            peer: addr,
            closed: false,
        })
    }

    /// Get the address this connection is connected to
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Check if the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shut the socket down in both directions
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing connection to {}", self.peer);

        match self.stream.shutdown(Shutdown::Both) {
            Err(err) if err.kind() != io::ErrorKind::NotConnected => Err(Error::Io(err)),
            _ => Ok(()),
        }
    }
}

/// Try each address in turn
///
/// Any per-address failure moves on to the next address; the last error is
/// returned once all of them have failed.
fn first_reachable<T, F>(host: &str, addrs: Vec<SocketAddr>, mut connect: F) -> Result<T>
where
    F: FnMut(SocketAddr) -> Result<T>,
{
    let mut last_err = None;
    for addr in addrs {
        match connect(addr) {
            Ok(conn) => return Ok(conn),
            Err(err) => {
                debug!("connect to {} failed: {}", addr, err);
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::NoAddress(host.to_string())))
}

impl StreamOps for Connection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        self.stream.read(buf).map_err(Error::read)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        self.stream.write(buf).map_err(Error::write)
    }

    fn close(&mut self) -> Result<()> {
        Connection::close(self)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
