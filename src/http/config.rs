//! Client configuration

use super::DEFAULT_MAX_RESPONSE_SIZE;
use std::time::Duration;

/// Client configuration
///
/// Defaults match the classic blocking client: no timeouts and a
/// 500 000 byte receive ceiling.
///
/// ```
/// use h1wire::http::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .max_response_size(4 * 1024 * 1024)
///     .read_timeout(Duration::from_secs(5));
/// assert_eq!(config.get_max_response_size(), 4 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) max_response_size: usize,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) write_timeout: Option<Duration>,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) read_until_close: bool,
}

impl ClientConfig {
    /// Set the receive ceiling; reaching it is an error
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }

    /// Set the socket read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the socket write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Always read until the peer closes, ignoring `Content-Length` and
    /// chunk terminators when deciding when to stop reading
    pub fn read_until_close(mut self, enabled: bool) -> Self {
        self.read_until_close = enabled;
        self
    }

    pub fn get_max_response_size(&self) -> usize {
        self.max_response_size
    }

    pub fn get_read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    pub fn get_write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }

    pub fn get_connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn is_read_until_close(&self) -> bool {
        self.read_until_close
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
            read_until_close: false,
        }
    }
}
