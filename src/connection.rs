use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Opens the byte stream a [`Connection`] talks over.
pub trait Connector {
    type Stream: Read + Write;

    fn open(&self, config: &ClientConfig) -> Result<Self::Stream>;
}

/// Plain TCP with the configured timeout applied to connect, read and write.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn open(&self, config: &ClientConfig) -> Result<TcpStream> {
        let (host, port) = config.endpoint()?;
        let timeout = config.timeout();

        let addrs = (host, port).to_socket_addrs().map_err(|e| {
            ClientError::Connection(format!("invalid address '{}:{}': {}", host, port, e))
        })?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = match timeout {
                Some(t) => TcpStream::connect_timeout(&addr, t),
                None => TcpStream::connect(addr),
            };

            match attempt {
                Ok(stream) => {
                    stream.set_read_timeout(timeout).map_err(ClientError::Option)?;
                    stream.set_write_timeout(timeout).map_err(ClientError::Option)?;

                    return Ok(stream);
                }
                Err(e) => {
                    trace!("connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(ClientError::Connection(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("no address found for '{}:{}'", host, port)),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unopened,
    Connected,
}

/// The single socket a client owns.
///
/// Connecting while connected and disconnecting while unopened are no-ops.
/// Dropping the connection closes the stream.
#[derive(Debug)]
pub enum Connection<S> {
    Unopened,
    Connected(S),
}

impl<S> Default for Connection<S> {
    fn default() -> Self {
        Connection::Unopened
    }
}

impl<S> Connection<S>
where
    S: Read + Write,
{
    pub fn new() -> Self {
        Connection::Unopened
    }

    pub fn state(&self) -> State {
        match self {
            Connection::Unopened => State::Unopened,
            Connection::Connected(_) => State::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == State::Connected
    }

    pub fn connect<C>(&mut self, connector: &C, config: &ClientConfig) -> Result<()>
    where
        C: Connector<Stream = S>,
    {
        if let Connection::Unopened = self {
            *self = Connection::Connected(connector.open(config)?);
            debug!(
                "connected to {}:{}",
                config.host.as_deref().unwrap_or_default(),
                config.port.unwrap_or_default()
            );
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Connection::Connected(stream) = std::mem::replace(self, Connection::Unopened) {
            drop(stream);
            debug!("disconnected");
        }
    }

    /// Writes as much of `buf` as the peer accepts and returns the count.
    ///
    /// A failure before anything was written is an I/O error, a failure after
    /// some bytes went out is a partial write carrying that error. A
    /// zero-length write ends early and the short count is returned for the
    /// caller to judge.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let stream = self.stream_mut()?;
        let mut written = 0;

        while written < buf.len() {
            match stream.write(&buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if written == 0 => return Err(ClientError::Io(e)),
                Err(e) => {
                    return Err(ClientError::PartialWrite {
                        written,
                        expected: buf.len(),
                        source: Some(e),
                    })
                }
            }
        }

        stream.flush()?;

        Ok(written)
    }

    /// Blocking read of at most `max` bytes. An empty chunk means the peer
    /// closed the stream.
    pub fn read_chunk(&mut self, max: usize) -> Result<Vec<u8>> {
        let stream = self.stream_mut()?;
        let mut buf = vec![0; max];

        loop {
            match stream.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ClientError::Io(e)),
            }
        }
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        match self {
            Connection::Connected(stream) => Ok(stream),
            Connection::Unopened => Err(ClientError::Connection(
                "client is not yet connected".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::net::TcpListener;

    #[derive(Default)]
    struct Counting {
        opened: Cell<usize>,
    }

    impl Connector for Counting {
        type Stream = Cursor<Vec<u8>>;

        fn open(&self, _: &ClientConfig) -> Result<Self::Stream> {
            self.opened.set(self.opened.get() + 1);
            Ok(Cursor::new(Vec::new()))
        }
    }

    /// Accepts `limit` bytes, then reports a timeout.
    struct Stalling {
        accepted: Vec<u8>,
        limit: usize,
    }

    impl Write for Stalling {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.accepted.len();
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "stalled"));
            }

            let n = room.min(buf.len());
            self.accepted.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Read for Stalling {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"))
        }
    }

    #[test]
    fn connect_twice_opens_once() {
        let connector = Counting::default();
        let config = ClientConfig::new();
        let mut connection = Connection::new();

        connection.connect(&connector, &config).unwrap();
        connection.connect(&connector, &config).unwrap();

        assert_eq!(connector.opened.get(), 1);
        assert_eq!(connection.state(), State::Connected);
    }

    #[test]
    fn disconnect_twice_is_harmless() {
        let connector = Counting::default();
        let mut connection = Connection::new();

        connection.connect(&connector, &ClientConfig::new()).unwrap();
        connection.disconnect();
        assert_eq!(connection.state(), State::Unopened);

        connection.disconnect();
        assert_eq!(connection.state(), State::Unopened);
    }

    #[test]
    fn io_without_connection_fails() {
        let mut connection = Connection::<Cursor<Vec<u8>>>::new();

        assert!(connection.write(b"{}").unwrap_err().is_connection());
        assert!(connection.read_chunk(16).unwrap_err().is_connection());
    }

    #[test]
    fn zero_length_write_returns_short_count() {
        let mut connection = Connection::Connected(Cursor::new([0u8; 4]));

        assert_eq!(connection.write(b"0123456789").unwrap(), 4);
    }

    #[test]
    fn write_failure_after_some_bytes_keeps_os_error() {
        let mut connection = Connection::Connected(Stalling {
            accepted: Vec::new(),
            limit: 4,
        });

        match connection.write(b"0123456789") {
            Err(ClientError::PartialWrite {
                written,
                expected,
                source: Some(e),
            }) => {
                assert_eq!((written, expected), (4, 10));
                assert_eq!(e.kind(), io::ErrorKind::TimedOut);
            }
            other => panic!("expected a partial write with its cause, got {other:?}"),
        }
    }

    #[test]
    fn write_failure_before_any_byte_is_io() {
        let mut connection = Connection::Connected(Stalling {
            accepted: Vec::new(),
            limit: 0,
        });

        assert!(matches!(connection.write(b"{}"), Err(ClientError::Io(_))));
    }

    #[test]
    fn read_timeout_is_io() {
        let mut connection = Connection::Connected(Stalling {
            accepted: Vec::new(),
            limit: 0,
        });

        assert!(matches!(connection.read_chunk(8), Err(ClientError::Io(_))));
    }

    #[test]
    fn read_chunk_is_bounded() {
        let mut connection = Connection::Connected(Cursor::new(b"0123456789".to_vec()));

        assert_eq!(connection.read_chunk(4).unwrap(), b"0123");
        assert_eq!(connection.read_chunk(100).unwrap(), b"456789");
        assert!(connection.read_chunk(100).unwrap().is_empty());
    }

    #[test]
    fn tcp_requires_endpoint() {
        let err = TcpConnector.open(&ClientConfig::new()).unwrap_err();

        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn tcp_refused_is_connection_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = ClientConfig::new().with_host("127.0.0.1").with_port(port);
        let err = TcpConnector.open(&config).unwrap_err();

        assert!(err.is_connection(), "unexpected error: {err}");
    }

    #[test]
    fn tcp_applies_timeouts() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ClientConfig::new()
            .with_host("127.0.0.1")
            .with_port(port)
            .with_timeout(3);
        let stream = TcpConnector.open(&config).unwrap();

        assert_eq!(stream.read_timeout().unwrap(), config.timeout());
        assert_eq!(stream.write_timeout().unwrap(), config.timeout());
    }
}
