use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::connection::{Connection, Connector, State, TcpConnector};
use crate::error::{ClientError, Result};
use crate::{Framer, JsonValue, Reply, Request, Value};

/// Bytes requested per read while waiting for a reply.
pub const CHUNK_SIZE: usize = 1024;

const WIRE: &str = "jsonrpc_client::wire";

/// Blocking JSON-RPC client.
///
/// One request is in flight at a time: `call` writes the request and reads the
/// whole reply before returning, and takes `&mut self` so calls on one client
/// cannot interleave. The socket is closed on [`Client::disconnect`], after
/// any failed call, after every call in reconnect mode, and on drop.
#[derive(Debug)]
pub struct Client<C = TcpConnector>
where
    C: Connector,
{
    config: ClientConfig,
    connector: C,
    connection: Connection<C::Stream>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C> Client<C>
where
    C: Connector,
{
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            connection: Connection::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Host and port changes apply from the next connect.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn state(&self) -> State {
        self.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Opens the socket unless one is already open.
    pub fn connect(&mut self) -> Result<()> {
        self.connection.connect(&self.connector, &self.config)
    }

    /// Closes the socket if one is open.
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// Calls the remote procedure `prefix + name` with `params`.
    ///
    /// The remote `error` field is returned as data inside the [`Reply`]; only
    /// local failures are errors here. Nothing is retried.
    pub fn call<P>(&mut self, name: &str, params: P) -> Result<Reply>
    where
        P: Into<Value>,
    {
        if self.config.reconnect {
            self.connect()?;
        }

        if !self.is_connected() {
            return Err(ClientError::Connection(
                "client is not yet connected, call connect() first".to_string(),
            ));
        }

        let request = Request::new(self.config.method_name(name), params);

        debug!("calling {}", request.method);

        let outcome = self.send(&request).and_then(|_| self.receive());

        match &outcome {
            Ok(reply) => trace!("{} returned {:?}", request.method, reply),
            Err(e) => debug!("{} failed: {}", request.method, e),
        }

        if outcome.is_err() || self.config.reconnect {
            self.disconnect();
        }

        outcome
    }

    fn send(&mut self, request: &Request) -> Result<()> {
        let text = request.to_string();
        let expected = text.len();

        if self.config.debug {
            debug!(target: WIRE, "request -> [{}]", text);
        }

        let written = self.connection.write(text.as_bytes())?;

        if self.config.debug {
            debug!(target: WIRE, "request ({}={}) written", expected, written);
        }

        if written != expected {
            return Err(ClientError::PartialWrite {
                written,
                expected,
                source: None,
            });
        }

        Ok(())
    }

    fn receive(&mut self) -> Result<Reply> {
        let mut reply = Vec::new();
        let mut framer = Framer::new();

        loop {
            let chunk = self.connection.read_chunk(CHUNK_SIZE)?;

            if self.config.debug {
                debug!(
                    target: WIRE,
                    "received ({}) -> [{}]",
                    chunk.len(),
                    String::from_utf8_lossy(&chunk)
                );
            }

            if chunk.is_empty() {
                break;
            }

            framer.feed(&chunk);
            reply.extend_from_slice(&chunk);

            if framer.is_complete() {
                break;
            }
        }

        decode_reply(&reply)
    }
}

impl<C> Drop for Client<C>
where
    C: Connector,
{
    fn drop(&mut self) {
        self.connection.disconnect();
    }
}

/// Decodes the accumulated reply bytes.
///
/// Nothing but whitespace gives [`Reply::Empty`], a bare `null` gives
/// [`Reply::Null`]; both are results, not failures.
pub(crate) fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Reply::Empty);
    }

    let value: JsonValue = serde_json::from_slice(bytes)?;

    Ok(Reply::try_from(value)?)
}
