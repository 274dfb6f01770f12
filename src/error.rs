use std::io;

use thiserror::Error;

/// Local failures of a call. A remote `error` field is not one of these; it is
/// handed back inside [`crate::Reply`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Host or port missing when connecting.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Socket setup or handshake failed, or the client is not connected.
    #[error("connection error: {0}")]
    Connection(String),

    /// Applying the read/write timeouts failed.
    #[error("socket option error: {0}")]
    Option(#[source] io::Error),

    /// Read or write failed at the OS level, including timeouts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The request was only partially written; the peer may have seen part of it.
    /// `source` is the OS error that stopped the write, if there was one.
    #[error("request only partially written ({written} of {expected} bytes)")]
    PartialWrite {
        written: usize,
        expected: usize,
        #[source]
        source: Option<io::Error>,
    },

    /// The reply was not valid JSON.
    #[error("invalid JSON reply: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The reply was valid JSON without the `{error, result}` shape.
    #[error("unexpected reply shape: {0}")]
    ReplyShape(#[from] crate::Error),
}

impl ClientError {
    /// True for both flavours of undecodable reply.
    pub fn is_encoding(&self) -> bool {
        matches!(self, ClientError::Encoding(_) | ClientError::ReplyShape(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
