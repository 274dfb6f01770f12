#![cfg_attr(not(feature = "std"), no_std)]

//! Minimal blocking JSON-RPC client.
//!
//! A call writes one `{"method": ..., "params": ..., "id": 0}` object to a TCP
//! socket and reads back a `{"error": ..., "result": ...}` object. The reply has
//! no length prefix; it is considered complete once its braces balance.
//!
//! The value encoder, the stream framer and the protocol types work without
//! `std`. The socket half lives behind the `client` feature.

extern crate alloc;

pub mod encode;
pub mod framing;
mod impls;

#[cfg(feature = "client")]
mod client;
#[cfg(feature = "client")]
mod config;
#[cfg(feature = "client")]
mod connection;
#[cfg(feature = "client")]
mod error;

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

#[cfg(feature = "client")]
pub use client::{Client, CHUNK_SIZE};
#[cfg(feature = "client")]
pub use config::ClientConfig;
#[cfg(feature = "client")]
pub use connection::{Connection, Connector, State, TcpConnector};
#[cfg(feature = "client")]
pub use error::ClientError;

pub use encode::{encode, encode_request};
pub use framing::{is_balanced, Framer};
pub use serde_json::{json, Number, Value as JsonValue};

/// The id carried by every request. Replies are never correlated by id.
pub const REQUEST_ID: i64 = 0;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_METHOD_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

pub const PROCEDURE_EXCEPTION: i64 = -32000;
pub const AUTHENTIFICATION_ERROR: i64 = -32001;
pub const PERMISSION_DENIED: i64 = -32002;
pub const INVALID_PARAM_VALUES: i64 = -32003;

/// Code used for remote errors that are not `{code, message[, data]}` objects.
pub const UNKNOWN_ERROR: i64 = -1;

/// Human readable message for the well-known error codes.
pub fn error_message(code: i64) -> Option<&'static str> {
    let message = match code {
        PARSE_ERROR => "Parse error.",
        INVALID_REQUEST => "Invalid Request.",
        METHOD_NOT_FOUND => "Method not found.",
        INVALID_METHOD_PARAMS => "Invalid parameters.",
        INTERNAL_ERROR => "Internal error.",
        PROCEDURE_EXCEPTION => "Procedure exception.",
        AUTHENTIFICATION_ERROR => "Authentification error.",
        PERMISSION_DENIED => "Permission denied.",
        INVALID_PARAM_VALUES => "Invalid parameter values.",
        _ => return None,
    };

    Some(message)
}

/// Reply shape violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    UnexpectedReplyVariant,
    ExpectedError,
    ExpectedResult,
    UnexpectedErrorVariant,
    ExpectedErrorCode,
    ExpectedErrorCodeAsInteger,
    ExpectedErrorMessage,
    ExpectedErrorMessageAsString,
}

/// Key of a composite entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(u64),
    Name(String),
}

/// Encoder input.
///
/// A composite is an ordered list of keyed entries. Whether it goes on the wire
/// as an array or an object depends only on its keys: `0..n` in order makes an
/// array, anything else an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Composite(Vec<(Key, Value)>),
}

/// One outgoing call. Discarded once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub params: Value,
}

/// Remote error object, `{code, message, data}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: JsonValue,
}

/// Decoded reply.
///
/// `Empty` and `Null` are the "no result" sentinels: the peer closed the stream
/// without sending anything, or it sent a bare JSON `null`. Neither is the same
/// as an `Answer` whose `result` is `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer { error: JsonValue, result: JsonValue },
    Null,
    Empty,
}
