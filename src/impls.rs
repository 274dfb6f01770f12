use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number};

use super::*;

static NULL: JsonValue = JsonValue::Null;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Error as fmt::Debug>::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(n) => fmt::Display::fmt(n, f),
            Key::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Key {
    fn from(n: u64) -> Self {
        Self::Index(n)
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Self::Index(n as u64)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Name(s.to_owned())
    }
}

impl Value {
    /// Composite keyed `0..n`, encoded as an array.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values.into_iter().map(Into::into).collect()
    }

    /// Composite with the given keys, in the given order.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Value::Composite(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a value from anything serde can represent as JSON.
    ///
    /// Struct fields and map entries keep their serialization order when the
    /// `std` feature is on; without it object keys come out sorted.
    pub fn from_serialize<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value).map(Self::from)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_composite(&self) -> Option<&[(Key, Value)]> {
        match self {
            Value::Composite(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn get<K>(&self, key: K) -> Option<&Value>
    where
        K: Into<Key>,
    {
        let key = key.into();

        self.as_composite()?
            .iter()
            .find_map(|(k, v)| (k == &key).then_some(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Composite(Vec::new())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n.into())
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        f64::from(f).into()
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(a: [T; N]) -> Self {
        Value::list(a)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(a) => Value::list(a),
            JsonValue::Object(m) => Value::map(m),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        value.clone().into()
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(n) => JsonValue::Number(n),
            Value::String(s) => JsonValue::String(s),
            Value::Composite(entries) if encode::is_array_like(&entries) => {
                JsonValue::Array(entries.into_iter().map(|(_, v)| v.into()).collect())
            }
            Value::Composite(entries) => JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.clone().into()
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Value::Composite(
            iter.into_iter()
                .enumerate()
                .map(|(i, v)| (Key::from(i), v))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Value::map(iter)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        JsonValue::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Self::from)
    }
}

impl Request {
    pub fn new<M, P>(method: M, params: P) -> Self
    where
        M: Into<String>,
        P: Into<Value>,
    {
        Self {
            method: method.into(),
            params: params.into(),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_request(self))
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RpcError {}

impl RpcError {
    /// Error for a well-known code, with its standard message.
    pub fn from_code(code: i64, data: JsonValue) -> Self {
        let message = error_message(code).unwrap_or("Error").to_string();

        Self {
            code,
            message,
            data,
        }
    }
}

impl From<RpcError> for JsonValue {
    fn from(re: RpcError) -> Self {
        json!({
            "code": re.code,
            "message": re.message,
            "data": re.data,
        })
    }
}

impl TryFrom<&JsonValue> for RpcError {
    type Error = Error;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        let map = value.as_object().ok_or(Error::UnexpectedErrorVariant)?;

        let code = map
            .get("code")
            .ok_or(Error::ExpectedErrorCode)?
            .as_i64()
            .ok_or(Error::ExpectedErrorCodeAsInteger)?;

        let message = map
            .get("message")
            .ok_or(Error::ExpectedErrorMessage)?
            .as_str()
            .ok_or(Error::ExpectedErrorMessageAsString)?
            .to_string();

        let data = map.get("data").unwrap_or(&JsonValue::Null).clone();

        Ok(Self {
            code,
            message,
            data,
        })
    }
}

impl Serialize for RpcError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        JsonValue::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RpcError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer)
            .and_then(|v| Self::try_from(&v).map_err(D::Error::custom))
    }
}

impl Reply {
    /// Remote error field. `null` for successful answers and for the sentinels.
    pub fn error(&self) -> &JsonValue {
        match self {
            Reply::Answer { error, .. } => error,
            Reply::Null | Reply::Empty => &NULL,
        }
    }

    /// Remote result field, `None` for the "no result" sentinels.
    pub fn result(&self) -> Option<&JsonValue> {
        match self {
            Reply::Answer { result, .. } => Some(result),
            Reply::Null | Reply::Empty => None,
        }
    }

    pub fn is_no_result(&self) -> bool {
        matches!(self, Reply::Null | Reply::Empty)
    }

    /// Splits the reply into the remote result or the remote error.
    ///
    /// An error that is not a `{code, message[, data]}` object becomes
    /// [`UNKNOWN_ERROR`] with the raw error as its data.
    pub fn into_result(self) -> Result<Option<JsonValue>, RpcError> {
        match self {
            Reply::Answer { error, .. } if !error.is_null() => {
                Err(RpcError::try_from(&error).unwrap_or_else(|_| RpcError {
                    code: UNKNOWN_ERROR,
                    message: "Error".to_string(),
                    data: error,
                }))
            }
            Reply::Answer { result, .. } => Ok(Some(result)),
            Reply::Null | Reply::Empty => Ok(None),
        }
    }
}

impl From<Reply> for JsonValue {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Answer { error, result } => {
                let mut map = Map::new();
                map.insert("error".to_string(), error);
                map.insert("result".to_string(), result);
                JsonValue::Object(map)
            }
            Reply::Null | Reply::Empty => JsonValue::Null,
        }
    }
}

impl TryFrom<JsonValue> for Reply {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let mut map = match value {
            JsonValue::Null => return Ok(Reply::Null),
            JsonValue::Object(map) => map,
            _ => return Err(Error::UnexpectedReplyVariant),
        };

        let error = map.remove("error").ok_or(Error::ExpectedError)?;
        let result = map.remove("result").ok_or(Error::ExpectedResult)?;

        Ok(Reply::Answer { error, result })
    }
}

impl TryFrom<&JsonValue> for Reply {
    type Error = Error;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        Self::try_from(value.clone())
    }
}
