//! Reply definitions
//!
//! The decoded reply tree handed back by the transport.

use bytes::Bytes;

use crate::error::{RedisError, Result};

/// A decoded reply node
///
/// RESP2 transports never produce `Map`; maps arrive as flat arrays and are
/// paired positionally by the marshaller.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Null bulk string / null array / RESP3 null
    Nil,

    /// Integer reply
    Integer(i64),

    /// RESP3 double
    Double(f64),

    /// RESP3 boolean
    Boolean(bool),

    /// Simple status string (e.g. `OK`, `QUEUED`)
    Simple(String),

    /// Bulk (binary-safe) string
    Bulk(Bytes),

    /// Error reply
    Error(String),

    /// Aggregate of nodes
    Array(Vec<Reply>),

    /// RESP3 map, in wire order
    Map(Vec<(Reply, Reply)>),
}

impl Reply {
    /// Build a bulk reply from anything convertible to bytes
    pub fn bulk(value: impl Into<Bytes>) -> Self {
        Reply::Bulk(value.into())
    }

    /// Build a simple `OK` status reply
    pub fn ok() -> Self {
        Reply::Simple("OK".to_string())
    }

    /// Build the acknowledgement a server sends for a command queued in MULTI
    pub fn queued() -> Self {
        Reply::Simple("QUEUED".to_string())
    }

    /// Short name of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Nil => "nil",
            Reply::Integer(_) => "integer",
            Reply::Double(_) => "double",
            Reply::Boolean(_) => "boolean",
            Reply::Simple(_) => "simple string",
            Reply::Bulk(_) => "bulk string",
            Reply::Error(_) => "error",
            Reply::Array(_) => "array",
            Reply::Map(_) => "map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// True for the `QUEUED` acknowledgement
    pub fn is_queued(&self) -> bool {
        matches!(self, Reply::Simple(s) if s == "QUEUED")
    }

    // =========================================================================
    // Scalar conversions
    // =========================================================================

    /// Raw textual/binary content of a scalar node
    ///
    /// Numbers are rendered the way the server would send them as bulk text.
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Reply::Bulk(b) => Ok(b.clone()),
            Reply::Simple(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            Reply::Integer(i) => Ok(Bytes::from(i.to_string())),
            Reply::Double(d) => Ok(Bytes::from(d.to_string())),
            Reply::Boolean(b) => Ok(Bytes::from_static(if *b { b"1" } else { b"0" })),
            other => Err(RedisError::unexpected("a scalar", other.kind())),
        }
    }

    /// UTF-8 string content of a scalar node
    pub fn to_string_value(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RedisError::Decoding(format!("invalid UTF-8 in reply: {}", e)))
    }

    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Reply::Integer(i) => Ok(*i),
            Reply::Boolean(b) => Ok(i64::from(*b)),
            Reply::Bulk(_) | Reply::Simple(_) => {
                let text = self.to_string_value()?;
                text.trim()
                    .parse()
                    .map_err(|_| RedisError::Decoding(format!("`{}` is not an integer", text)))
            }
            other => Err(RedisError::unexpected("an integer", other.kind())),
        }
    }

    pub fn to_u64(&self) -> Result<u64> {
        match self {
            Reply::Integer(i) if *i >= 0 => Ok(*i as u64),
            Reply::Bulk(_) | Reply::Simple(_) => {
                let text = self.to_string_value()?;
                text.trim().parse().map_err(|_| {
                    RedisError::Decoding(format!("`{}` is not an unsigned integer", text))
                })
            }
            other => Err(RedisError::unexpected("an unsigned integer", other.kind())),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Reply::Double(d) => Ok(*d),
            Reply::Integer(i) => Ok(*i as f64),
            Reply::Bulk(_) | Reply::Simple(_) => {
                let text = self.to_string_value()?;
                parse_double(text.trim())
                    .ok_or_else(|| RedisError::Decoding(format!("`{}` is not a number", text)))
            }
            other => Err(RedisError::unexpected("a number", other.kind())),
        }
    }

    /// Integer `1` (or RESP3 `true`) is true, `0` is false
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Reply::Boolean(b) => Ok(*b),
            Reply::Integer(i) => Ok(*i == 1),
            Reply::Bulk(_) | Reply::Simple(_) => match self.to_string_value()?.as_str() {
                "1" | "true" => Ok(true),
                "0" | "false" => Ok(false),
                other => Err(RedisError::Decoding(format!("`{}` is not a boolean", other))),
            },
            other => Err(RedisError::unexpected("a boolean", other.kind())),
        }
    }

    // =========================================================================
    // Optional conversions (nil maps to None)
    // =========================================================================

    pub fn to_opt_i64(&self) -> Result<Option<i64>> {
        if self.is_nil() {
            return Ok(None);
        }
        self.to_i64().map(Some)
    }

    pub fn to_opt_f64(&self) -> Result<Option<f64>> {
        if self.is_nil() {
            return Ok(None);
        }
        self.to_f64().map(Some)
    }

    pub fn to_opt_string(&self) -> Result<Option<String>> {
        if self.is_nil() {
            return Ok(None);
        }
        self.to_string_value().map(Some)
    }

    /// Accept `OK` (or nil, which some servers send for "nothing done")
    pub fn to_unit(&self) -> Result<()> {
        match self {
            Reply::Simple(_) | Reply::Nil => Ok(()),
            other => Err(RedisError::unexpected("a status reply", other.kind())),
        }
    }

    // =========================================================================
    // Aggregate access
    // =========================================================================

    /// Borrow the elements of an array reply. Nil is an empty aggregate.
    pub fn as_array(&self) -> Result<&[Reply]> {
        match self {
            Reply::Array(items) => Ok(items),
            Reply::Nil => Ok(&[]),
            other => Err(RedisError::unexpected("an array", other.kind())),
        }
    }

    /// Take the elements of an array reply. Nil is an empty aggregate.
    pub fn into_array(self) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(items) => Ok(items),
            Reply::Nil => Ok(Vec::new()),
            other => Err(RedisError::unexpected("an array", other.kind())),
        }
    }

    /// Look up a value in a map reply by its textual key
    pub fn map_get(&self, key: &str) -> Option<&Reply> {
        match self {
            Reply::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k.to_bytes(), Ok(b) if b == key.as_bytes()))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Parse a double the way the server formats it, including `inf` forms
pub(crate) fn parse_double(text: &str) -> Option<f64> {
    match text {
        "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Reply::Bulk(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Reply::Bulk(Bytes::from(value))
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Integer(value)
    }
}

impl From<Vec<Reply>> for Reply {
    fn from(value: Vec<Reply>) -> Self {
        Reply::Array(value)
    }
}
