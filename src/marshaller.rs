//! Marshaller
//!
//! Type-directed encoding of domain values into wire arguments, and decoding
//! of reply nodes back into typed values and collections.
//!
//! Each command group holds one [`Slot`] per logical role (key, field,
//! member, value). A slot carries the codec resolved for its type when the
//! group was built and stays fixed for the group's lifetime.
//!
//! ## Map-shaped replies
//! A `Reply::Map` is authoritative. Without the map tag (RESP2), a flat array
//! is paired positionally: `[k1, v1, k2, v2, ...]`. An array made only of
//! two-element arrays is read as a list of pairs (RESP3 form of several
//! commands). Anything else, including a flat array of odd length, is a
//! decoding error.

use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use bytes::Bytes;

use crate::codec::Codec;
use crate::error::{RedisError, Result};
use crate::protocol::Reply;

/// Logical role of a slot, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Key,
    Field,
    Member,
    Value,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Key => "key",
            Role::Field => "field",
            Role::Member => "member",
            Role::Value => "value",
        };
        f.write_str(name)
    }
}

/// A typed slot: role + resolved codec
pub struct Slot<T> {
    role: Role,
    codec: Arc<dyn Codec<T>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            role: self.role,
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("role", &self.role)
            .field("type", &type_name::<T>())
            .finish()
    }
}

impl<T> Slot<T> {
    pub fn new(role: Role, codec: Arc<dyn Codec<T>>) -> Self {
        Self { role, codec }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    pub fn encode(&self, value: &T) -> Result<Bytes> {
        self.codec.encode(value).map_err(|e| match e {
            RedisError::Encoding(msg) => RedisError::Encoding(format!("{} ({})", msg, self.role)),
            other => other,
        })
    }

    /// Encode an optional value; `None` stays `None` (argument omitted or null marker)
    pub fn encode_nullable(&self, value: Option<&T>) -> Result<Option<Bytes>> {
        value.map(|v| self.encode(v)).transpose()
    }

    pub fn encode_all(&self, values: &[T]) -> Result<Vec<Bytes>> {
        values.iter().map(|v| self.encode(v)).collect()
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Decode a scalar node; nil decodes to `None`
    pub fn decode(&self, reply: &Reply) -> Result<Option<T>> {
        match reply {
            Reply::Nil => Ok(None),
            Reply::Array(_) | Reply::Map(_) => Err(RedisError::Decoding(format!(
                "expected a scalar {}, got {}",
                self.role,
                reply.kind()
            ))),
            Reply::Error(msg) => Err(RedisError::Server(msg.clone())),
            scalar => {
                let bytes = scalar.to_bytes()?;
                self.codec.decode(&bytes).map(Some)
            }
        }
    }

    /// Decode a scalar node that must be present
    pub fn decode_required(&self, reply: &Reply) -> Result<T> {
        self.decode(reply)?
            .ok_or_else(|| RedisError::Decoding(format!("unexpected nil {}", self.role)))
    }

    /// Decode every element of an aggregate; nil elements are an error
    pub fn decode_list(&self, reply: &Reply) -> Result<Vec<T>> {
        reply
            .as_array()?
            .iter()
            .map(|item| self.decode_required(item))
            .collect()
    }

    /// Decode every element of an aggregate, keeping nil elements as `None`
    pub fn decode_list_nullable(&self, reply: &Reply) -> Result<Vec<Option<T>>> {
        reply.as_array()?.iter().map(|item| self.decode(item)).collect()
    }

    pub fn decode_set(&self, reply: &Reply) -> Result<HashSet<T>>
    where
        T: Eq + Hash,
    {
        reply
            .as_array()?
            .iter()
            .map(|item| self.decode_required(item))
            .collect()
    }
}

// =============================================================================
// Map-shaped decoding
// =============================================================================

/// Split a map-shaped reply into (key, value) node pairs
pub fn pairs(reply: &Reply) -> Result<Vec<(&Reply, &Reply)>> {
    match reply {
        Reply::Nil => Ok(Vec::new()),
        Reply::Map(entries) => Ok(entries.iter().map(|(k, v)| (k, v)).collect()),
        Reply::Array(items) => {
            let nested = !items.is_empty()
                && items
                    .iter()
                    .all(|item| matches!(item, Reply::Array(pair) if pair.len() == 2));
            if nested {
                return Ok(items
                    .iter()
                    .filter_map(|item| match item {
                        Reply::Array(pair) => Some((&pair[0], &pair[1])),
                        _ => None,
                    })
                    .collect());
            }
            if items.len() % 2 != 0 {
                return Err(RedisError::Decoding(format!(
                    "cannot pair a flat array of odd length {} into a map",
                    items.len()
                )));
            }
            Ok(items.chunks_exact(2).map(|c| (&c[0], &c[1])).collect())
        }
        other => Err(RedisError::unexpected("a map or array", other.kind())),
    }
}

/// Decode a map-shaped reply with the given key and value slots
pub fn decode_map<K, V>(reply: &Reply, keys: &Slot<K>, values: &Slot<V>) -> Result<HashMap<K, V>>
where
    K: Eq + Hash,
{
    pairs(reply)?
        .into_iter()
        .map(|(k, v)| Ok((keys.decode_required(k)?, values.decode_required(v)?)))
        .collect()
}

/// Decode a map-shaped reply into an ordered list of pairs
pub fn decode_pairs<A, B>(
    reply: &Reply,
    mut first: impl FnMut(&Reply) -> Result<A>,
    mut second: impl FnMut(&Reply) -> Result<B>,
) -> Result<Vec<(A, B)>> {
    pairs(reply)?
        .into_iter()
        .map(|(a, b)| Ok((first(a)?, second(b)?)))
        .collect()
}

/// Decode a list of plain strings (index names, column names, ...)
pub fn decode_strings(reply: &Reply) -> Result<Vec<String>> {
    reply
        .as_array()?
        .iter()
        .map(|item| item.to_string_value())
        .collect()
}
