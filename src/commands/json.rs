//! JSON document commands (RedisJSON module)
//!
//! Documents travel as JSON text and are converted with `serde_json`,
//! independently of the codec registry.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::Codecs;
use crate::error::{RedisError, Result};
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::{Command, Reply};
use crate::validation;

/// Root of a document
pub const ROOT_PATH: &str = "$";

pub struct JsonCommands<K, E = Direct> {
    executor: E,
    keys: Slot<K>,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| RedisError::Encoding(format!("JSON encoding failed: {}", e)))
}

fn from_json<T: DeserializeOwned>(reply: &Reply) -> Result<Option<T>> {
    if reply.is_nil() {
        return Ok(None);
    }
    let bytes = reply.to_bytes()?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| RedisError::Decoding(format!("JSON decoding failed: {}", e)))
}

/// Per-match integers; `None` where the match is not of the right JSON type
fn decode_per_match(reply: Reply) -> Result<Vec<Option<i64>>> {
    match reply {
        Reply::Array(items) => items.iter().map(|item| item.to_opt_i64()).collect(),
        scalar => Ok(vec![scalar.to_opt_i64()?]),
    }
}

impl<K, E> JsonCommands<K, E>
where
    K: Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            keys: codecs.slot(Role::Key)?,
        })
    }

    /// `JSON.SET key path value`
    pub fn json_set<T>(&self, key: &K, path: &str, value: &T) -> RedisFuture<E::Output<()>>
    where
        T: Serialize + ?Sized,
    {
        self.executor.run(|| {
            validation::not_blank(path, "path")?;
            let command = Command::new("JSON.SET")
                .put(self.keys.encode(key)?)
                .put(path)
                .put(to_json(value)?);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    /// The whole document; `None` when the key does not exist
    pub fn json_get<T>(&self, key: &K) -> RedisFuture<E::Output<Option<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.executor.run(|| {
            let command = Command::new("JSON.GET").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| from_json(&reply)))
        })
    }

    /// Values matching a JSONPath; `$` paths return an array of matches
    pub fn json_get_path(
        &self,
        key: &K,
        path: &str,
    ) -> RedisFuture<E::Output<Option<serde_json::Value>>> {
        self.executor.run(|| {
            validation::not_blank(path, "path")?;
            let command = Command::new("JSON.GET")
                .put(self.keys.encode(key)?)
                .put(path);
            Ok(Request::new(command, |reply| from_json(&reply)))
        })
    }

    /// Number of paths deleted
    pub fn json_del(&self, key: &K, path: &str) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_blank(path, "path")?;
            let command = Command::new("JSON.DEL")
                .put(self.keys.encode(key)?)
                .put(path);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    /// New array lengths, one per match
    pub fn json_arr_append<T>(
        &self,
        key: &K,
        path: &str,
        values: &[T],
    ) -> RedisFuture<E::Output<Vec<Option<i64>>>>
    where
        T: Serialize,
    {
        self.executor.run(|| {
            validation::not_blank(path, "path")?;
            validation::not_empty(values, "values")?;
            let mut command = Command::new("JSON.ARRAPPEND")
                .put(self.keys.encode(key)?)
                .put(path);
            for value in values {
                command.push(to_json(value)?);
            }
            Ok(Request::new(command, decode_per_match))
        })
    }

    pub fn json_arr_len(&self, key: &K, path: &str) -> RedisFuture<E::Output<Vec<Option<i64>>>> {
        self.executor.run(|| {
            validation::not_blank(path, "path")?;
            let command = Command::new("JSON.ARRLEN")
                .put(self.keys.encode(key)?)
                .put(path);
            Ok(Request::new(command, decode_per_match))
        })
    }
}
