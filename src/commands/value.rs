//! String commands (`GET`, `SET`, `INCR`, ...)

use crate::codec::Codecs;
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::Command;
use crate::validation;

use super::SetArgs;

/// Operations on plain string values
pub struct ValueCommands<K, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    values: Slot<V>,
}

impl<K, V, E> ValueCommands<K, V, E>
where
    K: Send + 'static,
    V: Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            keys: codecs.slot(Role::Key)?,
            values: codecs.slot(Role::Value)?,
        })
    }

    /// `GET key`; `None` when the key does not exist
    pub fn get(&self, key: &K) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new("GET").put(self.keys.encode(key)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }

    pub fn set(&self, key: &K, value: &V) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            let command = Command::new("SET")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    /// `SET` with options; false when `NX`/`XX` prevented the write
    pub fn set_with_args(&self, key: &K, value: &V, args: &SetArgs) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let args = SetArgs {
                get: false,
                ..args.clone()
            };
            let command = Command::new("SET")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?)
                .put(args.to_args()?);
            Ok(Request::new(command, |reply| Ok(!reply.is_nil())))
        })
    }

    /// `SET ... GET`: write and return the previous value
    pub fn set_get(&self, key: &K, value: &V, args: &SetArgs) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let args = SetArgs {
                get: true,
                ..args.clone()
            };
            let command = Command::new("SET")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?)
                .put(args.to_args()?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }

    pub fn setnx(&self, key: &K, value: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("SETNX")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn getdel(&self, key: &K) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new("GETDEL").put(self.keys.encode(key)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }

    pub fn getset(&self, key: &K, value: &V) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new("GETSET")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }

    /// `MGET`; one entry per key, in key order, `None` for missing keys
    pub fn mget(&self, keys: &[K]) -> RedisFuture<E::Output<Vec<Option<V>>>> {
        self.executor.run(|| {
            validation::not_empty(keys, "keys")?;
            let command = Command::new("MGET").put_all(self.keys.encode_all(keys)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| {
                values.decode_list_nullable(&reply)
            }))
        })
    }

    pub fn mset(&self, entries: &[(K, V)]) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            validation::not_empty(entries, "entries")?;
            let mut command = Command::new("MSET");
            for (key, value) in entries {
                command.push(self.keys.encode(key)?);
                command.push(self.values.encode(value)?);
            }
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    pub fn incr(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("INCR").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn incrby(&self, key: &K, amount: i64) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("INCRBY")
                .put(self.keys.encode(key)?)
                .put(amount);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn incrbyfloat(&self, key: &K, amount: f64) -> RedisFuture<E::Output<f64>> {
        self.executor.run(|| {
            let command = Command::new("INCRBYFLOAT")
                .put(self.keys.encode(key)?)
                .put(amount);
            Ok(Request::new(command, |reply| reply.to_f64()))
        })
    }

    pub fn decr(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("DECR").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn decrby(&self, key: &K, amount: i64) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("DECRBY")
                .put(self.keys.encode(key)?)
                .put(amount);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    /// Returns the length of the string after the append
    pub fn append(&self, key: &K, value: &V) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("APPEND")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn strlen(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("STRLEN").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }
}
