//! Bloom filter commands (RedisBloom module)

use crate::codec::Codecs;
use crate::error::{RedisError, Result};
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::{Args, Command, Reply};
use crate::validation;

pub struct BloomCommands<K, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    values: Slot<V>,
}

impl<K, V, E> BloomCommands<K, V, E>
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

    /// True when the item was newly added
    pub fn bf_add(&self, key: &K, value: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("BF.ADD")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// One flag per item, in order
    pub fn bf_madd(&self, key: &K, values: &[V]) -> RedisFuture<E::Output<Vec<bool>>> {
        self.executor.run(|| {
            validation::not_empty(values, "values")?;
            let command = Command::new("BF.MADD")
                .put(self.keys.encode(key)?)
                .put_all(self.values.encode_all(values)?);
            Ok(Request::new(command, decode_flags))
        })
    }

    /// False means definitely absent; true means probably present
    pub fn bf_exists(&self, key: &K, value: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("BF.EXISTS")
                .put(self.keys.encode(key)?)
                .put(self.values.encode(value)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn bf_mexists(&self, key: &K, values: &[V]) -> RedisFuture<E::Output<Vec<bool>>> {
        self.executor.run(|| {
            validation::not_empty(values, "values")?;
            let command = Command::new("BF.MEXISTS")
                .put(self.keys.encode(key)?)
                .put_all(self.values.encode_all(values)?);
            Ok(Request::new(command, decode_flags))
        })
    }

    /// Create an empty filter; `args` carries `EXPANSION`/`NONSCALING` when needed
    pub fn bf_reserve(
        &self,
        key: &K,
        error_rate: f64,
        capacity: i64,
        args: &Args,
    ) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            if !(error_rate > 0.0 && error_rate < 1.0) {
                return Err(RedisError::InvalidArgument {
                    name: "error_rate",
                    reason: "must be between 0 and 1 exclusive",
                });
            }
            validation::positive(capacity, "capacity")?;
            let command = Command::new("BF.RESERVE")
                .put(self.keys.encode(key)?)
                .put(error_rate)
                .put(capacity)
                .put(args);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }
}

fn decode_flags(reply: Reply) -> Result<Vec<bool>> {
    reply.as_array()?.iter().map(|flag| flag.to_bool()).collect()
}
