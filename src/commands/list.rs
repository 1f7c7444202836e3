//! List commands (`LPUSH`, `LRANGE`, ...)

use crate::codec::Codecs;
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::Command;
use crate::validation;

pub struct ListCommands<K, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    values: Slot<V>,
}

impl<K, V, E> ListCommands<K, V, E>
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

    /// Length of the list after the push
    pub fn lpush(&self, key: &K, values: &[V]) -> RedisFuture<E::Output<i64>> {
        self.push("LPUSH", key, values)
    }

    pub fn rpush(&self, key: &K, values: &[V]) -> RedisFuture<E::Output<i64>> {
        self.push("RPUSH", key, values)
    }

    fn push(&self, name: &'static str, key: &K, values: &[V]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(values, "values")?;
            let command = Command::new(name)
                .put(self.keys.encode(key)?)
                .put_all(self.values.encode_all(values)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn lpop(&self, key: &K) -> RedisFuture<E::Output<Option<V>>> {
        self.pop("LPOP", key)
    }

    pub fn rpop(&self, key: &K) -> RedisFuture<E::Output<Option<V>>> {
        self.pop("RPOP", key)
    }

    fn pop(&self, name: &'static str, key: &K) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new(name).put(self.keys.encode(key)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }

    /// Elements between `start` and `stop` inclusive; negative indexes count from the end
    pub fn lrange(&self, key: &K, start: i64, stop: i64) -> RedisFuture<E::Output<Vec<V>>> {
        self.executor.run(|| {
            let command = Command::new("LRANGE")
                .put(self.keys.encode(key)?)
                .put(start)
                .put(stop);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode_list(&reply)))
        })
    }

    pub fn llen(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("LLEN").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn lindex(&self, key: &K, index: i64) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new("LINDEX")
                .put(self.keys.encode(key)?)
                .put(index);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }
}
