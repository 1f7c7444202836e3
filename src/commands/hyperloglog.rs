//! HyperLogLog commands

use crate::codec::Codecs;
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::Command;
use crate::validation;

pub struct HyperLogLogCommands<K, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    values: Slot<V>,
}

impl<K, V, E> HyperLogLogCommands<K, V, E>
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

    /// True when the estimated cardinality changed
    pub fn pfadd(&self, key: &K, values: &[V]) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            validation::not_empty(values, "values")?;
            let command = Command::new("PFADD")
                .put(self.keys.encode(key)?)
                .put_all(self.values.encode_all(values)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// Approximate cardinality of the union of `keys`
    pub fn pfcount(&self, keys: &[K]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(keys, "keys")?;
            let command = Command::new("PFCOUNT").put_all(self.keys.encode_all(keys)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn pfmerge(&self, destination: &K, sources: &[K]) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            validation::not_empty(sources, "sources")?;
            let command = Command::new("PFMERGE")
                .put(self.keys.encode(destination)?)
                .put_all(self.keys.encode_all(sources)?);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }
}
