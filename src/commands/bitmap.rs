//! Bitmap commands

use crate::codec::Codecs;
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::Command;
use crate::validation;

pub struct BitMapCommands<K, E = Direct> {
    executor: E,
    keys: Slot<K>,
}

impl<K, E> BitMapCommands<K, E>
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

    /// Set the bit at `offset`, returning its previous value
    pub fn setbit(&self, key: &K, offset: i64, value: bool) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            validation::positive_or_zero(offset, "offset")?;
            let command = Command::new("SETBIT")
                .put(self.keys.encode(key)?)
                .put(offset)
                .put(value);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn getbit(&self, key: &K, offset: i64) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            validation::positive_or_zero(offset, "offset")?;
            let command = Command::new("GETBIT")
                .put(self.keys.encode(key)?)
                .put(offset);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// Number of set bits, optionally within a byte range
    pub fn bitcount(&self, key: &K, range: Option<(i64, i64)>) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let mut command = Command::new("BITCOUNT").put(self.keys.encode(key)?);
            if let Some((start, end)) = range {
                command.push(start).push(end);
            }
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }
}
