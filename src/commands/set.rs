//! Set commands (`SADD`, `SMEMBERS`, `SSCAN`, ...)

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use crate::codec::Codecs;
use crate::cursor::{Cursor, SetScanCursor};
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::Command;
use crate::validation;

use super::ScanArgs;

/// Operations on unordered sets of members
pub struct SetCommands<K, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    members: Slot<V>,
}

impl<K, V, E> SetCommands<K, V, E>
where
    K: Send + 'static,
    V: Eq + Hash + Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            keys: codecs.slot(Role::Key)?,
            members: codecs.slot(Role::Member)?,
        })
    }

    /// Number of members actually added
    pub fn sadd(&self, key: &K, members: &[V]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(members, "members")?;
            let command = Command::new("SADD")
                .put(self.keys.encode(key)?)
                .put_all(self.members.encode_all(members)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    /// Number of members actually removed
    pub fn srem(&self, key: &K, members: &[V]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(members, "members")?;
            let command = Command::new("SREM")
                .put(self.keys.encode(key)?)
                .put_all(self.members.encode_all(members)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn smembers(&self, key: &K) -> RedisFuture<E::Output<HashSet<V>>> {
        self.executor.run(|| {
            let command = Command::new("SMEMBERS").put(self.keys.encode(key)?);
            let members = self.members.clone();
            Ok(Request::new(command, move |reply| members.decode_set(&reply)))
        })
    }

    pub fn sismember(&self, key: &K, member: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("SISMEMBER")
                .put(self.keys.encode(key)?)
                .put(self.members.encode(member)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn scard(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("SCARD").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    /// Remove and return a random member; `None` on an empty set
    pub fn spop(&self, key: &K) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new("SPOP").put(self.keys.encode(key)?);
            let members = self.members.clone();
            Ok(Request::new(command, move |reply| members.decode(&reply)))
        })
    }

    /// Up to `count` random members; a negative count allows repeats
    pub fn srandmember(&self, key: &K, count: i64) -> RedisFuture<E::Output<Vec<V>>> {
        self.executor.run(|| {
            let command = Command::new("SRANDMEMBER")
                .put(self.keys.encode(key)?)
                .put(count);
            let members = self.members.clone();
            Ok(Request::new(command, move |reply| members.decode_list(&reply)))
        })
    }

    /// True when the member was moved
    pub fn smove(&self, source: &K, destination: &K, member: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("SMOVE")
                .put(self.keys.encode(source)?)
                .put(self.keys.encode(destination)?)
                .put(self.members.encode(member)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }
}

impl<K, V> SetCommands<K, V, Direct>
where
    K: Send + 'static,
    V: Eq + Hash + Send + 'static,
{
    pub fn sscan(&self, key: &K) -> Result<SetScanCursor<V>> {
        self.sscan_with_args(key, &ScanArgs::default())
    }

    pub fn sscan_with_args(&self, key: &K, args: &ScanArgs) -> Result<SetScanCursor<V>> {
        let key = self.keys.encode(key)?;
        let args = args.without_type().to_args()?;
        let members = self.members.clone();
        Ok(Cursor::new(
            Arc::clone(self.executor.transport()),
            "SSCAN",
            Some(key),
            args,
            move |page| members.decode_set(&page),
        ))
    }
}
