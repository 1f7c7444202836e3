//! Hash commands (`HSET`, `HGETALL`, `HSCAN`, ...)

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::codec::Codecs;
use crate::cursor::{Cursor, HashScanCursor};
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{decode_map, Role, Slot};
use crate::protocol::Command;
use crate::validation;

use super::ScanArgs;

/// Operations on hashes: key → (field → value)
pub struct HashCommands<K, F, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    fields: Slot<F>,
    values: Slot<V>,
}

impl<K, F, V, E> HashCommands<K, F, V, E>
where
    K: Send + 'static,
    F: Eq + Hash + Send + 'static,
    V: Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            keys: codecs.slot(Role::Key)?,
            fields: codecs.slot(Role::Field)?,
            values: codecs.slot(Role::Value)?,
        })
    }

    /// True when the field was created, false when it was updated
    pub fn hset(&self, key: &K, field: &F, value: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("HSET")
                .put(self.keys.encode(key)?)
                .put(self.fields.encode(field)?)
                .put(self.values.encode(value)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// Number of fields created
    pub fn hset_many(&self, key: &K, entries: &[(F, V)]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(entries, "entries")?;
            let mut command = Command::new("HSET").put(self.keys.encode(key)?);
            for (field, value) in entries {
                command.push(self.fields.encode(field)?);
                command.push(self.values.encode(value)?);
            }
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn hget(&self, key: &K, field: &F) -> RedisFuture<E::Output<Option<V>>> {
        self.executor.run(|| {
            let command = Command::new("HGET")
                .put(self.keys.encode(key)?)
                .put(self.fields.encode(field)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode(&reply)))
        })
    }

    /// One entry per requested field, in order; `None` for missing fields
    pub fn hmget(&self, key: &K, fields: &[F]) -> RedisFuture<E::Output<Vec<Option<V>>>> {
        self.executor.run(|| {
            validation::not_empty(fields, "fields")?;
            let command = Command::new("HMGET")
                .put(self.keys.encode(key)?)
                .put_all(self.fields.encode_all(fields)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| {
                values.decode_list_nullable(&reply)
            }))
        })
    }

    /// Every field and value; empty when the key does not exist
    pub fn hgetall(&self, key: &K) -> RedisFuture<E::Output<HashMap<F, V>>> {
        self.executor.run(|| {
            let command = Command::new("HGETALL").put(self.keys.encode(key)?);
            let fields = self.fields.clone();
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| {
                decode_map(&reply, &fields, &values)
            }))
        })
    }

    /// Number of fields removed
    pub fn hdel(&self, key: &K, fields: &[F]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(fields, "fields")?;
            let command = Command::new("HDEL")
                .put(self.keys.encode(key)?)
                .put_all(self.fields.encode_all(fields)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn hexists(&self, key: &K, field: &F) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("HEXISTS")
                .put(self.keys.encode(key)?)
                .put(self.fields.encode(field)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn hincrby(&self, key: &K, field: &F, amount: i64) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("HINCRBY")
                .put(self.keys.encode(key)?)
                .put(self.fields.encode(field)?)
                .put(amount);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn hkeys(&self, key: &K) -> RedisFuture<E::Output<Vec<F>>> {
        self.executor.run(|| {
            let command = Command::new("HKEYS").put(self.keys.encode(key)?);
            let fields = self.fields.clone();
            Ok(Request::new(command, move |reply| fields.decode_list(&reply)))
        })
    }

    pub fn hvals(&self, key: &K) -> RedisFuture<E::Output<Vec<V>>> {
        self.executor.run(|| {
            let command = Command::new("HVALS").put(self.keys.encode(key)?);
            let values = self.values.clone();
            Ok(Request::new(command, move |reply| values.decode_list(&reply)))
        })
    }

    pub fn hlen(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("HLEN").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }
}

impl<K, F, V> HashCommands<K, F, V, Direct>
where
    K: Send + 'static,
    F: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    /// Cursor over the fields of one hash
    pub fn hscan(&self, key: &K) -> Result<HashScanCursor<F, V>> {
        self.hscan_with_args(key, &ScanArgs::default())
    }

    pub fn hscan_with_args(&self, key: &K, args: &ScanArgs) -> Result<HashScanCursor<F, V>> {
        let key = self.keys.encode(key)?;
        let args = args.without_type().to_args()?;
        let fields = self.fields.clone();
        let values = self.values.clone();
        Ok(Cursor::new(
            Arc::clone(self.executor.transport()),
            "HSCAN",
            Some(key),
            args,
            move |page| decode_map(&page, &fields, &values),
        ))
    }
}
