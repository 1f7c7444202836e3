//! Generic key commands (`DEL`, `EXPIRE`, `TYPE`, `SCAN`, ...)

use std::hash::Hash;
use std::sync::Arc;

use crate::codec::Codecs;
use crate::cursor::{Cursor, KeyScanCursor};
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::{Args, Command};
use crate::validation;

use super::{RedisValueType, ScanArgs};

/// Operations on keys, whatever their value type
pub struct KeyCommands<K, E = Direct> {
    executor: E,
    keys: Slot<K>,
}

impl<K, E> KeyCommands<K, E>
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

    /// Number of keys removed
    pub fn del(&self, keys: &[K]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(keys, "keys")?;
            let command = Command::new("DEL").put_all(self.keys.encode_all(keys)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn exists(&self, key: &K) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("EXISTS").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// True when the timeout was set
    pub fn expire(&self, key: &K, seconds: i64) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("EXPIRE")
                .put(self.keys.encode(key)?)
                .put(seconds);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn pexpire(&self, key: &K, millis: i64) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("PEXPIRE")
                .put(self.keys.encode(key)?)
                .put(millis);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// Remaining time to live in seconds; `-1` without expiry, `-2` when missing
    pub fn ttl(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("TTL").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn persist(&self, key: &K) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("PERSIST").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    pub fn rename(&self, key: &K, new_key: &K) -> RedisFuture<E::Output<()>> {
        self.executor.run(|| {
            let command = Command::new("RENAME")
                .put(self.keys.encode(key)?)
                .put(self.keys.encode(new_key)?);
            Ok(Request::new(command, |reply| reply.to_unit()))
        })
    }

    pub fn key_type(&self, key: &K) -> RedisFuture<E::Output<RedisValueType>> {
        self.executor.run(|| {
            let command = Command::new("TYPE").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| RedisValueType::decode(&reply)))
        })
    }

    /// Keys matching a glob-style pattern
    pub fn keys(&self, pattern: &str) -> RedisFuture<E::Output<Vec<K>>> {
        self.executor.run(|| {
            validation::not_blank(pattern, "pattern")?;
            let command = Command::new("KEYS").put(pattern);
            let keys = self.keys.clone();
            Ok(Request::new(command, move |reply| keys.decode_list(&reply)))
        })
    }

    pub fn touch(&self, keys: &[K]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(keys, "keys")?;
            let command = Command::new("TOUCH").put_all(self.keys.encode_all(keys)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn unlink(&self, keys: &[K]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(keys, "keys")?;
            let command = Command::new("UNLINK").put_all(self.keys.encode_all(keys)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }
}

impl<K> KeyCommands<K, Direct>
where
    K: Eq + Hash + Send + 'static,
{
    /// Cursor over every key
    pub fn scan(&self) -> KeyScanCursor<K> {
        self.scan_cursor(Args::new())
    }

    pub fn scan_with_args(&self, args: &ScanArgs) -> Result<KeyScanCursor<K>> {
        Ok(self.scan_cursor(args.to_args()?))
    }

    fn scan_cursor(&self, args: Args) -> KeyScanCursor<K> {
        let keys = self.keys.clone();
        Cursor::new(
            Arc::clone(self.executor.transport()),
            "SCAN",
            None,
            args,
            move |page| keys.decode_set(&page),
        )
    }
}
