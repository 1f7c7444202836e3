//! Sorted set commands (`ZADD`, `ZRANGE`, `ZSCAN`, ...)
//!
//! Member/score pairs come back flat (`[m1, s1, m2, s2]`) on RESP2 and as
//! nested pairs (`[[m1, s1], [m2, s2]]`) on RESP3; both decode the same way.

use std::sync::Arc;

use crate::codec::Codecs;
use crate::cursor::{Cursor, SortedSetScanCursor};
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{decode_pairs, Role, Slot};
use crate::protocol::{Command, Reply};
use crate::validation;

use super::{ScanArgs, ScoredValue, ZAddArgs};

pub struct SortedSetCommands<K, V, E = Direct> {
    executor: E,
    keys: Slot<K>,
    members: Slot<V>,
}

fn decode_scored<V>(reply: &Reply, members: &Slot<V>) -> Result<Vec<ScoredValue<V>>> {
    let pairs = decode_pairs(reply, |m| members.decode_required(m), |s| s.to_f64())?;
    Ok(pairs
        .into_iter()
        .map(|(value, score)| ScoredValue::new(value, score))
        .collect())
}

impl<K, V, E> SortedSetCommands<K, V, E>
where
    K: Send + 'static,
    V: Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            keys: codecs.slot(Role::Key)?,
            members: codecs.slot(Role::Member)?,
        })
    }

    /// True when the member was added, false when only its score changed
    pub fn zadd(&self, key: &K, score: f64, member: &V) -> RedisFuture<E::Output<bool>> {
        self.executor.run(|| {
            let command = Command::new("ZADD")
                .put(self.keys.encode(key)?)
                .put(score)
                .put(self.members.encode(member)?);
            Ok(Request::new(command, |reply| reply.to_bool()))
        })
    }

    /// Number of members added
    pub fn zadd_many(&self, key: &K, items: &[ScoredValue<V>]) -> RedisFuture<E::Output<i64>> {
        self.zadd_with_args(key, &ZAddArgs::default(), items)
    }

    /// `ZADD` with `NX`/`XX`/`GT`/`LT`/`CH`
    pub fn zadd_with_args(
        &self,
        key: &K,
        args: &ZAddArgs,
        items: &[ScoredValue<V>],
    ) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(items, "items")?;
            let mut command = Command::new("ZADD")
                .put(self.keys.encode(key)?)
                .put(args.to_args()?);
            for item in items {
                command.push(item.score);
                command.push(self.members.encode(&item.value)?);
            }
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    /// New score of the member
    pub fn zincrby(&self, key: &K, increment: f64, member: &V) -> RedisFuture<E::Output<f64>> {
        self.executor.run(|| {
            let command = Command::new("ZINCRBY")
                .put(self.keys.encode(key)?)
                .put(increment)
                .put(self.members.encode(member)?);
            Ok(Request::new(command, |reply| reply.to_f64()))
        })
    }

    pub fn zscore(&self, key: &K, member: &V) -> RedisFuture<E::Output<Option<f64>>> {
        self.executor.run(|| {
            let command = Command::new("ZSCORE")
                .put(self.keys.encode(key)?)
                .put(self.members.encode(member)?);
            Ok(Request::new(command, |reply| reply.to_opt_f64()))
        })
    }

    /// Zero-based rank by ascending score; `None` when the member is absent
    pub fn zrank(&self, key: &K, member: &V) -> RedisFuture<E::Output<Option<i64>>> {
        self.executor.run(|| {
            let command = Command::new("ZRANK")
                .put(self.keys.encode(key)?)
                .put(self.members.encode(member)?);
            Ok(Request::new(command, |reply| reply.to_opt_i64()))
        })
    }

    pub fn zcard(&self, key: &K) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("ZCARD").put(self.keys.encode(key)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    /// Members with a score in `[min, max]`; infinite bounds are allowed
    pub fn zcount(&self, key: &K, min: f64, max: f64) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            let command = Command::new("ZCOUNT")
                .put(self.keys.encode(key)?)
                .put(min)
                .put(max);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }

    pub fn zrange(&self, key: &K, start: i64, stop: i64) -> RedisFuture<E::Output<Vec<V>>> {
        self.executor.run(|| {
            let command = Command::new("ZRANGE")
                .put(self.keys.encode(key)?)
                .put(start)
                .put(stop);
            let members = self.members.clone();
            Ok(Request::new(command, move |reply| members.decode_list(&reply)))
        })
    }

    pub fn zrange_with_scores(
        &self,
        key: &K,
        start: i64,
        stop: i64,
    ) -> RedisFuture<E::Output<Vec<ScoredValue<V>>>> {
        self.executor.run(|| {
            let command = Command::new("ZRANGE")
                .put(self.keys.encode(key)?)
                .put(start)
                .put(stop)
                .put("WITHSCORES");
            let members = self.members.clone();
            Ok(Request::new(command, move |reply| {
                decode_scored(&reply, &members)
            }))
        })
    }

    pub fn zrem(&self, key: &K, members: &[V]) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_empty(members, "members")?;
            let command = Command::new("ZREM")
                .put(self.keys.encode(key)?)
                .put_all(self.members.encode_all(members)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }
}

impl<K, V> SortedSetCommands<K, V, Direct>
where
    K: Send + 'static,
    V: Send + 'static,
{
    pub fn zscan(&self, key: &K) -> Result<SortedSetScanCursor<V>> {
        self.zscan_with_args(key, &ScanArgs::default())
    }

    pub fn zscan_with_args(&self, key: &K, args: &ScanArgs) -> Result<SortedSetScanCursor<V>> {
        let key = self.keys.encode(key)?;
        let args = args.without_type().to_args()?;
        let members = self.members.clone();
        Ok(Cursor::new(
            Arc::clone(self.executor.transport()),
            "ZSCAN",
            Some(key),
            args,
            move |page| decode_scored(&page, &members),
        ))
    }
}
