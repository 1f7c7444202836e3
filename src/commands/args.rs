//! Option objects and small result types shared by command groups
//!
//! Each option struct replaces a family of overloads: unset fields are
//! simply omitted from the command.

use std::fmt;
use std::str::FromStr;

use crate::error::{RedisError, Result};
use crate::protocol::{Args, Reply};

// =============================================================================
// SET options
// =============================================================================

/// Options for `SET`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetArgs {
    pub ex: Option<u64>,
    pub px: Option<u64>,
    pub exat: Option<u64>,
    pub pxat: Option<u64>,
    pub keep_ttl: bool,
    pub nx: bool,
    pub xx: bool,
    pub get: bool,
}

impl SetArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire after `seconds`
    pub fn ex(mut self, seconds: u64) -> Self {
        self.ex = Some(seconds);
        self
    }

    /// Expire after `millis`
    pub fn px(mut self, millis: u64) -> Self {
        self.px = Some(millis);
        self
    }

    /// Expire at a unix timestamp in seconds
    pub fn exat(mut self, timestamp: u64) -> Self {
        self.exat = Some(timestamp);
        self
    }

    /// Expire at a unix timestamp in milliseconds
    pub fn pxat(mut self, timestamp: u64) -> Self {
        self.pxat = Some(timestamp);
        self
    }

    pub fn keep_ttl(mut self) -> Self {
        self.keep_ttl = true;
        self
    }

    /// Only set if the key does not exist
    pub fn nx(mut self) -> Self {
        self.nx = true;
        self
    }

    /// Only set if the key already exists
    pub fn xx(mut self) -> Self {
        self.xx = true;
        self
    }

    /// Return the old value
    pub fn get(mut self) -> Self {
        self.get = true;
        self
    }

    /// Build the argument list, rejecting conflicting options
    pub fn to_args(&self) -> Result<Args> {
        let expirations = [
            self.ex.is_some(),
            self.px.is_some(),
            self.exat.is_some(),
            self.pxat.is_some(),
            self.keep_ttl,
        ];
        if expirations.iter().filter(|set| **set).count() > 1 {
            return Err(RedisError::InvalidArgument {
                name: "args",
                reason: "EX, PX, EXAT, PXAT and KEEPTTL are mutually exclusive",
            });
        }
        if self.nx && self.xx {
            return Err(RedisError::InvalidArgument {
                name: "args",
                reason: "NX and XX are mutually exclusive",
            });
        }

        let mut args = Args::new();
        if let Some(seconds) = self.ex {
            args = args.arg("EX").arg(seconds);
        }
        if let Some(millis) = self.px {
            args = args.arg("PX").arg(millis);
        }
        if let Some(timestamp) = self.exat {
            args = args.arg("EXAT").arg(timestamp);
        }
        if let Some(timestamp) = self.pxat {
            args = args.arg("PXAT").arg(timestamp);
        }
        Ok(args
            .flag("KEEPTTL", self.keep_ttl)
            .flag("NX", self.nx)
            .flag("XX", self.xx)
            .flag("GET", self.get))
    }
}

// =============================================================================
// SCAN options
// =============================================================================

/// Options for the scan family (`SCAN`, `HSCAN`, `SSCAN`, `ZSCAN`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    pub pattern: Option<String>,
    pub count: Option<u64>,
    /// Only sent by `SCAN`; ignored by the per-key scans
    pub value_type: Option<RedisValueType>,
}

impl ScanArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// `MATCH pattern`
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// `COUNT n` (a hint for the page size)
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// `TYPE t`
    pub fn value_type(mut self, value_type: RedisValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Same options without `TYPE`, for the per-key scans
    pub(crate) fn without_type(&self) -> Self {
        Self {
            value_type: None,
            ..self.clone()
        }
    }

    pub fn to_args(&self) -> Result<Args> {
        let mut args = Args::new();
        if let Some(pattern) = &self.pattern {
            crate::validation::not_blank(pattern, "pattern")?;
            args = args.arg("MATCH").arg(pattern);
        }
        if let Some(count) = self.count {
            if count == 0 {
                return Err(RedisError::InvalidArgument {
                    name: "count",
                    reason: "must be strictly positive",
                });
            }
            args = args.arg("COUNT").arg(count);
        }
        if let Some(value_type) = self.value_type {
            args = args.arg("TYPE").arg(value_type.as_str());
        }
        Ok(args)
    }
}

// =============================================================================
// ZADD options
// =============================================================================

/// Options for `ZADD`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZAddArgs {
    pub nx: bool,
    pub xx: bool,
    pub gt: bool,
    pub lt: bool,
    /// Return the number of changed elements instead of added ones
    pub ch: bool,
}

impl ZAddArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nx(mut self) -> Self {
        self.nx = true;
        self
    }

    pub fn xx(mut self) -> Self {
        self.xx = true;
        self
    }

    pub fn gt(mut self) -> Self {
        self.gt = true;
        self
    }

    pub fn lt(mut self) -> Self {
        self.lt = true;
        self
    }

    pub fn ch(mut self) -> Self {
        self.ch = true;
        self
    }

    pub fn to_args(&self) -> Result<Args> {
        if self.nx && self.xx {
            return Err(RedisError::InvalidArgument {
                name: "args",
                reason: "NX and XX are mutually exclusive",
            });
        }
        if self.gt && self.lt {
            return Err(RedisError::InvalidArgument {
                name: "args",
                reason: "GT and LT are mutually exclusive",
            });
        }
        if self.nx && (self.gt || self.lt) {
            return Err(RedisError::InvalidArgument {
                name: "args",
                reason: "NX cannot be combined with GT or LT",
            });
        }
        Ok(Args::new()
            .flag("NX", self.nx)
            .flag("XX", self.xx)
            .flag("GT", self.gt)
            .flag("LT", self.lt)
            .flag("CH", self.ch))
    }
}

// =============================================================================
// Result types
// =============================================================================

/// Type of the value stored at a key, as reported by `TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedisValueType {
    String,
    List,
    Set,
    ZSet,
    Hash,
    Stream,
    /// The key does not exist
    None,
}

impl RedisValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedisValueType::String => "string",
            RedisValueType::List => "list",
            RedisValueType::Set => "set",
            RedisValueType::ZSet => "zset",
            RedisValueType::Hash => "hash",
            RedisValueType::Stream => "stream",
            RedisValueType::None => "none",
        }
    }

    pub(crate) fn decode(reply: &Reply) -> Result<Self> {
        reply.to_string_value()?.parse()
    }
}

impl FromStr for RedisValueType {
    type Err = RedisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(RedisValueType::String),
            "list" => Ok(RedisValueType::List),
            "set" => Ok(RedisValueType::Set),
            "zset" => Ok(RedisValueType::ZSet),
            "hash" => Ok(RedisValueType::Hash),
            "stream" => Ok(RedisValueType::Stream),
            "none" => Ok(RedisValueType::None),
            other => Err(RedisError::Decoding(format!("unknown value type `{}`", other))),
        }
    }
}

impl fmt::Display for RedisValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sorted-set member with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredValue<V> {
    pub value: V,
    pub score: f64,
}

impl<V> ScoredValue<V> {
    pub fn new(value: V, score: f64) -> Self {
        Self { value, score }
    }
}
