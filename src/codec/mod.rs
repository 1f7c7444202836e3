//! Codec Module
//!
//! Bidirectional value <-> bytes conversion for one domain type, and the
//! registry that maps a type to its codec.
//!
//! ## Resolution
//! Codecs are looked up by `TypeId` once, when a command group is built
//! (see [`crate::marshaller::Slot`]). Nothing is dispatched per call.
//!
//! ## Invariant
//! For every registered codec and representable value `v`:
//! `decode(encode(v)) == v`.

mod primitives;
mod structured;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{RedisError, Result};
use crate::marshaller::{Role, Slot};

pub use self::primitives::{BoolCodec, BytesCodec, FloatCodec, IntegerCodec, StringCodec, VecCodec};
pub use self::structured::{BincodeCodec, JsonCodec};

/// Converts one domain type to and from its binary representation
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T) -> Result<Bytes>;

    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

/// Registry of codecs keyed by type
///
/// Holds `Arc<dyn Codec<T>>` values type-erased behind `Any`.
#[derive(Clone)]
pub struct Codecs {
    codecs: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Codecs {
    /// A registry with the built-in codecs (strings, bytes, numbers, booleans)
    pub fn new() -> Self {
        let mut codecs = Self::empty();
        codecs.register::<String>(StringCodec);
        codecs.register::<Bytes>(BytesCodec);
        codecs.register::<Vec<u8>>(VecCodec);
        codecs.register::<i64>(IntegerCodec::<i64>::new());
        codecs.register::<i32>(IntegerCodec::<i32>::new());
        codecs.register::<u64>(IntegerCodec::<u64>::new());
        codecs.register::<u32>(IntegerCodec::<u32>::new());
        codecs.register::<f64>(FloatCodec);
        codecs.register::<bool>(BoolCodec);
        codecs
    }

    /// A registry with nothing registered
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Register (or replace) the codec for `T`
    pub fn register<T: 'static>(&mut self, codec: impl Codec<T> + 'static) -> &mut Self {
        let codec: Arc<dyn Codec<T>> = Arc::new(codec);
        self.codecs.insert(TypeId::of::<T>(), Arc::new(codec));
        self
    }

    /// Register a JSON codec for a serde type
    pub fn register_json<T>(&mut self) -> &mut Self
    where
        T: serde::Serialize + serde::de::DeserializeOwned + 'static,
    {
        self.register::<T>(JsonCodec::<T>::new())
    }

    /// Register a bincode codec for a serde type
    pub fn register_bincode<T>(&mut self) -> &mut Self
    where
        T: serde::Serialize + serde::de::DeserializeOwned + 'static,
    {
        self.register::<T>(BincodeCodec::<T>::new())
    }

    /// Whether a codec is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    /// Look up the codec for `T`
    pub fn get<T: 'static>(&self) -> Result<Arc<dyn Codec<T>>> {
        self.codecs
            .get(&TypeId::of::<T>())
            .and_then(|erased| erased.downcast_ref::<Arc<dyn Codec<T>>>())
            .cloned()
            .ok_or_else(|| {
                RedisError::Encoding(format!("no codec registered for type `{}`", type_name::<T>()))
            })
    }

    /// Resolve a typed slot for one role
    pub fn slot<T: 'static>(&self, role: Role) -> Result<Slot<T>> {
        Ok(Slot::new(role, self.get::<T>()?))
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Codecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codecs")
            .field("registered", &self.codecs.len())
            .finish()
    }
}
