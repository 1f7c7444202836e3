//! Built-in codecs
//!
//! Strings and raw bytes pass through untouched; numbers and booleans use the
//! textual form the server itself understands (`INCR` works on them).

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use bytes::Bytes;

use super::Codec;
use crate::error::{RedisError, Result};
use crate::protocol::{format_double, parse_double};

/// UTF-8 strings
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode(&self, value: &String) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(value.as_bytes()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RedisError::Decoding(format!("invalid UTF-8 string: {}", e)))
    }
}

/// Raw bytes as `Bytes`
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec<Bytes> for BytesCodec {
    fn encode(&self, value: &Bytes) -> Result<Bytes> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

/// Raw bytes as `Vec<u8>`
#[derive(Debug, Clone, Copy, Default)]
pub struct VecCodec;

impl Codec<Vec<u8>> for VecCodec {
    fn encode(&self, value: &Vec<u8>) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(value))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// Any integer type, as decimal text
#[derive(Debug, Clone, Copy)]
pub struct IntegerCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> IntegerCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for IntegerCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for IntegerCodec<T>
where
    T: FromStr + Display,
{
    fn encode(&self, value: &T) -> Result<Bytes> {
        Ok(Bytes::from(value.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RedisError::Decoding(format!("invalid UTF-8 integer: {}", e)))?;
        text.trim()
            .parse()
            .map_err(|_| RedisError::Decoding(format!("`{}` is not a valid integer", text)))
    }
}

/// `f64`, with `+inf`/`-inf` for the infinities
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

impl Codec<f64> for FloatCodec {
    fn encode(&self, value: &f64) -> Result<Bytes> {
        if value.is_nan() {
            return Err(RedisError::Encoding("NaN cannot be sent to the server".to_string()));
        }
        Ok(Bytes::from(format_double(*value)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<f64> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RedisError::Decoding(format!("invalid UTF-8 number: {}", e)))?;
        parse_double(text.trim())
            .ok_or_else(|| RedisError::Decoding(format!("`{}` is not a valid number", text)))
    }
}

/// Booleans as `1`/`0`; also accepts `true`/`false` when decoding
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn encode(&self, value: &bool) -> Result<Bytes> {
        Ok(Bytes::from_static(if *value { b"1" } else { b"0" }))
    }

    fn decode(&self, bytes: &[u8]) -> Result<bool> {
        match bytes {
            b"1" | b"true" => Ok(true),
            b"0" | b"false" => Ok(false),
            other => Err(RedisError::Decoding(format!(
                "`{}` is not a valid boolean",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}
