//! Argument validation
//!
//! Every operation checks its inputs before building a command, so invalid
//! input never reaches the transport.

use crate::error::{RedisError, Result};

/// Variadic input must contain at least one element
pub fn not_empty<T>(values: &[T], name: &'static str) -> Result<()> {
    if values.is_empty() {
        return Err(RedisError::InvalidArgument {
            name,
            reason: "must contain at least one element",
        });
    }
    Ok(())
}

/// Variadic input must contain at least `min` elements
pub fn at_least<T>(values: &[T], min: usize, name: &'static str) -> Result<()> {
    not_empty(values, name)?;
    if values.len() < min {
        return Err(RedisError::InvalidArgument {
            name,
            reason: "does not contain enough elements",
        });
    }
    Ok(())
}

/// Text arguments (index names, paths, queries) must not be blank
pub fn not_blank(value: &str, name: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RedisError::InvalidArgument {
            name,
            reason: "must not be blank",
        });
    }
    Ok(())
}

pub fn positive(value: i64, name: &'static str) -> Result<()> {
    if value <= 0 {
        return Err(RedisError::InvalidArgument {
            name,
            reason: "must be strictly positive",
        });
    }
    Ok(())
}

pub fn positive_or_zero(value: i64, name: &'static str) -> Result<()> {
    if value < 0 {
        return Err(RedisError::InvalidArgument {
            name,
            reason: "must be positive or zero",
        });
    }
    Ok(())
}
