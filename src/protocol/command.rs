//! Command definitions
//!
//! A command is a name plus an ordered, append-only list of wire arguments.
//! Arguments are appended in call order and never reordered or deduplicated.

use std::fmt;

use bytes::Bytes;

/// Marker sent in place of an absent nullable argument
pub const NULL_ARG: &[u8] = b"null";

/// An outbound command, built fresh for every call
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<Bytes>,
}

impl Command {
    /// Start a command with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument (or a flattened sequence of them)
    pub fn put(mut self, value: impl ToArg) -> Self {
        value.write_args(&mut self.args);
        self
    }

    /// Append either the bytes or the protocol null marker
    ///
    /// Distinguishes "absent" from "empty string".
    pub fn put_nullable(mut self, value: Option<Bytes>) -> Self {
        self.push_nullable(value);
        self
    }

    /// Append every element of a sequence
    pub fn put_all<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        for value in values {
            value.write_args(&mut self.args);
        }
        self
    }

    /// In-place variant of [`Command::put`], for loops
    pub fn push(&mut self, value: impl ToArg) -> &mut Self {
        value.write_args(&mut self.args);
        self
    }

    /// In-place variant of [`Command::put_nullable`]
    pub fn push_nullable(&mut self, value: Option<Bytes>) -> &mut Self {
        match value {
            Some(bytes) => self.args.push(bytes),
            None => self.args.push(Bytes::from_static(NULL_ARG)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Argument at `index` as UTF-8 (lossy), for logging and tests
    pub fn arg_str(&self, index: usize) -> Option<String> {
        self.args
            .get(index)
            .map(|a| String::from_utf8_lossy(a).into_owned())
    }

    /// Split into name and arguments
    pub fn into_parts(self) -> (String, Vec<Bytes>) {
        (self.name, self.args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        list.entry(&self.name);
        for arg in &self.args {
            list.entry(&String::from_utf8_lossy(arg));
        }
        list.finish()
    }
}

// =============================================================================
// Argument Conversion
// =============================================================================

/// Anything that can be appended to a [`Command`]
///
/// Implemented for strings, integers, floats, booleans, binary buffers,
/// sequences of those, and pre-built [`Args`] lists. Types without an impl
/// are rejected at compile time.
pub trait ToArg {
    /// Append this value's wire form to `out`
    fn write_args(&self, out: &mut Vec<Bytes>);
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        (**self).write_args(out)
    }
}

impl ToArg for str {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(Bytes::copy_from_slice(self.as_bytes()));
    }
}

impl ToArg for String {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(Bytes::copy_from_slice(self.as_bytes()));
    }
}

impl ToArg for Bytes {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(self.clone());
    }
}

impl ToArg for bool {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(Bytes::from_static(if *self { b"1" } else { b"0" }));
    }
}

impl ToArg for f64 {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(Bytes::from(format_double(*self)));
    }
}

macro_rules! integer_to_arg {
    ($($ty:ty),*) => {
        $(
            impl ToArg for $ty {
                fn write_args(&self, out: &mut Vec<Bytes>) {
                    out.push(Bytes::from(self.to_string()));
                }
            }
        )*
    };
}

integer_to_arg!(i32, i64, u32, u64, usize);

impl<T: ToArg> ToArg for [T] {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        for item in self {
            item.write_args(out);
        }
    }
}

impl<T: ToArg> ToArg for Vec<T> {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        self.as_slice().write_args(out)
    }
}

impl<T: ToArg> ToArg for Option<T> {
    /// `None` appends nothing: an omitted optional argument
    fn write_args(&self, out: &mut Vec<Bytes>) {
        if let Some(value) = self {
            value.write_args(out);
        }
    }
}

/// Format a score/float the way the server parses it
pub fn format_double(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}

// =============================================================================
// Pre-built argument lists
// =============================================================================

/// An opaque, pre-built list of arguments (option objects, index schemas, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    args: Vec<Bytes>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one argument
    pub fn arg(mut self, value: impl ToArg) -> Self {
        value.write_args(&mut self.args);
        self
    }

    /// Append a flag only when `enabled`
    pub fn flag(mut self, name: &str, enabled: bool) -> Self {
        if enabled {
            self.args.push(Bytes::copy_from_slice(name.as_bytes()));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn as_slice(&self) -> &[Bytes] {
        &self.args
    }
}

impl ToArg for Args {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.extend(self.args.iter().cloned());
    }
}

impl<T: ToArg> FromIterator<T> for Args {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut args = Vec::new();
        for item in iter {
            item.write_args(&mut args);
        }
        Self { args }
    }
}
