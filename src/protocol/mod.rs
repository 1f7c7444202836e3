//! Protocol Module
//!
//! The two shapes that cross the transport boundary.
//!
//! ## Request
//! ```text
//! ┌──────────┬──────────┬──────────┬─────┐
//! │   Name   │  Arg 0   │  Arg 1   │ ... │   (each arg: binary-safe bytes)
//! └──────────┴──────────┴──────────┴─────┘
//! ```
//!
//! ## Reply
//! A tree of [`Reply`] nodes: nil, integer, double, boolean, simple string,
//! bulk string, error, array, map. Framing (RESP2/RESP3) is the transport's job.

mod command;
mod reply;

pub use command::{format_double, Args, Command, ToArg, NULL_ARG};
pub use reply::Reply;
pub(crate) use reply::parse_double;
