//! Command Groups
//!
//! One group per data-structure family. Every operation follows the same
//! steps:
//!
//! ```text
//! validate args ──▶ encode via slots ──▶ build Command ──▶ Executor
//!                                                           │
//!               Direct: send, decode now ◀──────────────────┤
//!        Transactional: queue decoder, send inside MULTI ◀──┘
//! ```
//!
//! Validation and encoding run before the future is returned, so invalid
//! input fails without any I/O. Each operation is exactly one round trip.
//! Scan cursors are only offered on direct groups.

mod args;
mod bitmap;
mod bloom;
mod graph;
mod hash;
mod hyperloglog;
mod json;
mod keys;
mod list;
mod pubsub;
mod search;
mod set;
mod sorted_set;
mod value;

pub use args::{RedisValueType, ScanArgs, ScoredValue, SetArgs, ZAddArgs};
pub use bitmap::BitMapCommands;
pub use bloom::BloomCommands;
pub use graph::{GraphCommands, GraphQueryResult};
pub use hash::HashCommands;
pub use hyperloglog::HyperLogLogCommands;
pub use json::{JsonCommands, ROOT_PATH};
pub use keys::KeyCommands;
pub use list::ListCommands;
pub use pubsub::PubSubCommands;
pub use search::{Document, SearchCommands, SearchResult};
pub use set::SetCommands;
pub use sorted_set::SortedSetCommands;
pub use value::ValueCommands;
