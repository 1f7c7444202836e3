//! Scan cursors
//!
//! One implementation shared by `SCAN`, `HSCAN`, `SSCAN` and `ZSCAN`. Only the
//! command name, the optional key and the page decoder differ.
//!
//! ## State machine
//! ```text
//! Initial ──next()──▶ At(id) ──next()──▶ At(id') ... ──next()──▶ Exhausted
//!    │                                                             ▲
//!    └────────────────── next() returns cursor 0 ──────────────────┘
//! ```
//!
//! The server uses `0` both to start and to end a scan, so a fresh cursor
//! starts in `Initial` (sent as `0`) and only a `0` received from the server
//! means `Exhausted`. A cursor is single-pass and not restartable.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::commands::ScoredValue;
use crate::error::{RedisError, Result};
use crate::executor::execute;
use crate::protocol::{Args, Command, Reply};
use crate::transport::Transport;

/// Cursor over `SCAN` (keys)
pub type KeyScanCursor<K> = Cursor<HashSet<K>>;

/// Cursor over `HSCAN` (field/value pairs)
pub type HashScanCursor<F, V> = Cursor<HashMap<F, V>>;

/// Cursor over `SSCAN` (members)
pub type SetScanCursor<V> = Cursor<HashSet<V>>;

/// Cursor over `ZSCAN` (members with scores)
pub type SortedSetScanCursor<V> = Cursor<Vec<ScoredValue<V>>>;

type PageDecoder<P> = Arc<dyn Fn(Reply) -> Result<P> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Not started; sent on the wire as `0`
    Initial,
    At(u64),
    Exhausted,
}

/// Stateful, single-pass iteration over a scan command family
///
/// Not safe for concurrent `next()` calls; `next` takes `&mut self`.
pub struct Cursor<P> {
    transport: Arc<dyn Transport>,
    command: &'static str,
    key: Option<Bytes>,
    args: Args,
    position: Position,
    decode: PageDecoder<P>,
}

impl<P> Cursor<P> {
    pub(crate) fn new<D>(
        transport: Arc<dyn Transport>,
        command: &'static str,
        key: Option<Bytes>,
        args: Args,
        decode: D,
    ) -> Self
    where
        D: Fn(Reply) -> Result<P> + Send + Sync + 'static,
    {
        Self {
            transport,
            command,
            key,
            args,
            position: Position::Initial,
            decode: Arc::new(decode),
        }
    }

    /// True before the first fetch and while the server has more pages
    pub fn has_next(&self) -> bool {
        !matches!(self.position, Position::Exhausted)
    }

    /// The server-side cursor id, once one has been received
    pub fn cursor_id(&self) -> Option<u64> {
        match self.position {
            Position::At(id) => Some(id),
            Position::Exhausted => Some(0),
            Position::Initial => None,
        }
    }

    /// Fetch the next page
    ///
    /// Fails with `IllegalState` once the cursor is exhausted. A page may be
    /// empty while the cursor still has more to return.
    pub async fn next(&mut self) -> Result<P> {
        let position = match self.position {
            Position::Initial => 0,
            Position::At(id) => id,
            Position::Exhausted => {
                return Err(RedisError::IllegalState(format!(
                    "{} cursor already exhausted",
                    self.command
                )))
            }
        };

        let command = Command::new(self.command)
            .put(&self.key)
            .put(position)
            .put(&self.args);
        let reply = execute(self.transport.as_ref(), command).await?;

        let mut parts = reply.into_array()?.into_iter();
        let (id, page) = match (parts.next(), parts.next()) {
            (Some(id), Some(page)) => (id, page),
            _ => {
                return Err(RedisError::Decoding(format!(
                    "{} reply must be [cursor, page]",
                    self.command
                )))
            }
        };
        let next_id = id.to_u64()?;
        let page = (self.decode)(page)?;

        self.position = if next_id == 0 {
            Position::Exhausted
        } else {
            Position::At(next_id)
        };
        tracing::trace!("{} cursor {} -> {:?}", self.command, position, self.position);

        Ok(page)
    }

    /// Lazy stream of every element, page by page
    ///
    /// Each page is fetched only when the previous one has been consumed.
    /// Dropping the stream stops fetching. The first error ends the stream.
    pub fn into_stream(self) -> BoxStream<'static, Result<P::Item>>
    where
        P: IntoIterator + Send + 'static,
        P::Item: Send + 'static,
        P::IntoIter: Send + 'static,
    {
        let pages = stream::try_unfold(self, |mut cursor| async move {
            if !cursor.has_next() {
                return Ok::<_, RedisError>(None);
            }
            let page = cursor.next().await?;
            Ok::<_, RedisError>(Some((page, cursor)))
        });

        pages
            .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, RedisError>)))
            .try_flatten()
            .boxed()
    }
}

impl<P> fmt::Debug for Cursor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("command", &self.command)
            .field("position", &self.position)
            .field("args", &self.args.len())
            .finish()
    }
}
