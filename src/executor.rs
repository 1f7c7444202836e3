//! Executors
//!
//! A command group builds a [`Request`]: the command plus the closure that
//! decodes its reply. The executor decides what happens next:
//!
//! - [`Direct`] sends it and decodes immediately (output `T`)
//! - [`Transactional`](crate::transaction::Transactional) queues the decoder
//!   and sends it inside `MULTI` (output `()`, the value arrives at `EXEC`)
//!
//! The same command-group code serves both modes.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::{RedisError, Result};
use crate::protocol::{Command, Reply};
use crate::transport::Transport;

/// Boxed, `'static` future returned by every operation
pub type RedisFuture<T> = BoxFuture<'static, Result<T>>;

/// Decodes one reply into the operation's typed result
pub type Decoder<T> = Box<dyn FnOnce(Reply) -> Result<T> + Send>;

/// A built command and the decoder for its eventual reply
pub struct Request<T> {
    command: Command,
    decoder: Decoder<T>,
}

impl<T> Request<T> {
    pub fn new<F>(command: Command, decoder: F) -> Self
    where
        F: FnOnce(Reply) -> Result<T> + Send + 'static,
    {
        Self {
            command,
            decoder: Box::new(decoder),
        }
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn into_parts(self) -> (Command, Decoder<T>) {
        (self.command, self.decoder)
    }
}

impl Request<Reply> {
    /// A request whose result is the raw reply
    pub fn raw(command: Command) -> Self {
        Self::new(command, Ok)
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// Execution mode of a command group
pub trait Executor: Clone + Send + Sync + 'static {
    /// What an operation yields in this mode
    type Output<T: Send + 'static>: Send + 'static;

    /// Run a built request (or surface the error that prevented building it)
    fn submit<T: Send + 'static>(&self, request: Result<Request<T>>) -> RedisFuture<Self::Output<T>>;

    /// Build and run; building happens now, before any I/O
    fn run<T, F>(&self, build: F) -> RedisFuture<Self::Output<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<Request<T>>,
    {
        self.submit(build())
    }

    /// The transport this executor sends through
    fn transport(&self) -> &Arc<dyn Transport>;
}

/// Immediate execution: one round trip, decode on arrival
#[derive(Clone)]
pub struct Direct {
    transport: Arc<dyn Transport>,
}

impl Direct {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl fmt::Debug for Direct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Direct").finish_non_exhaustive()
    }
}

impl Executor for Direct {
    type Output<T: Send + 'static> = T;

    fn submit<T: Send + 'static>(&self, request: Result<Request<T>>) -> RedisFuture<T> {
        let transport = Arc::clone(&self.transport);
        Box::pin(async move {
            let (command, decoder) = request?.into_parts();
            let reply = execute(transport.as_ref(), command).await?;
            decoder(reply)
        })
    }

    fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

/// Send one command, turning a top-level error reply into `RedisError::Server`
pub(crate) async fn execute(transport: &dyn Transport, command: Command) -> Result<Reply> {
    tracing::debug!("Executing {} ({} args)", command.name(), command.args().len());
    let reply = transport.execute(command).await?;
    tracing::trace!("Reply kind: {}", reply.kind());
    match reply {
        Reply::Error(message) => Err(RedisError::Server(message)),
        other => Ok(other),
    }
}
