//! Transaction queue and transactional executor
//!
//! ## State machine
//! ```text
//! OPEN ──enqueue acked──▶ OPEN
//!   │
//!   └─enqueue rejected / cancelled / discard()──▶ DISCARDED (one-way)
//!
//! OPEN ──EXEC──▶ COMMITTED
//! ```
//!
//! Decoders are stored in call order; slot `i` decodes reply element `i` of
//! the EXEC reply. The decoder is pushed *before* the command is sent.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::TransactionResult;
use crate::error::{RedisError, Result};
use crate::executor::{Executor, RedisFuture, Request};
use crate::protocol::{Command, Reply};
use crate::transport::Transport;

/// A queued decoder, type-erased so one queue can hold every result type
pub(crate) type ErasedDecoder = Box<dyn FnOnce(Reply) -> Result<Box<dyn Any + Send>> + Send>;

/// Shared state of one open transaction
pub struct TransactionState {
    /// Index = call order, value = decoder for that reply element
    decoders: Mutex<Vec<ErasedDecoder>>,

    /// Set on the first rejected enqueue; never cleared
    discarded: AtomicBool,

    /// DISCARD already sent to the server
    discard_sent: AtomicBool,
}

impl TransactionState {
    pub fn new() -> Self {
        Self {
            decoders: Mutex::new(Vec::new()),
            discarded: AtomicBool::new(false),
            discard_sent: AtomicBool::new(false),
        }
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded.load(Ordering::Acquire)
    }

    /// Flip to discarded. Returns true the first time.
    pub fn mark_discarded(&self) -> bool {
        !self.discarded.swap(true, Ordering::AcqRel)
    }

    /// Number of decoders queued so far
    pub fn queued(&self) -> usize {
        self.decoders.lock().len()
    }

    /// Claim the right to send DISCARD. Returns true only once.
    pub(crate) fn claim_discard(&self) -> bool {
        !self.discard_sent.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn enqueue(&self, decoder: ErasedDecoder) -> usize {
        let mut decoders = self.decoders.lock();
        decoders.push(decoder);
        decoders.len() - 1
    }

    /// Apply the queued decoders to the EXEC reply elements
    ///
    /// The counts must match exactly; anything else is a broken pipeline and
    /// fails the whole commit.
    pub(crate) fn complete(&self, replies: Vec<Reply>) -> Result<TransactionResult> {
        let decoders = std::mem::take(&mut *self.decoders.lock());
        if decoders.len() != replies.len() {
            return Err(RedisError::ReplyCountMismatch {
                expected: decoders.len(),
                actual: replies.len(),
            });
        }

        let values = decoders
            .into_iter()
            .zip(replies)
            .map(|(decoder, reply)| match reply {
                Reply::Error(message) => Err(RedisError::Server(message)),
                reply => decoder(reply),
            })
            .collect();

        Ok(TransactionResult::committed(values))
    }
}

impl Default for TransactionState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionState")
            .field("queued", &self.queued())
            .field("discarded", &self.is_discarded())
            .finish()
    }
}

/// Flips the transaction to discarded if an enqueue future is dropped
/// between queueing its decoder and seeing the acknowledgement.
struct EnqueueGuard<'a> {
    state: &'a TransactionState,
    armed: bool,
}

impl<'a> EnqueueGuard<'a> {
    fn new(state: &'a TransactionState) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for EnqueueGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.state.mark_discarded() {
            tracing::warn!("Enqueue cancelled before acknowledgement, transaction discarded");
        }
    }
}

/// Queue-then-decode-at-EXEC execution
#[derive(Clone)]
pub struct Transactional {
    transport: Arc<dyn Transport>,
    state: Arc<TransactionState>,
}

impl Transactional {
    pub fn new(transport: Arc<dyn Transport>, state: Arc<TransactionState>) -> Self {
        Self { transport, state }
    }

    pub fn state(&self) -> &Arc<TransactionState> {
        &self.state
    }
}

impl fmt::Debug for Transactional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transactional")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Executor for Transactional {
    type Output<T: Send + 'static> = ();

    fn submit<T: Send + 'static>(&self, request: Result<Request<T>>) -> RedisFuture<()> {
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let (command, decoder) = request?.into_parts();
            enqueue(transport.as_ref(), &state, command, decoder).await
        })
    }

    fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

async fn enqueue<T: Send + 'static>(
    transport: &dyn Transport,
    state: &TransactionState,
    command: Command,
    decoder: Box<dyn FnOnce(Reply) -> Result<T> + Send>,
) -> Result<()> {
    if state.is_discarded() {
        return Err(RedisError::IllegalState(format!(
            "transaction discarded, `{}` not sent",
            command.name()
        )));
    }

    let name = command.name().to_string();
    let index = state.enqueue(Box::new(move |reply| {
        decoder(reply).map(|value| Box::new(value) as Box<dyn Any + Send>)
    }));
    tracing::trace!("Queued {} at position {}", name, index);

    let guard = EnqueueGuard::new(state);
    let ack = transport.execute(command).await;
    guard.disarm();

    match ack {
        Ok(reply) if reply.is_queued() => Ok(()),
        Ok(reply) => {
            state.mark_discarded();
            let detail = match reply {
                Reply::Error(message) => message,
                other => format!("unexpected {} reply", other.kind()),
            };
            tracing::warn!("Server refused to queue {}: {}", name, detail);
            Err(RedisError::IllegalState(format!(
                "unable to queue command `{}`: {}",
                name, detail
            )))
        }
        Err(e) => {
            state.mark_discarded();
            tracing::warn!("Transport failed while queueing {}: {}", name, e);
            Err(e)
        }
    }
}
