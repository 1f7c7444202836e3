//! Publishing
//!
//! Subscriptions need a dedicated connection and message delivery, which
//! belong to the transport. Only `PUBLISH` goes through a command group.

use crate::codec::Codecs;
use crate::error::Result;
use crate::executor::{Direct, Executor, RedisFuture, Request};
use crate::marshaller::{Role, Slot};
use crate::protocol::Command;
use crate::validation;

pub struct PubSubCommands<V, E = Direct> {
    executor: E,
    messages: Slot<V>,
}

impl<V, E> PubSubCommands<V, E>
where
    V: Send + 'static,
    E: Executor,
{
    pub(crate) fn new(executor: E, codecs: &Codecs) -> Result<Self> {
        Ok(Self {
            executor,
            messages: codecs.slot(Role::Value)?,
        })
    }

    /// Number of subscribers that received the message
    pub fn publish(&self, channel: &str, message: &V) -> RedisFuture<E::Output<i64>> {
        self.executor.run(|| {
            validation::not_blank(channel, "channel")?;
            let command = Command::new("PUBLISH")
                .put(channel)
                .put(self.messages.encode(message)?);
            Ok(Request::new(command, |reply| reply.to_i64()))
        })
    }
}
