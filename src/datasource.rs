//! Data source: entry point to every command group
//!
//! ## Modes
//! ```text
//! DataSource (Direct) ──with_transaction──▶ TransactionalDataSource
//!        │                                        │
//!   .value::<K, V>()                         .value::<K, V>()
//!   returns T per call                       returns () per call,
//!                                            values arrive at EXEC
//! ```
//!
//! Command groups are built on demand and resolve their codecs once. Every
//! operation returns a `'static` future, so it can be spawned or awaited
//! anywhere.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::blocking::BlockingDataSource;
use crate::codec::Codecs;
use crate::commands::{
    BitMapCommands, BloomCommands, GraphCommands, HashCommands, HyperLogLogCommands,
    JsonCommands, KeyCommands, ListCommands, PubSubCommands, SearchCommands, SetCommands,
    SortedSetCommands, ValueCommands,
};
use crate::config::Config;
use crate::error::Result;
use crate::executor::{execute, Direct, Executor, RedisFuture, Request};
use crate::protocol::{Args, Command, Reply};
use crate::transaction::{
    OptimisticLockingTransactionResult, TransactionResult, TransactionState, Transactional,
};
use crate::transport::Transport;
use crate::validation;

/// Entry point to the command groups, in direct or transactional mode
#[derive(Clone)]
pub struct DataSource<E = Direct> {
    executor: E,
    codecs: Arc<Codecs>,
    config: Config,
}

/// The data source handed to a transaction block
pub type TransactionalDataSource = DataSource<Transactional>;

// =============================================================================
// Both modes
// =============================================================================

impl<E: Executor> DataSource<E> {
    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// String commands; fails if a slot type has no registered codec
    pub fn value<K, V>(&self) -> Result<ValueCommands<K, V, E>>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        ValueCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn key<K>(&self) -> Result<KeyCommands<K, E>>
    where
        K: Send + 'static,
    {
        KeyCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn hash<K, F, V>(&self) -> Result<HashCommands<K, F, V, E>>
    where
        K: Send + 'static,
        F: Eq + std::hash::Hash + Send + 'static,
        V: Send + 'static,
    {
        HashCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn set<K, V>(&self) -> Result<SetCommands<K, V, E>>
    where
        K: Send + 'static,
        V: Eq + std::hash::Hash + Send + 'static,
    {
        SetCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn sorted_set<K, V>(&self) -> Result<SortedSetCommands<K, V, E>>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        SortedSetCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn list<K, V>(&self) -> Result<ListCommands<K, V, E>>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        ListCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn bitmap<K>(&self) -> Result<BitMapCommands<K, E>>
    where
        K: Send + 'static,
    {
        BitMapCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn hyperloglog<K, V>(&self) -> Result<HyperLogLogCommands<K, V, E>>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        HyperLogLogCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn bloom<K, V>(&self) -> Result<BloomCommands<K, V, E>>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        BloomCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn json<K>(&self) -> Result<JsonCommands<K, E>>
    where
        K: Send + 'static,
    {
        JsonCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn search(&self) -> SearchCommands<E> {
        SearchCommands::new(self.executor.clone())
    }

    pub fn graph<K>(&self) -> Result<GraphCommands<K, E>>
    where
        K: Send + 'static,
    {
        GraphCommands::new(self.executor.clone(), &self.codecs)
    }

    pub fn pubsub<V>(&self) -> Result<PubSubCommands<V, E>>
    where
        V: Send + 'static,
    {
        PubSubCommands::new(self.executor.clone(), &self.codecs)
    }

    /// Run an arbitrary command and return the raw reply
    pub fn execute(&self, name: &str, args: &Args) -> RedisFuture<E::Output<Reply>> {
        self.executor.run(|| {
            validation::not_blank(name, "name")?;
            Ok(Request::raw(Command::new(name).put(args)))
        })
    }
}

impl<E> fmt::Debug for DataSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("mode", &std::any::type_name::<E>())
            .field("codecs", &self.codecs)
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Direct mode
// =============================================================================

impl DataSource<Direct> {
    /// A data source with the built-in codecs and default configuration
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_codecs(transport, Codecs::new())
    }

    pub fn with_codecs(transport: Arc<dyn Transport>, codecs: Codecs) -> Self {
        Self {
            executor: Direct::new(transport),
            codecs: Arc::new(codecs),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        self.executor.transport()
    }

    /// Synchronous facade running on `handle`, waiting at most the configured timeout
    pub fn blocking(&self, handle: Handle) -> BlockingDataSource {
        BlockingDataSource::new(self.clone(), handle, self.config.blocking_timeout())
    }

    /// Run `block` inside `MULTI`/`EXEC`
    ///
    /// The block queues commands through the transactional data source; their
    /// values are decoded from the `EXEC` reply, in call order. A rejected
    /// enqueue yields a discarded result. A failing block is discarded and
    /// its error returned.
    ///
    /// # Example
    /// ```text
    /// let result = ds.with_transaction(|tx| async move {
    ///     let values = tx.value::<String, i64>()?;
    ///     values.set(&"a".to_string(), &1).await?;
    ///     values.get(&"a".to_string()).await?;
    ///     Ok(())
    /// }).await?;
    /// assert_eq!(result.get::<Option<i64>>(1), Some(&Some(1)));
    /// ```
    pub fn with_transaction<F, Fut>(&self, block: F) -> RedisFuture<TransactionResult>
    where
        F: FnOnce(TransactionalDataSource) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let this = self.clone();
        Box::pin(async move { this.transaction(block).await })
    }

    /// `WATCH` the given keys, then run `block` inside `MULTI`/`EXEC`
    ///
    /// If a watched key is modified before `EXEC`, the server aborts and the
    /// result is discarded.
    pub fn with_transaction_watching<F, Fut>(
        &self,
        watched: &[&str],
        block: F,
    ) -> RedisFuture<TransactionResult>
    where
        F: FnOnce(TransactionalDataSource) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let watch = watch_command(watched);
        let this = self.clone();
        Box::pin(async move {
            this.send(watch?).await?.to_unit()?;
            this.transaction(block).await
        })
    }

    /// Optimistic locking: `WATCH`, read with `pre`, then transact with its value
    ///
    /// `pre` runs on this (direct) data source while the keys are watched.
    /// If it fails, the keys are unwatched and its error returned. Its value
    /// is passed to `block` and carried in the result.
    pub fn with_optimistic_transaction<I, P, PFut, F, Fut>(
        &self,
        pre: P,
        block: F,
        watched: &[&str],
    ) -> RedisFuture<OptimisticLockingTransactionResult<I>>
    where
        I: Clone + Send + 'static,
        P: FnOnce(DataSource) -> PFut + Send + 'static,
        PFut: Future<Output = Result<I>> + Send + 'static,
        F: FnOnce(I, TransactionalDataSource) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let watch = watch_command(watched);
        let this = self.clone();
        Box::pin(async move {
            this.send(watch?).await?.to_unit()?;

            let input = match pre(this.clone()).await {
                Ok(input) => input,
                Err(e) => {
                    tracing::debug!("Pre-transaction block failed, unwatching: {}", e);
                    if let Err(unwatch) = this.send(Command::new("UNWATCH")).await {
                        tracing::warn!("UNWATCH failed: {}", unwatch);
                    }
                    return Err(e);
                }
            };

            let for_block = input.clone();
            let result = this.transaction(move |tx| block(for_block, tx)).await?;
            Ok(OptimisticLockingTransactionResult::new(input, result))
        })
    }

    async fn send(&self, command: Command) -> Result<Reply> {
        execute(self.executor.transport().as_ref(), command).await
    }

    async fn transaction<F, Fut>(&self, block: F) -> Result<TransactionResult>
    where
        F: FnOnce(TransactionalDataSource) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.send(Command::new("MULTI")).await?.to_unit()?;
        tracing::debug!("Transaction started");

        let state = Arc::new(TransactionState::new());
        let tx = DataSource {
            executor: Transactional::new(Arc::clone(self.transport()), Arc::clone(&state)),
            codecs: Arc::clone(&self.codecs),
            config: self.config.clone(),
        };

        if let Err(e) = block(tx).await {
            state.mark_discarded();
            if state.claim_discard() {
                if let Err(discard) = self.send(Command::new("DISCARD")).await {
                    tracing::warn!("DISCARD after failed block failed: {}", discard);
                }
            }
            tracing::debug!("Transaction block failed, discarded: {}", e);
            return Err(e);
        }

        if state.is_discarded() {
            if state.claim_discard() {
                let discarded = self.send(Command::new("DISCARD")).await;
                if let Err(e) = discarded.and_then(|reply| reply.to_unit()) {
                    tracing::warn!("DISCARD of discarded transaction failed: {}", e);
                }
            }
            tracing::debug!("Transaction discarded ({} commands queued)", state.queued());
            return Ok(TransactionResult::discarded());
        }

        let queued = state.queued();
        match self.send(Command::new("EXEC")).await? {
            Reply::Nil => {
                tracing::debug!("EXEC aborted: a watched key was modified");
                Ok(TransactionResult::discarded())
            }
            reply => {
                let result = state.complete(reply.into_array()?)?;
                tracing::debug!(
                    "Transaction committed ({} commands, errors: {})",
                    queued,
                    result.has_errors()
                );
                Ok(result)
            }
        }
    }
}

fn watch_command(watched: &[&str]) -> Result<Command> {
    validation::not_empty(watched, "keys")?;
    for key in watched {
        validation::not_blank(key, "keys")?;
    }
    Ok(Command::new("WATCH").put(watched))
}

// =============================================================================
// Transactional mode
// =============================================================================

impl DataSource<Transactional> {
    /// Abandon the transaction: flips it to discarded and sends `DISCARD` once
    pub fn discard(&self) -> RedisFuture<()> {
        let state = Arc::clone(self.executor.state());
        let transport = Arc::clone(self.executor.transport());
        Box::pin(async move {
            state.mark_discarded();
            if state.claim_discard() {
                execute(transport.as_ref(), Command::new("DISCARD"))
                    .await?
                    .to_unit()?;
                tracing::debug!("Transaction discarded by caller");
            }
            Ok(())
        })
    }

    /// Whether the transaction has been discarded; never fails
    pub fn discarded(&self) -> bool {
        self.executor.state().is_discarded()
    }
}

