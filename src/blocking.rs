//! Synchronous facade
//!
//! One generic adapter instead of a blocking copy of every command group:
//! any operation future can be waited on with a bounded timeout.
//!
//! ```text
//! caller thread ──wait(fut)──▶ spawn fut on runtime ──▶ timeout(join handle)
//!                                                          │
//!            Ok(value) / Err(e) ◀── completed in time ─────┤
//!            Err(Timeout)       ◀── expired: handle dropped,
//!                                   the task keeps running
//! ```
//!
//! Must be called from outside the runtime (a plain thread); calling it
//! from async code fails with `IllegalState` instead of blocking a worker.
//! The handle must belong to a multi-thread runtime: a current-thread
//! runtime only makes progress on its own thread, so the wait is rejected.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};

use crate::cursor::Cursor;
use crate::datasource::{DataSource, TransactionalDataSource};
use crate::error::{RedisError, Result};
use crate::transaction::{OptimisticLockingTransactionResult, TransactionResult};

/// Blocking view of a [`DataSource`]
#[derive(Debug, Clone)]
pub struct BlockingDataSource {
    inner: DataSource,
    handle: Handle,
    timeout: Duration,
}

impl BlockingDataSource {
    pub fn new(inner: DataSource, handle: Handle, timeout: Duration) -> Self {
        Self {
            inner,
            handle,
            timeout,
        }
    }

    /// The asynchronous data source, to obtain command groups
    pub fn data_source(&self) -> &DataSource {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Same facade with another wait bound
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Block the calling thread until `future` completes or the timeout expires
    ///
    /// On timeout the operation is not cancelled; only the wait stops.
    pub fn wait<T, Fut>(&self, future: Fut) -> Result<T>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if Handle::try_current().is_ok() {
            return Err(RedisError::IllegalState(
                "blocking wait called from inside an async runtime".to_string(),
            ));
        }
        if self.handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            return Err(RedisError::IllegalState(
                "blocking wait requires a multi-thread runtime handle".to_string(),
            ));
        }

        let timeout = self.timeout;
        let task = self.handle.spawn(future);
        self.handle.block_on(async move {
            match tokio::time::timeout(timeout, task).await {
                Ok(Ok(result)) => result,
                Ok(Err(join)) => Err(RedisError::IllegalState(format!(
                    "operation task failed: {}",
                    join
                ))),
                Err(_) => {
                    tracing::warn!("Blocking wait expired after {:?}", timeout);
                    Err(RedisError::Timeout(timeout))
                }
            }
        })
    }

    /// Blocking [`DataSource::with_transaction`]
    pub fn with_transaction<F, Fut>(&self, block: F) -> Result<TransactionResult>
    where
        F: FnOnce(TransactionalDataSource) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.wait(self.inner.with_transaction(block))
    }

    /// Blocking [`DataSource::with_transaction_watching`]
    pub fn with_transaction_watching<F, Fut>(
        &self,
        watched: &[&str],
        block: F,
    ) -> Result<TransactionResult>
    where
        F: FnOnce(TransactionalDataSource) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.wait(self.inner.with_transaction_watching(watched, block))
    }

    /// Blocking [`DataSource::with_optimistic_transaction`]
    pub fn with_optimistic_transaction<I, P, PFut, F, Fut>(
        &self,
        pre: P,
        block: F,
        watched: &[&str],
    ) -> Result<OptimisticLockingTransactionResult<I>>
    where
        I: Clone + Send + 'static,
        P: FnOnce(DataSource) -> PFut + Send + 'static,
        PFut: Future<Output = Result<I>> + Send + 'static,
        F: FnOnce(I, TransactionalDataSource) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.wait(self.inner.with_optimistic_transaction(pre, block, watched))
    }

    /// Iterate every element of a cursor, fetching pages as needed
    pub fn iter<P>(&self, cursor: Cursor<P>) -> CursorIter<P>
    where
        P: IntoIterator + Send + 'static,
    {
        CursorIter {
            facade: self.clone(),
            cursor: Some(cursor),
            page: None,
        }
    }
}

/// Blocking iterator over a cursor's elements
///
/// Ends after the last page, or right after yielding an error.
pub struct CursorIter<P: IntoIterator> {
    facade: BlockingDataSource,
    cursor: Option<Cursor<P>>,
    page: Option<P::IntoIter>,
}

impl<P> Iterator for CursorIter<P>
where
    P: IntoIterator + Send + 'static,
{
    type Item = Result<P::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.page.as_mut().and_then(Iterator::next) {
                return Some(Ok(item));
            }
            self.page = None;

            let mut cursor = self.cursor.take()?;
            if !cursor.has_next() {
                return None;
            }
            let fetched = self.facade.wait(async move {
                let page = cursor.next().await?;
                Ok((cursor, page))
            });
            match fetched {
                Ok((cursor, page)) => {
                    self.cursor = Some(cursor);
                    self.page = Some(page.into_iter());
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
