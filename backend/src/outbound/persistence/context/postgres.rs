//! PostgreSQL binding of the request context.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use tracing::error;

use super::{ContextError, HandleSlot, TransactionalStore};
use crate::outbound::persistence::pool::{DbPool, OwnedConnection, PoolError};

/// Request context backed by the Diesel connection pool.
pub type DbContext = HandleSlot<DbPool>;

tokio::task_local! {
    static REQUEST_CONTEXT: Arc<DbContext>;
}

#[async_trait]
impl TransactionalStore for DbPool {
    type Connection = OwnedConnection;

    async fn acquire(&self) -> Result<Self::Connection, ContextError> {
        self.checkout().await.map_err(|err| match err {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                ContextError::checkout(message)
            }
        })
    }

    async fn begin(&self, conn: &mut Self::Connection) -> Result<(), ContextError> {
        <AnsiTransactionManager as TransactionManager<AsyncPgConnection>>::begin_transaction(
            &mut **conn,
        )
        .await
        .map_err(|err| ContextError::begin(err.to_string()))
    }

    async fn commit(&self, conn: &mut Self::Connection) -> Result<(), ContextError> {
        <AnsiTransactionManager as TransactionManager<AsyncPgConnection>>::commit_transaction(
            &mut **conn,
        )
        .await
        .map_err(|err| ContextError::commit(err.to_string()))
    }

    async fn rollback(&self, conn: &mut Self::Connection) -> Result<(), ContextError> {
        <AnsiTransactionManager as TransactionManager<AsyncPgConnection>>::rollback_transaction(
            &mut **conn,
        )
        .await
        .map_err(|err| ContextError::rollback(err.to_string()))
    }
}

impl DbContext {
    /// Context installed for the current task.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Missing`] when called outside
    /// [`DbContext::scope`], which means the middleware is not wired.
    pub fn current() -> Result<Arc<Self>, ContextError> {
        REQUEST_CONTEXT.try_with(Arc::clone).map_err(|_| {
            error!("database access outside a request context; is the DbContext middleware installed?");
            ContextError::Missing
        })
    }

    /// Run `fut` with `self` as the current context.
    pub async fn scope<F: Future>(self: Arc<Self>, fut: F) -> F::Output {
        REQUEST_CONTEXT.scope(self, fut).await
    }
}
