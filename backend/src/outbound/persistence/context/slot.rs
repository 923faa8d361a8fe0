//! The active-handle slot and the transaction wrapper.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedBoxFuture;
use futures_util::FutureExt;
use tracing::{debug, warn};

use super::ContextError;

/// Storage backend that can hand out connections and drive transactions on
/// them.
///
/// `begin` on a connection that is already inside a transaction must open a
/// savepoint; `commit` and `rollback` then act on the innermost level only.
#[async_trait]
pub trait TransactionalStore: Send + Sync + 'static {
    /// Connection handed to repository operations.
    type Connection: Send + 'static;

    /// Check out a fresh connection.
    async fn acquire(&self) -> Result<Self::Connection, ContextError>;

    /// Open a transaction, or a savepoint when one is already open.
    async fn begin(&self, conn: &mut Self::Connection) -> Result<(), ContextError>;

    /// Commit the innermost transaction level.
    async fn commit(&self, conn: &mut Self::Connection) -> Result<(), ContextError>;

    /// Roll back the innermost transaction level.
    async fn rollback(&self, conn: &mut Self::Connection) -> Result<(), ContextError>;
}

/// Identity of a handle within one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What an active handle routes repository calls to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Each operation gets its own pooled connection in autocommit mode.
    Ambient,
    /// Operations share the pinned connection inside an open transaction.
    /// `depth` 1 is the outermost transaction; deeper levels are savepoints.
    Transaction { depth: u32 },
}

/// Handle currently visible to repository operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHandle {
    id: HandleId,
    kind: HandleKind,
}

impl ActiveHandle {
    /// Identity of the handle.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Routing kind of the handle.
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// True for transactional handles.
    pub fn is_transaction(&self) -> bool {
        matches!(self.kind, HandleKind::Transaction { .. })
    }
}

enum Pinned<C> {
    Empty,
    Idle(C),
    Lent,
    Abandoned,
}

struct SlotState<C> {
    active: ActiveHandle,
    pinned: Pinned<C>,
}

/// Per-request holder of the active handle.
///
/// A slot starts out ambient. [`HandleSlot::transaction`] is the only way to
/// change the active handle, and it always puts the previous handle back
/// when it exits, however it exits.
pub struct HandleSlot<S: TransactionalStore> {
    store: S,
    state: Mutex<SlotState<S::Connection>>,
    next_id: AtomicU64,
}

impl<S: TransactionalStore> HandleSlot<S> {
    /// Create a slot whose active handle is the ambient one.
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(SlotState {
                active: ActiveHandle {
                    id: HandleId(0),
                    kind: HandleKind::Ambient,
                },
                pinned: Pinned::Empty,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Currently active handle.
    pub fn active(&self) -> ActiveHandle {
        self.lock().active
    }

    pub(crate) fn set(&self, handle: ActiveHandle) {
        self.lock().active = handle;
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<S::Connection>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_handle(&self, depth: u32) -> ActiveHandle {
        ActiveHandle {
            id: HandleId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            kind: HandleKind::Transaction { depth },
        }
    }

    fn lease(&self) -> Result<Lease<'_, S>, ContextError> {
        let mut state = self.lock();
        match std::mem::replace(&mut state.pinned, Pinned::Lent) {
            Pinned::Idle(conn) => Ok(Lease {
                slot: self,
                conn: Some(conn),
            }),
            Pinned::Lent => Err(ContextError::Busy),
            Pinned::Abandoned => {
                state.pinned = Pinned::Abandoned;
                Err(ContextError::Abandoned)
            }
            Pinned::Empty => {
                state.pinned = Pinned::Empty;
                Err(ContextError::Abandoned)
            }
        }
    }

    /// Run one repository operation on the connection the active handle
    /// routes to.
    ///
    /// Ambient handles check out a fresh connection for this call only;
    /// transactional handles lend the pinned connection for the duration of
    /// `op`.
    ///
    /// As with diesel-async's `AsyncConnection::transaction`, `'a` bounds
    /// what `op` captures and is independent of the borrow of `self`.
    ///
    /// # Errors
    ///
    /// Inside a transaction the pinned connection serves one call at a time;
    /// a second call polled while it is lent fails with
    /// [`ContextError::Busy`] instead of leaving the transaction.
    pub async fn with_connection<'a, T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: for<'r> FnOnce(&'r mut S::Connection) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
            + Send
            + 'a,
        E: From<ContextError> + Send + 'a,
        T: Send + 'a,
    {
        if self.active().is_transaction() {
            let mut lease = self.lease()?;
            op(lease.connection()?).await
        } else {
            let mut conn = self.store.acquire().await?;
            op(&mut conn).await
        }
    }

    /// Run `work` inside a transaction and restore the previous handle on
    /// every exit path.
    ///
    /// From the ambient handle a connection is checked out, pinned and a
    /// transaction opened on it. From a transactional handle a savepoint is
    /// opened on the pinned connection, so inner failures roll back only the
    /// inner work. `Ok` commits; `Err` rolls back and is returned unchanged;
    /// a panic rolls back and resumes unwinding. If the returned future is
    /// dropped early the previous handle is still restored and the pinned
    /// connection is released with its transaction open, which makes the
    /// pool discard it.
    ///
    /// # Errors
    ///
    /// Begin and commit failures are returned as `E::from(ContextError)`.
    /// A rollback failure is logged and the work's own error is returned.
    pub async fn transaction<T, E, F, Fut>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ContextError>,
    {
        let previous = self.active();
        let (handle, owns_connection) = match previous.kind {
            HandleKind::Ambient => {
                let mut conn = self.store.acquire().await?;
                self.store.begin(&mut conn).await?;
                self.lock().pinned = Pinned::Idle(conn);
                (self.next_handle(1), true)
            }
            HandleKind::Transaction { depth } => {
                let mut lease = self.lease()?;
                self.store.begin(lease.connection()?).await?;
                drop(lease);
                (self.next_handle(depth + 1), false)
            }
        };

        let mut guard = RestoreGuard {
            slot: self,
            previous,
            owns_connection,
            settled: false,
        };
        self.set(handle);
        debug!(handle_id = %handle.id, ?handle.kind, "transaction started");

        let outcome = AssertUnwindSafe(async move { work().await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                self.finish(handle, Finish::Commit).await?;
                guard.settled = true;
                Ok(value)
            }
            Ok(Err(err)) => {
                match self.finish(handle, Finish::Rollback).await {
                    Ok(()) => guard.settled = true,
                    Err(rollback_err) => {
                        warn!(handle_id = %handle.id, error = %rollback_err, "rollback after failed work did not complete");
                    }
                }
                Err(err)
            }
            Err(panic) => {
                match self.finish(handle, Finish::Rollback).await {
                    Ok(()) => guard.settled = true,
                    Err(rollback_err) => {
                        warn!(handle_id = %handle.id, error = %rollback_err, "rollback after panic did not complete");
                    }
                }
                drop(guard);
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn finish(&self, handle: ActiveHandle, finish: Finish) -> Result<(), ContextError> {
        let mut lease = self.lease()?;
        let conn = lease.connection()?;
        match finish {
            Finish::Commit => self.store.commit(conn).await?,
            Finish::Rollback => self.store.rollback(conn).await?,
        }
        debug!(handle_id = %handle.id, ?handle.kind, outcome = finish.label(), "transaction finished");
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Finish {
    Commit,
    Rollback,
}

impl Finish {
    fn label(self) -> &'static str {
        match self {
            Self::Commit => "committed",
            Self::Rollback => "rolled_back",
        }
    }
}

/// Pinned connection on loan to one operation. Dropping it puts the
/// connection back unless the transaction was torn down meanwhile.
struct Lease<'s, S: TransactionalStore> {
    slot: &'s HandleSlot<S>,
    conn: Option<S::Connection>,
}

impl<S: TransactionalStore> Lease<'_, S> {
    fn connection(&mut self) -> Result<&mut S::Connection, ContextError> {
        self.conn.as_mut().ok_or(ContextError::Busy)
    }
}

impl<S: TransactionalStore> Drop for Lease<'_, S> {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let mut state = self.slot.lock();
        if matches!(state.pinned, Pinned::Lent) {
            state.pinned = Pinned::Idle(conn);
        } else {
            drop(state);
            drop(conn);
        }
    }
}

/// Puts the previous handle back when the transaction scope ends.
struct RestoreGuard<'s, S: TransactionalStore> {
    slot: &'s HandleSlot<S>,
    previous: ActiveHandle,
    owns_connection: bool,
    settled: bool,
}

impl<S: TransactionalStore> Drop for RestoreGuard<'_, S> {
    fn drop(&mut self) {
        let released = {
            let mut state = self.slot.lock();
            state.active = self.previous;
            if self.owns_connection {
                Some(std::mem::replace(&mut state.pinned, Pinned::Empty))
            } else if self.settled {
                None
            } else {
                Some(std::mem::replace(&mut state.pinned, Pinned::Abandoned))
            }
        };
        if !self.settled {
            warn!(
                restored_handle_id = %self.previous.id,
                "transaction scope ended without commit or rollback"
            );
        }
        drop(released);
    }
}
