//! Request-scoped transactional context.
//!
//! Each request owns one [`HandleSlot`] holding the handle that repository
//! calls must use: the ambient handle, which checks a fresh pooled
//! connection out per operation, or a transactional handle, which routes
//! every operation to one pinned connection with an open transaction.
//!
//! The middleware installs a fresh slot per request through a task-local,
//! so repositories resolve it with [`DbContext::current`] at call time and
//! never capture a handle. Only [`HandleSlot::transaction`] changes the
//! active handle; a drop guard restores the previous one on success, error,
//! panic, and cancellation alike. Nested transactions become savepoints on
//! the pinned connection.

mod error;
mod postgres;
mod slot;

pub use error::ContextError;
pub use postgres::DbContext;
pub use slot::{ActiveHandle, HandleId, HandleKind, HandleSlot, TransactionalStore};
