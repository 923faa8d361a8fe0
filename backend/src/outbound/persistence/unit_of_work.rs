//! `UnitOfWork` adapter over the request's database context.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::ports::{UnitOfWork, UnitOfWorkFuture};

use super::context::DbContext;

/// Runs work inside a transaction on the current request context.
///
/// The outermost call opens a database transaction; calls made while one is
/// active open a savepoint on the same connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselUnitOfWork;

impl DieselUnitOfWork {
    /// Create the adapter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnitOfWork for DieselUnitOfWork {
    async fn run<'w>(&self, work: UnitOfWorkFuture<'w>) -> Result<(), Error> {
        let ctx = DbContext::current()?;
        ctx.transaction(|| work).await
    }
}
