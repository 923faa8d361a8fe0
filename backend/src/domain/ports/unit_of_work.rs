//! Driven port for running work atomically.
//!
//! Services hand a unit of work to [`UnitOfWork::run`] and never see a
//! transaction object. Repositories called from inside the work pick up the
//! active transaction on their own, so nested call chains share it without
//! threading a handle through every signature.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::Error;

/// Boxed unit of work accepted by [`UnitOfWork::run`].
pub type UnitOfWorkFuture<'w> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'w>>;

/// Runs a unit of work so that its writes commit together or not at all.
///
/// Implementations commit when the work returns `Ok`, roll back and return
/// the error unchanged when it returns `Err`, and roll back before resuming
/// a panic. Calling `run` from inside another unit of work nests: the inner
/// work can fail without aborting the outer one.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Execute `work` atomically.
    async fn run<'w>(&self, work: UnitOfWorkFuture<'w>) -> Result<(), Error>;
}

/// Run `work` through `uow` and hand back the value it produced.
///
/// # Examples
/// ```
/// use social_backend::domain::ports::{FixtureUnitOfWork, in_transaction};
///
/// let uow = FixtureUnitOfWork::default();
/// let value = futures::executor::block_on(in_transaction(&uow, || async { Ok(21 * 2) }));
/// assert_eq!(value.ok(), Some(42));
/// ```
pub async fn in_transaction<U, T, F, Fut>(uow: &U, work: F) -> Result<T, Error>
where
    U: UnitOfWork + ?Sized,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, Error>> + Send,
    T: Send,
{
    let mut output = None;
    let slot = &mut output;
    uow.run(Box::pin(async move {
        *slot = Some(work().await?);
        Ok(())
    }))
    .await?;
    output.ok_or_else(|| Error::internal("unit of work committed without producing a value"))
}

/// Pass-through unit of work for service tests backed by mocks.
///
/// Counts how many units of work were started so tests can assert that a
/// flow ran inside one.
#[derive(Debug, Default)]
pub struct FixtureUnitOfWork {
    runs: AtomicUsize,
}

impl FixtureUnitOfWork {
    /// Number of units of work started so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for FixtureUnitOfWork {
    async fn run<'w>(&self, work: UnitOfWorkFuture<'w>) -> Result<(), Error> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        work.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn in_transaction_returns_the_work_value() {
        let uow = FixtureUnitOfWork::default();
        let value = in_transaction(&uow, || async { Ok::<_, Error>("done") })
            .await
            .expect("work succeeds");
        assert_eq!(value, "done");
        assert_eq!(uow.runs(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn in_transaction_propagates_work_errors_unchanged() {
        let uow = FixtureUnitOfWork::default();
        let err = in_transaction(&uow, || async {
            Err::<(), _>(Error::conflict("taken"))
        })
        .await
        .expect_err("work fails");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "taken");
    }

    struct SkippingUnitOfWork;

    #[async_trait]
    impl UnitOfWork for SkippingUnitOfWork {
        async fn run<'w>(&self, work: UnitOfWorkFuture<'w>) -> Result<(), Error> {
            drop(work);
            Ok(())
        }
    }

    #[rstest]
    #[tokio::test]
    async fn in_transaction_reports_missing_value_as_internal() {
        let err = in_transaction(&SkippingUnitOfWork, || async { Ok::<_, Error>(1) })
            .await
            .expect_err("value never produced");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
