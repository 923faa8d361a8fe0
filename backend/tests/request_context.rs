//! Request-scoped transactional context against embedded PostgreSQL.
//!
//! Each test runs repositories through `DieselUnitOfWork` inside a fresh
//! `DbContext`, the same way the HTTP middleware wires a request.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use social_backend::domain::ports::{
    AddressRepository, CityPersistenceError, CityRepository, UnitOfWork, UserPersistenceError,
    UserRepository, in_transaction,
};
use social_backend::domain::{
    Address, AddressId, Email, Error, ErrorCode, NewUser, Password, PasswordDigest, Role, UserId,
    Username,
};
use social_backend::outbound::persistence::{
    DbContext, DbPool, DieselAddressRepository, DieselCityRepository, DieselUnitOfWork,
    DieselUserRepository, PoolConfig,
};
use tokio::runtime::Runtime;

mod support;

use support::{count_rows, fresh_database, handle_cluster_setup_failure};

struct Harness {
    runtime: Runtime,
    pool: DbPool,
    _database: TemporaryDatabase,
}

impl Harness {
    /// Run `fut` inside a fresh request context.
    fn run<F: std::future::Future>(&self, fut: F) -> F::Output {
        let ctx = Arc::new(DbContext::new(self.pool.clone()));
        self.runtime.block_on(ctx.scope(fut))
    }

    fn count(&self, table: &str) -> i64 {
        self.runtime.block_on(count_rows(&self.pool, table))
    }
}

#[fixture]
fn harness() -> Option<Harness> {
    let database = match fresh_database() {
        Ok(database) => database,
        Err(reason) => return handle_cluster_setup_failure(reason),
    };
    let runtime = Runtime::new().expect("tokio runtime");
    let config = PoolConfig::new(database.url())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime.block_on(DbPool::new(config)).expect("pool");
    Some(Harness {
        runtime,
        pool,
        _database: database,
    })
}

fn new_user(email: &str, address_id: Option<AddressId>) -> NewUser {
    let email = Email::new(email).expect("email");
    NewUser {
        id: UserId::random(),
        username: Username::new("ada").expect("username"),
        password_digest: PasswordDigest::derive(email.as_ref(), &Password::new("pw")),
        email,
        age: None,
        address_id,
        role: Role::Normal,
    }
}

fn names(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|name| (*name).to_owned()).collect()
}

#[rstest]
fn committed_work_is_visible_afterwards(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let uow = DieselUnitOfWork::new();
    let cities = DieselCityRepository::new();

    let added = harness
        .run(in_transaction(&uow, || async {
            Ok(cities.insert_missing(&names(&["Taipei", "Tainan"])).await?)
        }))
        .expect("commit");

    assert_eq!(added, 2);
    assert_eq!(harness.count("cities"), 2);
}

#[rstest]
fn failure_rolls_back_writes_from_every_repository(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let uow = DieselUnitOfWork::new();
    let cities = DieselCityRepository::new();
    let addresses = DieselAddressRepository::new();
    let users = DieselUserRepository::new();

    harness
        .run(users.create(&new_user("taken@example.com", None)))
        .expect("existing account");

    let err = harness
        .run(in_transaction(&uow, || async {
            cities.insert_missing(&names(&["Taichung"])).await?;
            let city = cities.list_all().await?.remove(0);
            let address = Address {
                id: AddressId::random(),
                city_id: city.id,
                street: "1 Main St".to_owned(),
            };
            addresses.create(&address).await?;
            users
                .create(&new_user("taken@example.com", Some(address.id)))
                .await?;
            Ok(())
        }))
        .expect_err("duplicate email aborts the unit");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(harness.count("cities"), 0);
    assert_eq!(harness.count("addresses"), 0);
    assert_eq!(harness.count("users"), 1);
}

#[rstest]
fn nested_failure_keeps_the_outer_writes(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let uow = DieselUnitOfWork::new();
    let cities = DieselCityRepository::new();

    harness
        .run(in_transaction(&uow, || async {
            cities.insert_missing(&names(&["Kaohsiung"])).await?;
            let inner = in_transaction(&uow, || async {
                cities.insert_missing(&names(&["Hsinchu"])).await?;
                Err::<(), _>(Error::conflict("inner step refused"))
            })
            .await;
            assert_eq!(inner.expect_err("inner fails").code(), ErrorCode::Conflict);
            cities.insert_missing(&names(&["Keelung"])).await?;
            Ok(())
        }))
        .expect("outer commits");

    let stored = harness
        .run(cities.list_all())
        .expect("list cities")
        .into_iter()
        .map(|city| city.name)
        .collect::<Vec<_>>();
    assert_eq!(stored.len(), 2);
    assert!(stored.contains(&"Kaohsiung".to_owned()));
    assert!(stored.contains(&"Keelung".to_owned()));
}

#[rstest]
fn nested_success_commits_with_the_outer_unit(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let uow = DieselUnitOfWork::new();
    let cities = DieselCityRepository::new();

    let err = harness
        .run(in_transaction(&uow, || async {
            in_transaction(&uow, || async {
                Ok(cities.insert_missing(&names(&["Yilan"])).await?)
            })
            .await?;
            Err::<(), _>(Error::internal("outer step failed"))
        }))
        .expect_err("outer fails");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(harness.count("cities"), 0);
}

#[rstest]
fn panicking_work_is_rolled_back(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let uow = DieselUnitOfWork::new();
    let cities = DieselCityRepository::new();

    let outcome = harness.run(
        AssertUnwindSafe(uow.run(Box::pin(async {
            let written = cities.insert_missing(&names(&["Hualien"])).await?;
            if written > 0 {
                panic!("work panicked after writing {written} rows");
            }
            Ok::<(), Error>(())
        })))
        .catch_unwind(),
    );

    assert!(outcome.is_err());
    assert_eq!(harness.count("cities"), 0);
}

#[rstest]
fn concurrent_contexts_do_not_share_transactions(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let (written_tx, written_rx) = oneshot::channel::<()>();
    let (observed_tx, observed_rx) = oneshot::channel::<()>();

    let writer_ctx = Arc::new(DbContext::new(harness.pool.clone()));
    let reader_ctx = Arc::new(DbContext::new(harness.pool.clone()));

    let writer = writer_ctx.clone().scope(async {
        let uow = DieselUnitOfWork::new();
        let cities = DieselCityRepository::new();
        in_transaction(&uow, || async {
            cities.insert_missing(&names(&["Taitung"])).await?;
            assert!(DbContext::current()?.active().is_transaction());
            let _ = written_tx.send(());
            let _ = observed_rx.await;
            Ok(())
        })
        .await
    });

    let reader = reader_ctx.clone().scope(async {
        let _ = written_rx.await;
        let ctx = DbContext::current().expect("reader context");
        assert!(!ctx.active().is_transaction());
        let seen = DieselCityRepository::new().list_all().await;
        let _ = observed_tx.send(());
        seen
    });

    let (written, seen) = harness.runtime.block_on(async { tokio::join!(writer, reader) });

    written.expect("writer commits");
    assert!(seen.expect("reader lists").is_empty());
    assert_ne!(writer_ctx.active().id(), reader_ctx.active().id());
    assert!(!writer_ctx.active().is_transaction());
    assert_eq!(harness.count("cities"), 1);
}

#[rstest]
fn ambient_reads_see_committed_rows(harness: Option<Harness>) {
    let Some(harness) = harness else { return };
    let users = DieselUserRepository::new();
    let created = harness
        .run(users.create(&new_user("ada@example.com", None)))
        .expect("create user");

    let found = harness
        .run(users.find_by_email(&Email::new("ada@example.com").expect("email")))
        .expect("lookup")
        .expect("user exists");
    assert_eq!(found.id, created.id);

    let err = harness
        .run(users.create(&new_user("ada@example.com", None)))
        .expect_err("duplicate email");
    assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
}

#[rstest]
#[tokio::test]
async fn repositories_refuse_to_run_outside_a_context() {
    let err = DieselCityRepository::new()
        .list_all()
        .await
        .expect_err("no context installed");
    assert!(matches!(err, CityPersistenceError::Query { .. }));

    let err = DieselUnitOfWork::new()
        .run(Box::pin(async { Ok(()) }))
        .await
        .expect_err("no context installed");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
