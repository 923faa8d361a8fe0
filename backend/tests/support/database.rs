//! Temporary databases on the shared embedded cluster.
//!
//! Each call gets its own database with `sql/schema.sql` applied. Schema
//! setup uses the synchronous `postgres` client, so call these helpers
//! outside any async runtime.

use std::time::Duration;

use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::{Client, NoTls};
use social_backend::outbound::persistence::DbPool;

use super::format_postgres_error;

const SCHEMA: &str = include_str!("../../sql/schema.sql");
const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Create an empty database with the application schema.
pub fn fresh_database() -> Result<TemporaryDatabase, String> {
    let mut attempt = 1;
    let cluster = loop {
        match shared_cluster_handle() {
            Ok(cluster) => break cluster,
            Err(err) if attempt < CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{CLUSTER_RETRIES} failed: {err:?}");
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(err) => return Err(format!("shared cluster: {err:?}")),
        }
    };
    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;

    let mut client = Client::connect(database.url(), NoTls)
        .map_err(|err| format!("connect: {}", format_postgres_error(&err)))?;
    client
        .batch_execute(SCHEMA)
        .map_err(|err| format!("apply schema: {}", format_postgres_error(&err)))?;
    Ok(database)
}

/// Count rows in `table` on a connection outside any request context.
pub async fn count_rows(pool: &DbPool, table: &str) -> i64 {
    let mut conn = pool.checkout().await.expect("checkout connection");
    let row: CountRow = sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
        .get_result(&mut *conn)
        .await
        .expect("count query");
    row.count
}
