//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so each suite pulls this
//! module in with `mod support;`.

#![allow(dead_code)]

mod cluster_skip;
pub mod database;

pub use cluster_skip::handle_cluster_setup_failure;
pub use database::{count_rows, fresh_database};

/// Render a `postgres` error with SQLSTATE and detail.
///
/// `postgres::Error`'s `Display` collapses database errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}
