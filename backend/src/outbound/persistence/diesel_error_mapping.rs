//! Shared Diesel error classification for the repositories.
//!
//! Repositories first ask whether a failure is a constraint violation they
//! report with a dedicated variant, then fall back to
//! [`map_basic_diesel_error`] for connection and query failures.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Constraint violation reported by PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConstraintViolation {
    Unique { constraint: Option<String> },
    ForeignKey { constraint: Option<String> },
}

/// Inspect `error` for a unique or foreign key violation.
pub(crate) fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(ConstraintViolation::Unique {
                constraint: info.constraint_name().map(str::to_owned),
            })
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            Some(ConstraintViolation::ForeignKey {
                constraint: info.constraint_name().map(str::to_owned),
            })
        }
        _ => None,
    }
}

/// Map a Diesel error into a repository's `Query` or `Connection` variant.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: DieselError,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("foreign key constraint violated".to_owned())
        }
        _ => query("database error".to_owned()),
    }
}

/// Generate a `map_diesel_error` function for a port error with the standard
/// `query` and `connection` constructors.
macro_rules! basic_diesel_error_mapper {
    ($port:ty) => {
        fn map_diesel_error(error: ::diesel::result::Error) -> $port {
            $crate::outbound::persistence::diesel_error_mapping::map_basic_diesel_error(
                error,
                <$port>::query,
                <$port>::connection,
            )
        }
    };
}

pub(crate) use basic_diesel_error_mapper;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserPersistenceError;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new("constraint failed".to_owned()))
    }

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, true)]
    #[case(DatabaseErrorKind::ForeignKeyViolation, true)]
    #[case(DatabaseErrorKind::CheckViolation, false)]
    fn detects_constraint_violations(#[case] kind: DatabaseErrorKind, #[case] expected: bool) {
        assert_eq!(constraint_violation(&database_error(kind)).is_some(), expected);
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let err: UserPersistenceError = map_basic_diesel_error(
            database_error(DatabaseErrorKind::ClosedConnection),
            UserPersistenceError::query,
            UserPersistenceError::connection,
        );
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn missing_rows_map_to_query_errors() {
        let err: UserPersistenceError = map_basic_diesel_error(
            DieselError::NotFound,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        );
        assert_eq!(err, UserPersistenceError::query("record not found"));
    }
}
