//! Shared helpers for Diesel repository implementations.
//!
//! Both repositories expose `Connection` and `Query` variants on their port
//! errors; [`RepositoryFailure`] lets pool and Diesel errors map onto either
//! without duplicating the classification rules.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{OrderRepositoryError, ProductRepositoryError};

use super::pool::PoolError;

/// Port errors that distinguish unreachable storage from failed statements.
pub(crate) trait RepositoryFailure: Sized {
    /// Storage could not be reached.
    fn unreachable(message: String) -> Self;
    /// A statement failed or returned unusable data.
    fn failed(message: String) -> Self;

    /// See [`map_pool_error`].
    fn from_pool(error: PoolError) -> Self {
        map_pool_error(error)
    }

    /// See [`map_diesel_error`].
    fn from_diesel(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}

impl RepositoryFailure for ProductRepositoryError {
    fn unreachable(message: String) -> Self {
        Self::connection(message)
    }

    fn failed(message: String) -> Self {
        Self::query(message)
    }
}

impl RepositoryFailure for OrderRepositoryError {
    fn unreachable(message: String) -> Self {
        Self::connection(message)
    }

    fn failed(message: String) -> Self {
        Self::query(message)
    }
}

/// Map pool errors to the port's connection variant.
pub(crate) fn map_pool_error<E: RepositoryFailure>(error: PoolError) -> E {
    E::unreachable(error.into_message())
}

/// Map Diesel errors to port errors, logging the raw cause at debug.
pub(crate) fn map_diesel_error<E: RepositoryFailure>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => E::failed("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::unreachable("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => E::failed(format!(
            "check constraint violated: {}",
            info.constraint_name().unwrap_or("unknown")
        )),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            E::failed("foreign key violation".to_owned())
        }
        _ => E::failed("database error".to_owned()),
    }
}

/// Convert a domain quantity to the `INTEGER` column type.
pub(crate) fn quantity_for_db(quantity: u32) -> Result<i32, String> {
    i32::try_from(quantity).map_err(|_| format!("quantity {quantity} exceeds column range"))
}

/// Collect row conversion results, mapping the first error to a query failure.
pub(crate) fn collect_rows<T, E: RepositoryFailure>(
    results: impl Iterator<Item = Result<T, String>>,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(E::failed)
}

#[cfg(test)]
mod tests {
    //! Error classification coverage.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let err: OrderRepositoryError = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, OrderRepositoryError::connection("timed out"));
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        let err: ProductRepositoryError = map_diesel_error(DieselError::NotFound);
        assert_eq!(err, ProductRepositoryError::query("record not found"));
    }

    #[rstest]
    fn rollback_without_cause_is_a_query_failure() {
        let err: OrderRepositoryError = map_diesel_error(DieselError::RollbackTransaction);
        assert!(matches!(err, OrderRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case(0, Ok(0))]
    #[case(7, Ok(7))]
    fn small_quantities_fit(#[case] quantity: u32, #[case] expected: Result<i32, String>) {
        assert_eq!(quantity_for_db(quantity), expected);
    }

    #[rstest]
    fn oversized_quantities_are_rejected() {
        assert!(quantity_for_db(u32::MAX).is_err());
    }

    #[rstest]
    fn collect_rows_surfaces_first_error() {
        let rows = vec![Ok(1), Err("bad row".to_owned()), Err("later".to_owned())];
        let err = collect_rows::<i32, ProductRepositoryError>(rows.into_iter())
            .expect_err("conversion fails");
        assert_eq!(err, ProductRepositoryError::query("bad row"));
    }
}
