//! Shared helpers for integration suites that need PostgreSQL.
//!
//! Each file under `tests/` compiles as its own crate, so suites pull these
//! helpers in with `mod support;`.

pub mod embedded_postgres;

pub use embedded_postgres::{MigratedDatabase, migrated_database};

/// Whether `SKIP_TEST_CLUSTER` asks suites to skip when PostgreSQL is
/// unavailable. Accepts "1", "true" and "yes" in any case.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a cluster setup failure: skip when allowed, otherwise panic so CI
/// breakage stays visible.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Render a `postgres` error with its SQLSTATE and detail.
///
/// `postgres::Error`'s `Display` often collapses to `db error`, which hides
/// the constraint that actually failed.
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
    summary
}
