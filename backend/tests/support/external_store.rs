//! Opt-in access to an external MongoDB-compatible store.
//!
//! Suites that need a live server read `ORDER_TEST_MONGO_URI`. When it is
//! unset they print a skip marker and return early so local runs and CI
//! without a database stay green.

/// Connection string for the external store, or `None` after printing a
/// skip marker naming `suite`.
pub fn mongo_uri_or_skip(suite: &str) -> Option<String> {
    match std::env::var("ORDER_TEST_MONGO_URI") {
        Ok(uri) if !uri.trim().is_empty() => Some(uri),
        _ => {
            eprintln!("SKIP-TEST-MONGO: {suite} (set ORDER_TEST_MONGO_URI to run)");
            None
        }
    }
}
