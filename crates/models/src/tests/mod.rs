/// Database connection and configuration tests
pub mod db_tests;


/// Skip unless a database is reachable by configuration.
pub(crate) fn db_tests_disabled() -> bool {
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}
