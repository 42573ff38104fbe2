use thiserror::Error;

/// Synchronous relational executor capability consumed by the translator.
///
/// Implementations live outside this crate (a concrete driver, a test
/// double). The translator issues one call per outer statement; nested
/// subqueries are inlined into the statement text and never produce a
/// separate round trip. No retry or timeout policy exists at this layer.
pub trait SqlExecutor {
    /// Execute a compiled statement and read the leading identifier column
    /// of every row, in result order.
    fn execute_ids(&self, sql: &str) -> Result<Vec<i64>, ExecutorError>;

    /// Execute a compiled statement expected to produce a single scalar
    /// count.
    fn execute_count(&self, sql: &str) -> Result<i64, ExecutorError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecutorError {
    #[error("backend execution failed: {0}")]
    Backend(String),
}
