use thiserror::Error;

/// Errors surfaced by [`SQLStore`](crate::SQLStore) implementations.
#[derive(Error, Debug)]
pub enum SQLError {
    /// A SELECT failed to prepare or run.
    #[error("query error: {0}")]
    Query(String),

    /// A write statement or transaction failed.
    #[error("execution error: {0}")]
    Execution(String),

    /// The database could not be opened or configured.
    #[error("connection error: {0}")]
    Connection(String),
}
