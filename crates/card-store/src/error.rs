use thiserror::Error;

/// Errors that can occur when reading card status records.
#[derive(Debug, Error)]
pub enum CardStoreError {
    /// The store could not be reached or refused the login.
    #[error("Unable to connect to the MySQL server: {0}")]
    Connection(#[source] sqlx::Error),

    /// The status query failed or a row could not be decoded.
    #[error("Card status query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl CardStoreError {
    /// Short label used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CardStoreError::Connection(_) => "connection",
            CardStoreError::Query(_) => "query",
        }
    }
}

/// Result type for card store operations.
pub type Result<T> = std::result::Result<T, CardStoreError>;
