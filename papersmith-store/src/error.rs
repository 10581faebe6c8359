use papersmith_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreBackendError {
    #[error("failed to connect: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to encode column '{column}': {source}")]
    Json {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid timestamp '{0}'")]
    Timestamp(String),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreBackendError> for StoreError {
    fn from(error: StoreBackendError) -> Self {
        StoreError::Internal(Box::new(error))
    }
}

pub(crate) fn query_error(error: sqlx::Error) -> StoreError {
    StoreBackendError::Query(error).into()
}
