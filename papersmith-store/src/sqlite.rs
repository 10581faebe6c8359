use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::error::StoreBackendError;
use crate::migrations::run_migrations;

/// SQLite-backed documents, chunks, papers and subjects.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct SqliteStoreBuilder {
    database_url: String,
    max_connections: u32,
}

impl SqliteStore {
    pub fn builder(database_url: impl Into<String>) -> SqliteStoreBuilder {
        SqliteStoreBuilder {
            database_url: database_url.into(),
            max_connections: 1,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SqliteStoreBuilder {
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub async fn build(self) -> Result<SqliteStore, StoreBackendError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await
            .map_err(StoreBackendError::Connection)?;

        run_migrations(&pool).await?;

        Ok(SqliteStore { pool })
    }
}

// Fixed-width UTC timestamps so lexical order is chronological order.
pub(crate) fn encode_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(value: &str) -> Result<DateTime<Utc>, StoreBackendError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| StoreBackendError::Timestamp(value.to_string()))
}

pub(crate) fn encode_json<T: Serialize>(
    column: &'static str,
    value: &T,
) -> Result<String, StoreBackendError> {
    serde_json::to_string(value).map_err(|source| StoreBackendError::Json { column, source })
}

pub(crate) fn decode_json<T: DeserializeOwned>(
    column: &'static str,
    value: &str,
) -> Result<T, StoreBackendError> {
    serde_json::from_str(value).map_err(|source| StoreBackendError::Json { column, source })
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
