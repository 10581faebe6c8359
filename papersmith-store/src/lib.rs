mod chunks;
pub mod error;
mod fs_blob;
pub mod migrations;
mod records;
pub mod schema;
mod sqlite;

pub use error::StoreBackendError;
pub use fs_blob::FsBlobStore;
pub use sqlite::{SqliteStore, SqliteStoreBuilder};
