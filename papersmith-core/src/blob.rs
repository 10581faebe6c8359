use async_trait::async_trait;

use crate::StoreError;

/// Path-addressed byte storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, content: &[u8]) -> Result<(), StoreError>;
    async fn download(&self, path: &str) -> Result<Vec<u8>, StoreError>;
}

/// `"{owner}/{timestamp}_{file_name}"` with spaces and path separators in the
/// file name replaced, so two owners never share a path.
pub fn owner_scoped_path(owner: &str, file_name: &str, timestamp: i64) -> String {
    let safe_name: String = file_name
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let safe_name = if safe_name.is_empty() {
        "uploaded_file".to_string()
    } else {
        safe_name
    };
    format!("{owner}/{timestamp}_{safe_name}")
}
