use std::sync::Arc;

use async_trait::async_trait;

use crate::OcrError;

/// Extracts text (markdown-flavoured, page-delimited) from raw file bytes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, content: &[u8], file_type: &str) -> Result<String, OcrError>;
}

#[async_trait]
impl<T> TextExtractor for Arc<T>
where
    T: TextExtractor + ?Sized,
{
    async fn extract(&self, content: &[u8], file_type: &str) -> Result<String, OcrError> {
        (**self).extract(content, file_type).await
    }
}
