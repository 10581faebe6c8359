use async_trait::async_trait;
use papersmith_core::{OcrError, TextExtractor};

use crate::FileKind;

/// UTF-8, falling back to Latin-1 (every byte maps to one code point).
pub fn decode_text(content: &[u8]) -> String {
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => content.iter().map(|&byte| byte as char).collect(),
    }
}

/// Extractor for plain-text uploads only; everything else is unsupported.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, content: &[u8], file_type: &str) -> Result<String, OcrError> {
        match FileKind::detect(file_type)? {
            FileKind::PlainText => {
                let text = decode_text(content);
                if text.trim().is_empty() {
                    return Err(OcrError::EmptyOutput);
                }
                Ok(text)
            }
            _ => Err(OcrError::UnsupportedFileType(file_type.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_falls_back_to_latin1() {
        assert_eq!(decode_text("héllo".as_bytes()), "héllo");
        assert_eq!(decode_text(&[0x63, 0x61, 0x66, 0xe9]), "café");
    }
}
