mod error;
mod file_kind;
mod mistral;
mod plain_text;

pub use error::OcrProviderError;
pub use file_kind::FileKind;
pub use mistral::{MistralOcrBuilder, MistralOcrClient, MISTRAL_OCR_MODEL};
pub use plain_text::{decode_text, PlainTextExtractor};
