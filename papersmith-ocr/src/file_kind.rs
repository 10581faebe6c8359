use papersmith_core::OcrError;

/// How an uploaded file is turned into text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// Decoded locally.
    PlainText,
    /// Sent to OCR as an image; pages are joined with blank lines.
    Image { mime: &'static str },
    /// Sent to OCR as a document; pages are labelled `--- Page N ---`.
    Document { mime: &'static str },
}

impl FileKind {
    /// Classifies a file-type hint such as `"PDF"`, `".docx"` or `"jpg"`.
    pub fn detect(file_type: &str) -> Result<Self, OcrError> {
        let normalized = file_type.trim().to_lowercase().replace('.', "");
        let kind = match normalized.as_str() {
            "txt" => FileKind::PlainText,
            "png" => FileKind::Image { mime: "image/png" },
            "jpg" | "jpeg" => FileKind::Image { mime: "image/jpeg" },
            "webp" => FileKind::Image { mime: "image/webp" },
            "gif" => FileKind::Image { mime: "image/gif" },
            "pdf" => FileKind::Document {
                mime: "application/pdf",
            },
            "docx" => FileKind::Document {
                mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            },
            "doc" => FileKind::Document {
                mime: "application/msword",
            },
            "pptx" => FileKind::Document {
                mime: "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            },
            "ppt" => FileKind::Document {
                mime: "application/vnd.ms-powerpoint",
            },
            _ => return Err(OcrError::UnsupportedFileType(normalized)),
        };
        Ok(kind)
    }
}
