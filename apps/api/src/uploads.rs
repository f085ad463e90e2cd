//! Multipart form helpers shared by the upload and search handlers.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

/// One multipart field, fully buffered.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl FormField {
    /// Field content as UTF-8 text.
    pub fn text(&self) -> Result<String, AppError> {
        String::from_utf8(self.bytes.to_vec())
            .map_err(|_| AppError::Validation(format!("Field '{}' is not valid UTF-8", self.name)))
    }

    /// True when the field is a file upload with some content.
    pub fn is_nonempty_file(&self) -> bool {
        self.file_name.as_deref().is_some_and(|n| !n.is_empty()) && !self.bytes.is_empty()
    }
}

/// Buffers every field of a multipart body.
pub async fn collect_fields(mut multipart: Multipart) -> Result<Vec<FormField>, AppError> {
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
        fields.push(FormField {
            name,
            file_name,
            bytes,
        });
    }
    Ok(fields)
}

/// Lowercased extension of a file name, without the dot.
pub fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Strips any directory components and characters that are unsafe in a
/// file name or a `Content-Disposition` header.
pub fn safe_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
