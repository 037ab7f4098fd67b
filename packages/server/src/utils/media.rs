use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::storage::{FileStore, StoredFile};

use crate::error::AppError;

/// Kinds of user uploads, each with its own namespace and accepted extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Logo,
}

impl UploadKind {
    pub fn namespace(self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Logo => "logos",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::Resume => &["pdf", "doc", "docx"],
            UploadKind::Logo => &["png", "jpg", "jpeg", "webp"],
        }
    }
}

/// Absolute URL for a stored file key.
pub fn media_url(public_url: &str, key: &str) -> String {
    format!("{}/api/v1/media/{}", public_url.trim_end_matches('/'), key)
}

pub fn optional_media_url(public_url: &str, key: Option<&str>) -> Option<String> {
    key.map(|k| media_url(public_url, k))
}

/// Reject names that could smuggle paths or header-breaking characters.
fn check_upload_filename(filename: &str) -> Result<&str, AppError> {
    let trimmed = filename.trim();
    let reason = if trimmed.is_empty() {
        Some("Filename cannot be empty")
    } else if trimmed.chars().any(|c| c.is_ascii_control()) {
        Some("Invalid filename: control characters are not allowed")
    } else if trimmed.contains('/') || trimmed.contains('\\') {
        Some("Invalid filename: path separators are not allowed")
    } else if trimmed.starts_with('.') {
        Some("Invalid filename: hidden files are not allowed")
    } else {
        None
    };
    match reason {
        Some(msg) => Err(AppError::Validation(msg.into())),
        None => Ok(trimmed),
    }
}

/// Lowercased extension of an upload, checked against the kind's allow-list.
pub fn upload_extension(kind: UploadKind, filename: &str) -> Result<String, AppError> {
    let filename = check_upload_filename(filename)?;
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if kind.allowed_extensions().contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "Unsupported file type; allowed: {}",
            kind.allowed_extensions().join(", ")
        )))
    }
}

async fn read_field(mut field: Field<'_>, max_size: u64) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Read the `file` field of a multipart upload and persist it.
pub async fn store_upload(
    multipart: &mut Multipart,
    kind: UploadKind,
    files: &dyn FileStore,
    max_size: u64,
) -> Result<StoredFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let ext = upload_extension(kind, &filename)?;
        let data = read_field(field, max_size).await?;
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".into()));
        }
        return Ok(files.save(kind.namespace(), &ext, &data).await?);
    }
    Err(AppError::Validation("Missing 'file' field".into()))
}
