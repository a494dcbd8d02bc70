use axum::extract::Multipart;
use common::{
    error::ValidationError,
    models::DocumentFormat,
    util::consts::UPLOAD_FIELD,
    validation::{validate_declared_type, validate_size, validate_upload},
};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{info, warn};

use crate::{
    error::ApiError,
    persistence::tempfiles::{ScopedTempFile, TempFileProvider},
};

/// One received upload. The bytes on disk go away together with this value.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub format: DocumentFormat,
    pub file: ScopedTempFile,
}

/// Streams the `file` field to a fresh temp file, validating name, declared
/// type and size on the way. Other fields are skipped. No temp file is created
/// unless a `file` field with a valid name shows up.
pub async fn receive_upload(multipart: &mut Multipart, temp_files: &TempFileProvider, max_size: u64) -> Result<UploadedFile, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(|err| {
        warn!("Could not read multipart body: {}", err);
        ValidationError::MissingFile
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // browsers send `filename=""` when nothing was chosen
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(ValidationError::MissingFile)?;
        let content_type = field.content_type().map(str::to_string);
        let format = validate_upload(&file_name, 0, max_size)?;
        validate_declared_type(format, content_type.as_deref())?;

        let file = temp_files.scoped(format.extension());
        let mut target = File::create(file.path()).await?;
        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|err| {
            warn!("Upload of {} interrupted: {}", &file_name, err);
            ValidationError::MissingFile
        })? {
            size += chunk.len() as u64;
            validate_size(size, max_size)?;
            target.write_all(&chunk).await?;
        }
        target.flush().await?;
        info!("Received {} ({} bytes) as {}", &file_name, size, file.path().display());

        return Ok(UploadedFile {
            file_name,
            size,
            content_type,
            format,
            file,
        });
    }
    Err(ValidationError::MissingFile.into())
}
