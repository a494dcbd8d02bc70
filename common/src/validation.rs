//! Upload policy shared by the client and the service.
//!
//! The client checks before sending and the service checks again on receipt,
//! both through [`validate_upload`].

use crate::{
    error::ValidationError,
    models::DocumentFormat,
    util::consts::DEFAULT_DOWNLOAD_NAME,
};

/// Extension first, then size. Returns the format the upload will be converted from.
pub fn validate_upload(file_name: &str, size: u64, max_size: u64) -> Result<DocumentFormat, ValidationError> {
    let format = DocumentFormat::from_file_name(file_name).ok_or_else(|| ValidationError::UnsupportedType {
        file_name: file_name.to_string(),
    })?;
    validate_size(size, max_size)?;
    Ok(format)
}

pub fn validate_size(size: u64, max_size: u64) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError::TooLarge { size, max_size });
    }
    Ok(())
}

/// A missing declaration or a generic octet stream is accepted; anything else
/// has to name the same format as the extension.
pub fn declared_type_matches(format: DocumentFormat, content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.is_empty()
        || essence.eq_ignore_ascii_case(mime::APPLICATION_OCTET_STREAM.essence_str())
        || essence.eq_ignore_ascii_case(format.mime_type().essence_str())
}

pub fn validate_declared_type(format: DocumentFormat, content_type: Option<&str>) -> Result<(), ValidationError> {
    if declared_type_matches(format, content_type) {
        Ok(())
    } else {
        Err(ValidationError::DeclaredTypeMismatch {
            declared: content_type.unwrap_or_default().to_string(),
        })
    }
}

/// Name the browser should save the converted file under.
pub fn derive_download_name(file_name: Option<&str>) -> String {
    let Some(file_name) = file_name else {
        return DEFAULT_DOWNLOAD_NAME.to_string();
    };
    match file_name.rsplit_once('.') {
        Some((stem, extension)) => match DocumentFormat::from_extension(extension) {
            Some(format) => format!("{}.{}", stem, format.opposite().extension()),
            None => file_name.to_string(),
        },
        None => file_name.to_string(),
    }
}
