use std::{path::Path, str::FromStr};

use mime::Mime;

use crate::models::DocumentFormat;

pub fn get_content_type(mime_type: Option<&str>, filename: &str) -> Mime {
    if let Some(mime_type) = mime_type {
        if let Ok(content_type) = Mime::from_str(mime_type) {
            return content_type;
        }
    }
    if let Some(extension) = Path::new(filename).extension() {
        if let Some(extension) = extension.to_str() {
            return match DocumentFormat::from_extension(extension) {
                Some(format) => format.mime_type(),
                None => mime::APPLICATION_OCTET_STREAM,
            };
        }
    }
    mime::APPLICATION_OCTET_STREAM
}
