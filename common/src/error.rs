use thiserror::Error;

use crate::util::consts::{INVALID_TYPE_MESSAGE, NO_FILE_MESSAGE, TOO_LARGE_MESSAGE};

/// Reasons an upload is refused before any conversion is attempted.
///
/// `Display` yields the short message shown to the user, so it is safe to put
/// straight into an error body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", NO_FILE_MESSAGE)]
    MissingFile,
    #[error("{}", INVALID_TYPE_MESSAGE)]
    UnsupportedType { file_name: String },
    #[error("{}", INVALID_TYPE_MESSAGE)]
    DeclaredTypeMismatch { declared: String },
    #[error("{}", TOO_LARGE_MESSAGE)]
    TooLarge { size: u64, max_size: u64 },
}
