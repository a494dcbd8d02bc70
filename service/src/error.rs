use std::{io, path::PathBuf, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    dtos::ErrorDto,
    error::ValidationError,
    util::consts::{BUSY_MESSAGE, CONVERSION_FAILED_MESSAGE, NOT_FOUND_MESSAGE},
};
use thiserror::Error;
use tracing::{error, warn};

/// Everything that can go wrong between receiving an upload and storing its result.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("could not start converter '{program}': {source}")]
    Spawn { program: String, source: io::Error },
    #[error("converter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("converter did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("converted file not found at {}", .0.display())]
    MissingOutput(PathBuf),
    #[error("conversion queue is full")]
    Busy,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a request, rendered as `{ "error": "..." }` with a fixed message.
/// The detailed cause only reaches the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("file not found")]
    NotFound,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conversion(ConversionError::Busy) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::Conversion(ConversionError::Busy) => BUSY_MESSAGE.to_string(),
            ApiError::Conversion(_) => CONVERSION_FAILED_MESSAGE.to_string(),
            ApiError::NotFound => NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

impl From<io::Error> for ApiError {
    fn from(err: io::Error) -> Self {
        ApiError::Conversion(ConversionError::Io(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }
        (status, Json(ErrorDto::new(self.client_message()))).into_response()
    }
}
