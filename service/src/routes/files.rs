use axum::{
    body::StreamBody,
    extract::{Path, State},
    http::header,
    response::{AppendHeaders, IntoResponse},
    routing::get,
    Router,
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::{error::ApiError, state::Services};

pub fn create_route(services: Services) -> Router {
    Router::new().route("/uploads/:filename", get(file)).with_state(services)
}

#[tracing::instrument(skip(services))]
pub async fn file(Path(filename): Path<String>, State(services): State<Services>) -> Result<impl IntoResponse, ApiError> {
    let stored = services.result_storage.get(&filename).await.ok_or(ApiError::NotFound)?;
    let file = File::open(&stored.path).await.map_err(|_| ApiError::NotFound)?;
    let body = StreamBody::new(ReaderStream::new(file));
    let headers = AppendHeaders([
        (header::CONTENT_TYPE, stored.mime_type.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&stored.file_name)),
    ]);
    Ok((headers, body))
}

/// Only printable ASCII survives, so the header value is always valid.
pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
