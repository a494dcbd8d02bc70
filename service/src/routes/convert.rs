use axum::extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use common::{
    dtos::ConvertResponseDto,
    error::ValidationError,
    models::ConversionDirection,
    util::routes::{absolute_url, convert_route, upload_route},
    validation::derive_download_name,
};
use tracing::{info, warn};

use crate::{
    convert::output_path,
    error::ApiError,
    persistence::tempfiles::ScopedTempFile,
    state::Services,
    upload::receive_upload,
};

pub fn create_route(services: Services) -> Router {
    let body_limit = services.settings.body_limit();
    Router::new()
        .route(convert_route(), post(convert_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(services)
}

#[tracing::instrument(skip(services, multipart))]
pub async fn convert_file(State(services): State<Services>, multipart: Result<Multipart, MultipartRejection>) -> Result<Json<ConvertResponseDto>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Not a multipart upload: {}", rejection);
        ValidationError::MissingFile
    })?;
    let upload = receive_upload(&mut multipart, &services.temp_files, services.settings.max_file_size).await?;

    let direction = ConversionDirection::from_source(upload.format);
    // removes a partial output if the converter fails after writing
    let _expected_output = ScopedTempFile::new(output_path(upload.file.path(), direction));
    let converted = ScopedTempFile::new(services.conversion_pool.convert(upload.file.path(), direction).await?);

    let download_name = derive_download_name(Some(&upload.file_name));
    let stored = services.result_storage.store(converted.path(), direction.target(), &download_name).await?;
    let download_url = absolute_url(&services.settings.public_base_url, &upload_route(&stored.id));
    info!("Converted {} ({} bytes, {}) to {}", &upload.file_name, upload.size, direction, &download_url);

    Ok(Json(ConvertResponseDto {
        download_url,
        file_name: Some(stored.file_name),
        expires_at: Some(stored.expires_at),
    }))
}
