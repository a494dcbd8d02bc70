use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use common::dtos::{RootDto, RootLinks};
use common::util::consts::{LIVENESS_MESSAGE, NAME, VERSION};
use common::util::routes::convert_route;

pub fn create_route() -> Router {
    Router::new().route("/", get(root)).route("/api", get(root_links)).route("/health", get(health))
}

pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn root_links() -> Json<RootDto> {
    Json(RootDto {
        version: VERSION.to_string(),
        name: NAME.to_string(),
        _links: RootLinks {
            convert: convert_route().to_string(),
            health: "/health".to_string(),
        },
    })
}

#[tracing::instrument]
pub async fn health() -> StatusCode {
    StatusCode::OK
}
