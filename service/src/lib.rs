use axum::{error_handling::HandleErrorLayer, http::StatusCode, BoxError, Router};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::Services;

pub mod convert;
pub mod error;
pub mod persistence;
pub mod routes;
pub mod settings;
pub mod state;
pub mod upload;

pub fn app(services: Services) -> Router {
    let request_timeout = services.settings.request_timeout();
    Router::new()
        .merge(routes::root::create_route())
        .merge(routes::convert::create_route(services.clone()))
        .merge(routes::files::create_route(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(|_: BoxError| async { StatusCode::REQUEST_TIMEOUT }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
