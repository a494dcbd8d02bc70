use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use service::persistence::results::spawn_sweeper;
use service::settings::ServiceSettings;
use service::state::ServiceCollection;
use tracing::info;

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt().json().finish();
    tracing::subscriber::set_global_default(subscriber).expect("Could not init tracing.");

    let settings = ServiceSettings::from_env();
    info!(
        "Using {} for uploads, {} parallel conversions, results kept {:?}",
        settings.upload_dir.display(),
        settings.parallelism,
        settings.max_age
    );
    let port = settings.port;
    let sweep_interval = settings.sweep_interval;

    let services = ServiceCollection::build(settings).await.expect("Could not prepare upload directories.");
    let sweeper = spawn_sweeper(services.result_storage.clone(), sweep_interval);
    let app = service::app(services);

    let addr = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
    info!("listening on {}", &addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed.");
    sweeper.abort();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
