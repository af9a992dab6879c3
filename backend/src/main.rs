use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod routes;
mod service;
mod store;

use crate::config::Config;
use crate::service::Service;
use crate::store::RedisStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let store = RedisStore::open(&config.redis_url)?;
    let service = Arc::new(Service::new(Arc::new(store)));
    let app = routes::app(service, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        redis = %config.redis_url,
        static_dir = %config.static_dir.display(),
        "server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
