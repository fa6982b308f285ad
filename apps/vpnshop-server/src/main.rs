use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vpnshop_db::{db, PgStore, Storefront};
use vpnshop_shared::AdminSet;

mod config;
mod handlers;

use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storefront>,
    pub admins: AdminSet,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/plans", get(handlers::plans::list_plans))
        .route("/api/orders", post(handlers::orders::create_order))
        .route(
            "/api/payment/webhook",
            post(handlers::webhook::payment_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vpnshop_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!("VPN shop server starting...");

    let pool = db::init_db(&config.database_url).await?;
    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        admins: config.admins.clone(),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
