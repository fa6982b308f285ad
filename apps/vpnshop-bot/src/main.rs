use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vpnshop_db::{db, PgStore, Storefront};

mod bot;
mod config;
mod messages;
mod panel_client;
mod router;
mod scene;
mod state;

use crate::config::BotConfig;
use crate::panel_client::XuiPanelClient;
use crate::router::CommandRouter;
use crate::scene::{
    MemorySessionStore, RedisSessionStore, SceneCommitter, SceneEngine, SceneRegistry,
    SessionStore,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vpnshop_bot=info,teloxide=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VPN shop bot...");

    let config = BotConfig::from_env()?;
    if config.admins.is_empty() {
        tracing::warn!("ADMIN_IDS is empty; admin flows are disabled");
    }

    let pool = db::init_db(&config.database_url).await?;
    let store: Arc<dyn Storefront> = Arc::new(PgStore::new(pool));

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Keeping scene sessions in Redis");
            Arc::new(RedisSessionStore::connect(url, config.session_ttl_secs).await?)
        }
        None => {
            tracing::info!("Keeping scene sessions in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let verifier = Arc::new(XuiPanelClient::new(
        config.panel_login_timeout,
        &config.panel_session_cookie,
    )?);

    let engine = SceneEngine::new(
        Arc::new(SceneRegistry::standard()?),
        sessions,
        SceneCommitter::new(store.clone(), verifier),
        config.admins.clone(),
    );
    let router = CommandRouter::new(engine, store, config.admins.clone());

    let state = AppState {
        router: Arc::new(router),
        mini_app_url: config.mini_app_url.clone(),
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    let bot = Bot::new(config.bot_token);
    bot::run_bot(bot, shutdown_rx, state).await;

    Ok(())
}
