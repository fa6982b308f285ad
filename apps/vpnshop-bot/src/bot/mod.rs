use teloxide::types::{MenuButton, Update, WebAppInfo};
use teloxide::{dptree, error_handlers::LoggingErrorHandler, prelude::*};
use tracing::{error, info, warn};

pub mod handlers;
pub mod keyboards;

const MINI_APP_BUTTON: &str = "🛍️ فروشگاه";

pub async fn run_bot(
    bot: Bot,
    mut shutdown_signal: tokio::sync::broadcast::Receiver<()>,
    state: crate::AppState,
) {
    info!("Starting bot dispatcher...");

    std::panic::set_hook(Box::new(|info| {
        error!("Bot panic: {}", info);
    }));

    match bot.get_me().await {
        Ok(me) => {
            info!(
                "Bot connected as @{}",
                me.username.clone().unwrap_or_else(|| "unknown".into())
            );
        }
        Err(e) => {
            error!("Bot failed to connect to Telegram: {}", e);
            return;
        }
    }

    if let Some(url) = &state.mini_app_url {
        match reqwest::Url::parse(url) {
            Ok(url) => {
                let button = MenuButton::WebApp {
                    text: MINI_APP_BUTTON.to_string(),
                    web_app: WebAppInfo { url },
                };
                if let Err(e) = bot.set_chat_menu_button().menu_button(button).await {
                    warn!("Failed to set the mini-app menu button: {}", e);
                }
            }
            Err(e) => warn!("Ignoring invalid MINI_APP_URL: {}", e),
        }
    }

    let message_handler = Update::filter_message().endpoint(handlers::command::message_handler);
    let callback_handler =
        Update::filter_callback_query().endpoint(handlers::callback::callback_handler);

    let mut dispatcher = Dispatcher::builder(
        bot,
        dptree::entry()
            .branch(message_handler)
            .branch(callback_handler),
    )
    .dependencies(dptree::deps![state])
    .default_handler(|upd: std::sync::Arc<Update>| async move {
        tracing::debug!("Unhandled update: {:?}", upd.kind);
    })
    .error_handler(LoggingErrorHandler::with_custom_text(
        "An error has occurred in the dispatcher",
    ))
    .build();

    tokio::select! {
        _ = dispatcher.dispatch() => {
            info!("Bot dispatcher exited");
        }
        _ = shutdown_signal.recv() => {
            info!("Bot received shutdown signal, stopping...");
        }
    }
}
