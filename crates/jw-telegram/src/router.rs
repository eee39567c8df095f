use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use jw_core::{
    config::Config,
    conversation::SearchConversation,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
    ports::{AlertStore, UserRegistry},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub messenger: Arc<dyn MessagingPort>,
    pub conversation: Arc<SearchConversation>,
    pub users: Arc<dyn UserRegistry>,
    pub alerts: Arc<dyn AlertStore>,
}

/// Application services the Telegram layer dispatches into.
pub struct Services {
    pub conversation: Arc<SearchConversation>,
    pub users: Arc<dyn UserRegistry>,
    pub alerts: Arc<dyn AlertStore>,
}

/// Long-poll Telegram until the process is interrupted.
pub async fn run_polling(cfg: Arc<Config>, services: Services) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "telegram bot started"),
        Err(e) => tracing::warn!(error = %e, "could not fetch bot identity"),
    }

    // Throttle outbound calls; the adapter still retries once on RetryAfter.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let state = Arc::new(AppState {
        cfg,
        messenger,
        conversation: services.conversation,
        users: services.users,
        alerts: services.alerts,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("telegram polling stopped");
    Ok(())
}
