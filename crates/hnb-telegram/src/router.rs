use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use teloxide::{
    dispatching::Dispatcher,
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks,
};
use tracing::{error, info, warn};
use url::Url;

use hnb_core::{
    browse::{Browser, BrowserConfig},
    config::Config,
    content::ContentSource,
    messaging::port::MessagingPort,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Path of the webhook endpoint under `PUBLIC_URL`.
pub const WEBHOOK_PATH: &str = "webhook";

#[derive(Clone)]
pub struct AppState {
    pub browser: Arc<Browser>,
    pub messenger: Arc<dyn MessagingPort>,
    /// Our `@username`, used to skip commands addressed to other bots.
    pub bot_username: Option<String>,
}

/// Start the bot: webhook delivery when `PUBLIC_URL` is set, long polling
/// otherwise. Both modes keep an HTTP listener with a liveness route.
pub async fn run(cfg: Arc<Config>, content: Arc<dyn ContentSource>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("hnb started: @{}", me.user.username.as_deref().unwrap_or("?"));
            me.user.username.clone()
        }
        Err(e) => {
            warn!("getMe failed, continuing: {e}");
            None
        }
    };

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let browser = Arc::new(Browser::new(
        content,
        messenger.clone(),
        BrowserConfig {
            safe_message_len: cfg.telegram_safe_limit,
            fetch_concurrency: cfg.fetch_concurrency,
        },
    ));
    let state = Arc::new(AppState {
        browser,
        messenger,
        bot_username,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build();

    match &cfg.public_url {
        Some(base) => {
            let url = webhook_url(base)?;
            info!(%url, addr = %cfg.listen_addr, "delivery mode: webhook");

            let (listener, stop_flag, webhook_router) =
                webhooks::axum_to_router(bot, webhooks::Options::new(cfg.listen_addr, url))
                    .await?;
            let app = webhook_router.merge(liveness_router());
            tokio::spawn(serve(cfg.listen_addr, app, stop_flag));

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("error from the webhook listener"),
                )
                .await;
        }
        None => {
            info!(addr = %cfg.listen_addr, "delivery mode: long polling");
            tokio::spawn(serve(
                cfg.listen_addr,
                liveness_router(),
                std::future::pending(),
            ));
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

/// `<PUBLIC_URL>/webhook`, keeping any path prefix already on the base.
pub fn webhook_url(base: &Url) -> anyhow::Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(WEBHOOK_PATH)?)
}

pub fn liveness_router() -> Router {
    Router::new().route("/", get(liveness))
}

async fn liveness() -> &'static str {
    "OK"
}

/// Serve `app` until `shutdown` resolves. Bind failures are logged, not fatal:
/// the bot keeps handling updates.
async fn serve(
    addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) {
    let server = match axum::Server::try_bind(&addr) {
        Ok(builder) => builder.serve(app.into_make_service()),
        Err(e) => {
            error!(%addr, "failed to bind http listener: {e}");
            return;
        }
    };
    if let Err(e) = server.with_graceful_shutdown(shutdown).await {
        error!("http listener failed: {e}");
    }
}
