//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into the core `IncomingUpdate`
//! model and hands it to the `Browser`. Per-event failures never reach the
//! dispatcher: the browser logs them and answers the chat itself.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    commands::handle_message(msg, state).await
}
