use std::sync::Arc;

use teloxide::prelude::*;

use hnb_core::{
    domain::ChatId,
    messaging::types::{Command, IncomingUpdate, TextMessage},
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let update = to_update(ChatId(msg.chat.id.0), text, state.bot_username.as_deref());
    state.browser.handle(update).await;
    Ok(())
}

fn to_update(chat_id: ChatId, text: &str, bot_username: Option<&str>) -> IncomingUpdate {
    match Command::parse(chat_id, text, bot_username) {
        Some(cmd) => IncomingUpdate::Command(cmd),
        None => IncomingUpdate::Text(TextMessage {
            chat_id,
            text: text.to_string(),
        }),
    }
}
