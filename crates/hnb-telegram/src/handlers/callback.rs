use std::sync::Arc;

use teloxide::prelude::*;
use tracing::warn;

use hnb_core::{
    domain::ChatId,
    messaging::types::{CallbackQuery as CoreCallback, IncomingUpdate},
};

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(chat_id) = q.message.as_ref().map(|m| m.chat.id) else {
        // Inline-mode or expired message: nowhere to reply, but still stop the spinner.
        if let Err(e) = state.messenger.answer_callback_query(&q.id, None).await {
            warn!("failed to answer callback query without chat: {e}");
        }
        return Ok(());
    };

    let update = IncomingUpdate::Callback(CoreCallback {
        chat_id: ChatId(chat_id.0),
        callback_id: q.id,
        data: q.data.unwrap_or_default(),
    });
    state.browser.handle(update).await;
    Ok(())
}
