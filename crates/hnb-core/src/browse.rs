//! Event router + fetch orchestration.
//!
//! `Browser` holds no per-chat state: every page is rebuilt from the
//! navigation token carried by the pressed button.

use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::{
    content::{Comment, ContentSource, Item},
    domain::{ChatId, ItemId},
    errors::Error,
    formatting::split_html,
    listing::{render_comment_page, render_story_page, CommentPage, Rendered, StoryPage},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate},
    },
    pagination::{Navigation, PageWindow, PAGE_SIZE},
    Result,
};

const HELP_TEXT: &str = "<b>Hacker News browser</b>\n\n\
/top - browse the current top stories\n\n\
Tap a number to read that story's comments; use prev/next to page.";

const UPSTREAM_APOLOGY: &str =
    "Sorry, Hacker News could not be reached right now. Please try again.";
const GENERIC_APOLOGY: &str = "Sorry, something went wrong. Please try again.";
const STALE_BUTTON: &str = "Sorry, that button is not valid anymore. Send /top to start over.";

#[derive(Clone, Copy, Debug)]
pub struct BrowserConfig {
    /// Per-message byte budget before splitting.
    pub safe_message_len: usize,
    /// Item fetches in flight per page.
    pub fetch_concurrency: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            safe_message_len: 4000,
            fetch_concurrency: PAGE_SIZE as usize,
        }
    }
}

pub struct Browser {
    content: Arc<dyn ContentSource>,
    messenger: Arc<dyn MessagingPort>,
    cfg: BrowserConfig,
}

impl Browser {
    pub fn new(
        content: Arc<dyn ContentSource>,
        messenger: Arc<dyn MessagingPort>,
        cfg: BrowserConfig,
    ) -> Self {
        Self {
            content,
            messenger,
            cfg,
        }
    }

    /// Route one inbound event. Failures are reported to the chat and logged;
    /// nothing escapes to the dispatcher.
    pub async fn handle(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Command(cmd) => self.on_command(cmd).await,
            IncomingUpdate::Callback(q) => self.on_callback(q).await,
            IncomingUpdate::Text(msg) => {
                debug!(chat = msg.chat_id.0, "ignoring plain text message");
            }
        }
    }

    async fn on_command(&self, cmd: Command) {
        debug!(chat = cmd.chat_id.0, command = %cmd.name, "command");
        match (cmd.name.as_str(), cmd.args.is_empty()) {
            ("top", true) => {
                let result = self.story_page(0).await;
                self.respond(cmd.chat_id, result.map(|p| render_story_page(&p)))
                    .await;
            }
            _ => {
                if let Err(e) = self.messenger.send_html(cmd.chat_id, HELP_TEXT).await {
                    warn!(chat = cmd.chat_id.0, "failed to send help: {e}");
                }
            }
        }
    }

    async fn on_callback(&self, q: CallbackQuery) {
        // Acknowledge first so the client drops its spinner whatever happens next.
        if let Err(e) = self.messenger.answer_callback_query(&q.callback_id, None).await {
            warn!(chat = q.chat_id.0, "failed to answer callback query: {e}");
        }

        let nav = match Navigation::decode(&q.data) {
            Ok(nav) => nav,
            Err(e) => {
                warn!(chat = q.chat_id.0, data = %q.data, "bad navigation token: {e}");
                self.send_plain(q.chat_id, STALE_BUTTON).await;
                return;
            }
        };
        debug!(chat = q.chat_id.0, token = %q.data, "navigate");

        let rendered = match nav {
            Navigation::Page { page } => self
                .story_page(page)
                .await
                .map(|p| render_story_page(&p)),
            Navigation::Story { id } => self
                .comment_page(id, 0)
                .await
                .map(|p| render_comment_page(&p)),
            Navigation::Comments { parent, offset } => self
                .comment_page(parent, offset)
                .await
                .map(|p| render_comment_page(&p)),
        };
        self.respond(q.chat_id, rendered).await;
    }

    /// Page `page` of the top-story list.
    pub async fn story_page(&self, page: u64) -> Result<StoryPage> {
        let ids = self.content.top_story_ids().await?;
        let window = PageWindow::for_page(page, PAGE_SIZE, ids.len() as u64);

        let stories = stream::iter(ids[window.range()].iter().copied())
            .map(|id| self.content.item(id))
            .buffered(self.cfg.fetch_concurrency.max(1))
            .map_ok(|item| match item {
                Item::Story(s) => Some(s),
                Item::Comment(c) => {
                    warn!(id = %c.id, "top story list contains a comment; skipping");
                    None
                }
            })
            .try_collect::<Vec<_>>()
            .await?;

        Ok(StoryPage { window, stories })
    }

    /// Direct children of `parent` starting at `offset`.
    ///
    /// Children the API no longer knows about render as deleted placeholders
    /// instead of failing the page.
    pub async fn comment_page(&self, parent: ItemId, offset: u64) -> Result<CommentPage> {
        let item = self.content.item(parent).await?;
        let kids = item.kids();
        let window = PageWindow::new(offset, PAGE_SIZE, kids.len() as u64);

        let comments = stream::iter(kids[window.range()].iter().copied())
            .map(|id| async move {
                match self.content.item(id).await {
                    Ok(item) => Ok(item.into_comment()),
                    Err(Error::ItemNotFound(_)) => Ok(Comment::missing(id)),
                    Err(e) => Err(e),
                }
            })
            .buffered(self.cfg.fetch_concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await?;

        Ok(CommentPage {
            parent,
            parent_title: item.title().map(str::to_string),
            window,
            comments,
        })
    }

    async fn respond(&self, chat_id: ChatId, rendered: Result<Rendered>) {
        match rendered {
            Ok(r) => self.deliver(chat_id, r).await,
            Err(e) => {
                warn!(chat = chat_id.0, "request failed: {e}");
                let text = if e.is_upstream() {
                    UPSTREAM_APOLOGY
                } else {
                    GENERIC_APOLOGY
                };
                self.send_plain(chat_id, text).await;
            }
        }
    }

    async fn deliver(&self, chat_id: ChatId, rendered: Rendered) {
        let limit = self
            .cfg
            .safe_message_len
            .min(self.messenger.capabilities().max_message_len)
            .max(200);

        let mut chunks: Vec<String> = rendered
            .messages
            .iter()
            .flat_map(|m| split_html(m, limit))
            .collect();
        let last = match (rendered.keyboard, chunks.pop()) {
            (Some(kb), Some(last)) => Some((last, kb)),
            (None, Some(last)) => {
                chunks.push(last);
                None
            }
            (_, None) => None,
        };

        for chunk in &chunks {
            if let Err(e) = self.messenger.send_html(chat_id, chunk).await {
                warn!(chat = chat_id.0, "failed to send message: {e}");
            }
        }
        if let Some((text, kb)) = last {
            if let Err(e) = self.messenger.send_inline_keyboard(chat_id, &text, kb).await {
                warn!(chat = chat_id.0, "failed to send message with keyboard: {e}");
            }
        }
    }

    async fn send_plain(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_plain(chat_id, text).await {
            warn!(chat = chat_id.0, "failed to send reply: {e}");
        }
    }
}
