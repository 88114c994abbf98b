use crate::domain::ChatId;

/// Transport-neutral incoming update model.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub chat_id: ChatId,
    /// Lowercased, without the leading `/` and the `@botname` suffix.
    pub name: String,
    pub args: String,
}

impl Command {
    /// Parse `/cmd@botname arg1 ...`.
    ///
    /// `None` when `text` is not a command, or when it names a bot other than
    /// `own_username` (group chats deliver every bot's commands).
    pub fn parse(chat_id: ChatId, text: &str, own_username: Option<&str>) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let mut parts = text.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("").trim().to_string();

        let (name, addressee) = match first.trim_start_matches('/').split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (first.trim_start_matches('/'), None),
        };
        if name.is_empty() {
            return None;
        }
        if let (Some(addressee), Some(own)) = (addressee, own_username) {
            if !addressee.eq_ignore_ascii_case(own.trim_start_matches('@')) {
                return None;
            }
        }
        let name = name.to_lowercase();

        Some(Self {
            chat_id,
            name,
            args,
        })
    }
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub callback_id: String,
    pub data: String,
}

/// Inline keyboard: rows of buttons, top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    /// Appends `row` unless it is empty.
    pub fn push_row(&mut self, row: Vec<InlineButton>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }
}

/// Capabilities of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_bot_suffix_and_args() {
        let c = Command::parse(ChatId(1), "/Top@hn_bot  extra words ", Some("hn_bot")).unwrap();
        assert_eq!(c.name, "top");
        assert_eq!(c.args, "extra words");

        let c = Command::parse(ChatId(1), "/top", Some("hn_bot")).unwrap();
        assert_eq!(c.name, "top");
        assert!(c.args.is_empty());
    }

    #[test]
    fn commands_for_other_bots_are_not_ours() {
        assert!(Command::parse(ChatId(1), "/top@someotherbot", Some("hn_bot")).is_none());
        assert!(Command::parse(ChatId(1), "/top@HN_Bot", Some("hn_bot")).is_some());
        // Username unknown (getMe failed): accept any suffix.
        assert!(Command::parse(ChatId(1), "/top@someotherbot", None).is_some());
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(Command::parse(ChatId(1), "top stories please", None).is_none());
        assert!(Command::parse(ChatId(1), "/", None).is_none());
        assert!(Command::parse(ChatId(1), "/@bot", None).is_none());
    }

    #[test]
    fn keyboard_skips_empty_rows() {
        let mut kb = InlineKeyboard::default();
        kb.push_row(vec![]);
        assert!(kb.is_empty());
        kb.push_row(vec![InlineButton::new("1", "story:1")]);
        assert_eq!(kb.rows.len(), 1);
        assert_eq!(kb.rows[0].len(), 1);
    }
}
