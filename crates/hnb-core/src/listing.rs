//! List renderer: pages of stories or comments → Telegram HTML + keyboard.

use crate::{
    content::{Comment, Story},
    domain::ItemId,
    formatting::{escape_html, render_body},
    messaging::types::{InlineButton, InlineKeyboard},
    pagination::{Navigation, PageWindow},
};

/// One page of the top-story list.
#[derive(Clone, Debug)]
pub struct StoryPage {
    pub window: PageWindow,
    /// One slot per id in the window; `None` where the item is not a story.
    pub stories: Vec<Option<Story>>,
}

/// One page of an item's direct children.
#[derive(Clone, Debug)]
pub struct CommentPage {
    pub parent: ItemId,
    pub parent_title: Option<String>,
    pub window: PageWindow,
    pub comments: Vec<Comment>,
}

/// Messages to send in order; the keyboard rides on the last one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub messages: Vec<String>,
    pub keyboard: Option<InlineKeyboard>,
}

impl Rendered {
    fn new(messages: Vec<String>, keyboard: InlineKeyboard) -> Self {
        Self {
            messages,
            keyboard: (!keyboard.is_empty()).then_some(keyboard),
        }
    }
}

pub fn render_story_page(page: &StoryPage) -> Rendered {
    let window = page.window;
    let mut keyboard = InlineKeyboard::default();

    if page.stories.iter().all(Option::is_none) {
        keyboard.push_row(story_nav_row(window));
        return Rendered::new(vec!["No more stories.".to_string()], keyboard);
    }

    let mut text = String::new();
    let mut selectors = Vec::with_capacity(page.stories.len());
    for (i, slot) in page.stories.iter().enumerate() {
        let Some(story) = slot else {
            continue;
        };
        let ordinal = window.ordinal(i);
        text.push_str(&story_entry(ordinal, story));
        selectors.push(InlineButton::new(
            ordinal.to_string(),
            Navigation::Story { id: story.id }.encode(),
        ));
    }

    keyboard.push_row(selectors);
    keyboard.push_row(story_nav_row(window));
    Rendered::new(vec![text.trim_end().to_string()], keyboard)
}

fn story_entry(ordinal: u64, story: &Story) -> String {
    let title = escape_html(&story.title);
    let title = match &story.url {
        Some(url) => format!("<a href=\"{}\">{title}</a>", escape_html(url)),
        None => title,
    };
    format!(
        "{ordinal}. <b>{title}</b>\n{} <i>by {}</i> | {}\n\n",
        points(story.score),
        escape_html(story.by.as_deref().unwrap_or("unknown")),
        comments_count(story.descendants),
    )
}

fn points(score: u64) -> String {
    match score {
        1 => "1 point".to_string(),
        _ => format!("{score} points"),
    }
}

fn comments_count(n: u64) -> String {
    match n {
        1 => "1 comment".to_string(),
        _ => format!("{n} comments"),
    }
}

fn story_nav_row(window: PageWindow) -> Vec<InlineButton> {
    let mut row = Vec::new();
    if window.has_prev() {
        row.push(InlineButton::new(
            "prev",
            Navigation::Page {
                page: window.prev_page(),
            }
            .encode(),
        ));
    }
    if window.has_next() {
        row.push(InlineButton::new(
            "next",
            Navigation::Page {
                page: window.page_index() + 1,
            }
            .encode(),
        ));
    }
    row
}

/// Comments go out as one message each, then a footer carrying prev/next.
pub fn render_comment_page(page: &CommentPage) -> Rendered {
    let window = page.window;
    let mut keyboard = InlineKeyboard::default();
    keyboard.push_row(comment_nav_row(page.parent, window));

    if window.total() == 0 {
        return Rendered::new(vec!["No comments yet.".to_string()], keyboard);
    }
    if page.comments.is_empty() {
        return Rendered::new(vec!["No more comments.".to_string()], keyboard);
    }

    let mut messages: Vec<String> = page.comments.iter().map(comment_entry).collect();

    let first = window.offset() + 1;
    let last = window.offset() + page.comments.len() as u64;
    let range = if first == last {
        first.to_string()
    } else {
        format!("{first}–{last}")
    };
    let footer = match &page.parent_title {
        Some(title) => format!(
            "<i>Comments {range} of {} on</i> <b>{}</b>",
            window.total(),
            escape_html(title)
        ),
        None => format!("<i>Replies {range} of {}</i>", window.total()),
    };
    messages.push(footer);

    Rendered::new(messages, keyboard)
}

fn comment_entry(comment: &Comment) -> String {
    let author = comment.by.as_deref().unwrap_or("[deleted]");
    let body = match comment.text.as_deref() {
        Some(text) if !comment.deleted && !comment.dead => render_body(text),
        _ if comment.dead => "<i>[dead]</i>".to_string(),
        _ => "<i>[deleted]</i>".to_string(),
    };
    format!("<b>{}</b>\n{body}", escape_html(author))
}

fn comment_nav_row(parent: ItemId, window: PageWindow) -> Vec<InlineButton> {
    let mut row = Vec::new();
    if window.has_prev() {
        row.push(InlineButton::new(
            "prev",
            Navigation::Comments {
                parent,
                offset: window.prev_offset(),
            }
            .encode(),
        ));
    }
    if window.has_next() {
        row.push(InlineButton::new(
            "next",
            Navigation::Comments {
                parent,
                offset: window.next_offset(),
            }
            .encode(),
        ));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PAGE_SIZE;

    fn story(id: u64) -> Story {
        Story {
            id: ItemId(id),
            title: format!("Story {id}"),
            score: id * 10,
            by: Some(format!("user{id}")),
            descendants: id,
            kids: vec![],
            url: None,
        }
    }

    fn comment(id: u64, text: &str) -> Comment {
        Comment {
            id: ItemId(id),
            by: Some(format!("c{id}")),
            text: Some(text.to_string()),
            ..Comment::default()
        }
    }

    fn labels(row: &[InlineButton]) -> Vec<&str> {
        row.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn first_story_page_has_selectors_and_next_only() {
        let page = StoryPage {
            window: PageWindow::for_page(0, PAGE_SIZE, 30),
            stories: (1..=5).map(|i| Some(story(i))).collect(),
        };
        let r = render_story_page(&page);

        assert_eq!(r.messages.len(), 1);
        assert!(r.messages[0].starts_with("1. <b>Story 1</b>\n10 points <i>by user1</i> | 1 comment"));
        assert!(r.messages[0].contains("5. <b>Story 5</b>"));

        let kb = r.keyboard.unwrap();
        assert_eq!(kb.rows.len(), 2);
        assert_eq!(labels(&kb.rows[0]), ["1", "2", "3", "4", "5"]);
        assert_eq!(kb.rows[0][2].callback_data, "story:3");
        assert_eq!(labels(&kb.rows[1]), ["next"]);
        assert_eq!(kb.rows[1][0].callback_data, "page:1");
    }

    #[test]
    fn short_final_story_page_renders_only_returned_items() {
        let page = StoryPage {
            window: PageWindow::for_page(2, PAGE_SIZE, 12),
            stories: vec![Some(story(11)), Some(story(12))],
        };
        let r = render_story_page(&page);

        let kb = r.keyboard.unwrap();
        assert_eq!(labels(&kb.rows[0]), ["11", "12"]);
        assert_eq!(kb.rows[0][1].callback_data, "story:12");
        assert_eq!(labels(&kb.rows[1]), ["prev"]);
        assert_eq!(kb.rows[1][0].callback_data, "page:1");
        assert!(r.messages[0].starts_with("11. "));
        assert!(!r.messages[0].contains("13. "));
    }

    #[test]
    fn story_titles_are_escaped_and_linked() {
        let mut s = story(1);
        s.title = "Rust <3 & you".to_string();
        s.url = Some("https://example.com/?a=1&b=2".to_string());
        let page = StoryPage {
            window: PageWindow::for_page(0, PAGE_SIZE, 1),
            stories: vec![Some(s)],
        };
        let r = render_story_page(&page);
        assert!(r.messages[0].contains(
            "<b><a href=\"https://example.com/?a=1&amp;b=2\">Rust &lt;3 &amp; you</a></b>"
        ));
        // Single page: selectors, no nav row.
        assert_eq!(r.keyboard.unwrap().rows.len(), 1);
    }

    #[test]
    fn empty_story_page_offers_way_back() {
        let page = StoryPage {
            window: PageWindow::for_page(9, PAGE_SIZE, 12),
            stories: vec![],
        };
        let r = render_story_page(&page);
        assert_eq!(r.messages, vec!["No more stories.".to_string()]);
        let kb = r.keyboard.unwrap();
        assert_eq!(labels(&kb.rows[0]), ["prev"]);
        assert_eq!(kb.rows[0][0].callback_data, "page:2");
    }

    #[test]
    fn skipped_slot_keeps_ranks_of_later_stories() {
        let page = StoryPage {
            window: PageWindow::for_page(1, PAGE_SIZE, 12),
            stories: vec![Some(story(6)), None, Some(story(8))],
        };
        let r = render_story_page(&page);
        assert!(r.messages[0].starts_with("6. "));
        assert!(r.messages[0].contains("8. <b>Story 8</b>"));
        assert!(!r.messages[0].contains("7. "));
        assert_eq!(labels(&r.keyboard.unwrap().rows[0]), ["6", "8"]);
    }

    #[test]
    fn comment_prev_from_past_the_end_lands_on_last_page() {
        let page = CommentPage {
            parent: ItemId(42),
            parent_title: None,
            window: PageWindow::new(20, PAGE_SIZE, 7),
            comments: vec![],
        };
        let r = render_comment_page(&page);
        assert_eq!(r.messages, vec!["No more comments.".to_string()]);

        let kb = r.keyboard.unwrap();
        assert_eq!(labels(&kb.rows[0]), ["prev"]);
        let Ok(Navigation::Comments { parent, offset }) =
            Navigation::decode(&kb.rows[0][0].callback_data)
        else {
            panic!("expected comments token");
        };
        assert_eq!(parent, ItemId(42));
        assert!(!PageWindow::new(offset, PAGE_SIZE, 7).is_empty());
        assert_eq!(offset, 5);
    }

    #[test]
    fn middle_comment_page_has_prev_and_next() {
        let page = CommentPage {
            parent: ItemId(42),
            parent_title: Some("Ask HN".to_string()),
            window: PageWindow::new(5, PAGE_SIZE, 17),
            comments: (6..=10).map(|i| comment(i, "hi")).collect(),
        };
        let r = render_comment_page(&page);

        assert_eq!(r.messages.len(), 6);
        assert_eq!(r.messages[0], "<b>c6</b>\nhi");
        assert_eq!(
            r.messages[5],
            "<i>Comments 6–10 of 17 on</i> <b>Ask HN</b>"
        );
        let kb = r.keyboard.unwrap();
        assert_eq!(kb.rows.len(), 1);
        assert_eq!(labels(&kb.rows[0]), ["prev", "next"]);
        assert_eq!(kb.rows[0][0].callback_data, "comments:42:0");
        assert_eq!(kb.rows[0][1].callback_data, "comments:42:10");
    }

    #[test]
    fn single_comment_page_has_no_keyboard() {
        let page = CommentPage {
            parent: ItemId(7),
            parent_title: None,
            window: PageWindow::new(0, PAGE_SIZE, 1),
            comments: vec![comment(8, "a<p>b")],
        };
        let r = render_comment_page(&page);
        assert_eq!(r.messages[0], "<b>c8</b>\na\n\nb");
        assert_eq!(r.messages[1], "<i>Replies 1 of 1</i>");
        assert!(r.keyboard.is_none());
    }

    #[test]
    fn deleted_and_dead_comments_get_placeholders() {
        let page = CommentPage {
            parent: ItemId(1),
            parent_title: None,
            window: PageWindow::new(0, PAGE_SIZE, 2),
            comments: vec![
                Comment::missing(ItemId(2)),
                Comment {
                    dead: true,
                    ..comment(3, "spam")
                },
            ],
        };
        let r = render_comment_page(&page);
        assert_eq!(r.messages[0], "<b>[deleted]</b>\n<i>[deleted]</i>");
        assert_eq!(r.messages[1], "<b>c3</b>\n<i>[dead]</i>");
    }

    #[test]
    fn no_comments_at_all() {
        let page = CommentPage {
            parent: ItemId(1),
            parent_title: Some("Quiet".to_string()),
            window: PageWindow::new(0, PAGE_SIZE, 0),
            comments: vec![],
        };
        let r = render_comment_page(&page);
        assert_eq!(r.messages, vec!["No comments yet.".to_string()]);
        assert!(r.keyboard.is_none());
    }
}
