//! Content port: read-only access to Hacker News items.
//!
//! The HTTP implementation lives in `hnb-hn`; tests use in-memory fakes.

use async_trait::async_trait;

use crate::{domain::ItemId, Result};

/// A titled top-level item (stories, plus jobs and polls).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Story {
    pub id: ItemId,
    pub title: String,
    pub score: u64,
    pub by: Option<String>,
    pub descendants: u64,
    pub kids: Vec<ItemId>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    pub id: ItemId,
    pub by: Option<String>,
    pub text: Option<String>,
    pub kids: Vec<ItemId>,
    pub deleted: bool,
    pub dead: bool,
}

impl Comment {
    /// Stand-in for a child id the API no longer knows about.
    pub fn missing(id: ItemId) -> Self {
        Self {
            id,
            deleted: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Story(Story),
    Comment(Comment),
}

impl Item {
    /// Direct children, in ranking order.
    pub fn kids(&self) -> &[ItemId] {
        match self {
            Item::Story(s) => &s.kids,
            Item::Comment(c) => &c.kids,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Item::Story(s) => Some(&s.title),
            Item::Comment(_) => None,
        }
    }

    pub fn into_comment(self) -> Comment {
        match self {
            Item::Comment(c) => c,
            // A story listed as someone's child is unusual; show its title as the body.
            Item::Story(s) => Comment {
                id: s.id,
                by: s.by,
                text: Some(s.title),
                kids: s.kids,
                deleted: false,
                dead: false,
            },
        }
    }
}

/// Read-only content API.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Ids of the current top stories, best first.
    async fn top_story_ids(&self) -> Result<Vec<ItemId>>;

    /// A single item by id.
    ///
    /// Fails with `ItemNotFound` when the API has no such id and with
    /// `RemoteUnavailable` when the API cannot be reached.
    async fn item(&self, id: ItemId) -> Result<Item>;
}
