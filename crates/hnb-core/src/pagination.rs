//! Navigation tokens and page windows.
//!
//! Buttons are stateless: everything needed to rebuild a page travels inside
//! the button's callback data as a colon-delimited token.

use std::ops::Range;

use crate::domain::ItemId;

/// Items per page, for both the story list and comment pages.
pub const PAGE_SIZE: u64 = 5;

/// Telegram rejects callback data longer than this (bytes).
pub const MAX_TOKEN_LEN: usize = 64;

const PAGE_PREFIX: &str = "page";
const STORY_PREFIX: &str = "story";
const COMMENTS_PREFIX: &str = "comments";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,

    #[error("token is {0} bytes, limit is {limit}", limit = MAX_TOKEN_LEN)]
    TooLong(usize),

    #[error("unknown token prefix `{0}`")]
    UnknownPrefix(String),

    #[error("`{prefix}` expects {expected} field(s), got {got}")]
    Arity {
        prefix: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("field `{field}` is not a non-negative integer: `{value}`")]
    NotANumber { field: &'static str, value: String },
}

/// Navigation intent carried by a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Page `page` (zero-based) of the top-story list.
    Page { page: u64 },
    /// Open the comment view of a story at offset 0.
    Story { id: ItemId },
    /// Children of `parent` starting at `offset`.
    Comments { parent: ItemId, offset: u64 },
}

impl Navigation {
    pub fn encode(&self) -> String {
        match self {
            Navigation::Page { page } => format!("{PAGE_PREFIX}:{page}"),
            Navigation::Story { id } => format!("{STORY_PREFIX}:{id}"),
            Navigation::Comments { parent, offset } => {
                format!("{COMMENTS_PREFIX}:{parent}:{offset}")
            }
        }
    }

    /// Parse a token produced by [`Navigation::encode`].
    ///
    /// The prefix before the first `:` selects the variant; the remaining
    /// fields must match that variant's arity exactly.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong(token.len()));
        }

        let mut parts = token.split(':');
        let prefix = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();

        match prefix {
            PAGE_PREFIX => {
                expect_arity(PAGE_PREFIX, &fields, 1)?;
                Ok(Navigation::Page {
                    page: parse_field("page", fields[0])?,
                })
            }
            STORY_PREFIX => {
                expect_arity(STORY_PREFIX, &fields, 1)?;
                Ok(Navigation::Story {
                    id: ItemId(parse_field("id", fields[0])?),
                })
            }
            COMMENTS_PREFIX => {
                expect_arity(COMMENTS_PREFIX, &fields, 2)?;
                Ok(Navigation::Comments {
                    parent: ItemId(parse_field("id", fields[0])?),
                    offset: parse_field("offset", fields[1])?,
                })
            }
            other => Err(TokenError::UnknownPrefix(other.to_string())),
        }
    }
}

fn expect_arity(prefix: &'static str, fields: &[&str], expected: usize) -> Result<(), TokenError> {
    if fields.len() != expected {
        return Err(TokenError::Arity {
            prefix,
            expected,
            got: fields.len(),
        });
    }
    Ok(())
}

fn parse_field(field: &'static str, value: &str) -> Result<u64, TokenError> {
    // `u64::from_str` accepts a leading `+`; tokens never carry one.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::NotANumber {
            field,
            value: value.to_string(),
        });
    }
    value.parse::<u64>().map_err(|_| TokenError::NotANumber {
        field,
        value: value.to_string(),
    })
}

/// A contiguous slice of an ordered list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    offset: u64,
    page_size: u64,
    total: u64,
}

impl PageWindow {
    /// Unaligned offsets are snapped down to the page boundary.
    pub fn new(offset: u64, page_size: u64, total: u64) -> Self {
        let page_size = page_size.max(1);
        Self {
            offset: offset - offset % page_size,
            page_size,
            total,
        }
    }

    pub fn for_page(page: u64, page_size: u64, total: u64) -> Self {
        Self::new(page.saturating_mul(page_size.max(1)), page_size, total)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_index(&self) -> u64 {
        self.offset / self.page_size
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset.saturating_add(self.page_size) < self.total
    }

    /// Start of the previous page. From past the end this is the last page
    /// that holds items, so one step back always lands on data.
    pub fn prev_offset(&self) -> u64 {
        if self.offset >= self.total {
            let last = self.total.saturating_sub(1);
            return last - last % self.page_size;
        }
        self.offset.saturating_sub(self.page_size)
    }

    pub fn prev_page(&self) -> u64 {
        self.prev_offset() / self.page_size
    }

    pub fn next_offset(&self) -> u64 {
        self.offset.saturating_add(self.page_size)
    }

    /// Slice bounds into the underlying list, clamped to `total`.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset.min(self.total);
        let end = self.offset.saturating_add(self.page_size).min(self.total);
        start as usize..end as usize
    }

    pub fn len(&self) -> usize {
        self.range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1-based label of the `i`-th item on this page.
    pub fn ordinal(&self, i: usize) -> u64 {
        self.offset + i as u64 + 1
    }
}
