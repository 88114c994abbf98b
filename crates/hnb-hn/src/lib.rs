//! Hacker News adapter (Firebase HTTP API).
//!
//! Implements the `hnb-core` content port. No caching: every call is a fresh
//! round trip.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use hnb_core::{
    content::{Comment, ContentSource, Item, Story},
    domain::ItemId,
    errors::Error,
    pagination::PAGE_SIZE,
    Result,
};

#[derive(Clone, Debug)]
pub struct HnClient {
    base_url: String,
    http: reqwest::Client,
}

impl HnClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hnb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("hn request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::RemoteUnavailable(format!(
                "hn request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("hn json error: {e}")))
    }
}

#[async_trait]
impl ContentSource for HnClient {
    async fn top_story_ids(&self) -> Result<Vec<ItemId>> {
        let raw: Vec<Option<u64>> = self.get_json("topstories.json").await?;
        validate_top_ids(raw)
    }

    async fn item(&self, id: ItemId) -> Result<Item> {
        let raw: Option<RawItem> = self.get_json(&format!("item/{id}.json")).await?;
        raw.map(RawItem::into_item).ok_or(Error::ItemNotFound(id))
    }
}

/// The listing must hold at least one page and start with a real id.
fn validate_top_ids(raw: Vec<Option<u64>>) -> Result<Vec<ItemId>> {
    if raw.len() < PAGE_SIZE as usize {
        return Err(Error::RemoteUnavailable(format!(
            "top stories returned {} ids, expected at least {PAGE_SIZE}",
            raw.len()
        )));
    }
    if raw.first().copied().flatten().is_none() {
        return Err(Error::RemoteUnavailable(
            "top stories listing starts with a null id".to_string(),
        ));
    }
    Ok(raw.into_iter().flatten().map(ItemId).collect())
}

/// Item as served by `item/<id>.json`; every field but `id` may be absent.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: u64,
    #[serde(rename = "type")]
    kind: Option<String>,
    by: Option<String>,
    title: Option<String>,
    text: Option<String>,
    url: Option<String>,
    score: Option<u64>,
    descendants: Option<u64>,
    #[serde(default)]
    kids: Vec<u64>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

impl RawItem {
    fn into_item(self) -> Item {
        let kids = self.kids.into_iter().map(ItemId).collect();
        match (self.kind.as_deref(), self.title) {
            (Some("story" | "job" | "poll"), Some(title)) | (None, Some(title)) => {
                Item::Story(Story {
                    id: ItemId(self.id),
                    title,
                    score: self.score.unwrap_or(0),
                    by: self.by,
                    descendants: self.descendants.unwrap_or(0),
                    kids,
                    url: self.url,
                })
            }
            _ => Item::Comment(Comment {
                id: ItemId(self.id),
                by: self.by,
                text: self.text,
                kids,
                deleted: self.deleted,
                dead: self.dead,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<Item> {
        serde_json::from_str::<Option<RawItem>>(json)
            .unwrap()
            .map(RawItem::into_item)
    }

    #[test]
    fn parses_story() {
        let item = parse(
            r#"{"by":"dhouston","descendants":71,"id":8863,"kids":[8952,9224],"score":111,
                "time":1175714200,"title":"My YC app: Dropbox","type":"story",
                "url":"http://www.getdropbox.com/u/2/screencast.html"}"#,
        )
        .unwrap();
        let Item::Story(s) = item else {
            panic!("expected story");
        };
        assert_eq!(s.id, ItemId(8863));
        assert_eq!(s.title, "My YC app: Dropbox");
        assert_eq!(s.score, 111);
        assert_eq!(s.by.as_deref(), Some("dhouston"));
        assert_eq!(s.descendants, 71);
        assert_eq!(s.kids, vec![ItemId(8952), ItemId(9224)]);
        assert!(s.url.is_some());
    }

    #[test]
    fn job_without_url_or_descendants_is_still_a_story() {
        let Some(Item::Story(s)) = parse(r#"{"id":1,"type":"job","title":"Hiring"}"#) else {
            panic!("expected story");
        };
        assert_eq!(s.score, 0);
        assert_eq!(s.descendants, 0);
        assert!(s.kids.is_empty());
        assert!(s.url.is_none());
    }

    #[test]
    fn parses_comment() {
        let Some(Item::Comment(c)) = parse(
            r#"{"by":"norvig","id":2921983,"kids":[2922097],"parent":2921506,
                "text":"Aw shucks, guys ... you make me blush with your compliments.<p>Tell you what",
                "time":1314211127,"type":"comment"}"#,
        ) else {
            panic!("expected comment");
        };
        assert_eq!(c.by.as_deref(), Some("norvig"));
        assert!(c.text.unwrap().contains("<p>Tell you what"));
        assert_eq!(c.kids, vec![ItemId(2922097)]);
        assert!(!c.deleted && !c.dead);
    }

    #[test]
    fn deleted_comment_has_no_author_or_text() {
        let Some(Item::Comment(c)) =
            parse(r#"{"id":5,"deleted":true,"type":"comment","parent":1,"time":1}"#)
        else {
            panic!("expected comment");
        };
        assert!(c.deleted);
        assert!(c.by.is_none() && c.text.is_none());
    }

    #[test]
    fn null_body_means_not_found() {
        assert!(parse("null").is_none());
    }

    #[test]
    fn top_ids_need_a_full_page() {
        assert!(matches!(
            validate_top_ids(vec![Some(1), Some(2)]),
            Err(Error::RemoteUnavailable(_))
        ));
        assert!(matches!(
            validate_top_ids(vec![None, Some(2), Some(3), Some(4), Some(5)]),
            Err(Error::RemoteUnavailable(_))
        ));
        let ids = validate_top_ids((1..=6).map(Some).collect()).unwrap();
        assert_eq!(ids.len(), 6);
        assert_eq!(ids[0], ItemId(1));
    }

    #[test]
    fn trims_trailing_slash_from_base() {
        let c = HnClient::new("http://localhost:1/v0/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.base_url, "http://localhost:1/v0");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_remote_unavailable() {
        // Port 9 (discard) on localhost is closed in test environments.
        let c = HnClient::new("http://127.0.0.1:9/v0", Duration::from_millis(500)).unwrap();
        assert!(matches!(
            c.top_story_ids().await,
            Err(Error::RemoteUnavailable(_))
        ));
        assert!(matches!(
            c.item(ItemId(1)).await,
            Err(Error::RemoteUnavailable(_))
        ));
    }
}
