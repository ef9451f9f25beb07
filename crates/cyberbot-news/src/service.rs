//! Fetch-and-store plus the digest shown to users.

use chrono::Utc;
use cyberbot_core::config::{FeedSource, NewsConfig};
use cyberbot_core::error::Result;
use cyberbot_core::traits::FeedClient;
use cyberbot_core::types::NewsItem;
use cyberbot_db::CyberBotDb;
use std::sync::Arc;

use crate::feed::{FeedEntry, parse_feed};

pub const NEWS_UNAVAILABLE: &str = "❌ News service unavailable.";
pub const NO_NEWS: &str = "📰 No cybersecurity news available right now.";

/// Result of one pass over all configured feeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    /// Entries parsed across all feeds.
    pub fetched: usize,
    /// Entries that were new and got stored.
    pub inserted: usize,
    /// Names of feeds that could not be downloaded.
    pub failed_feeds: Vec<String>,
}

impl FetchReport {
    pub fn all_failed(&self, feed_count: usize) -> bool {
        feed_count > 0 && self.failed_feeds.len() == feed_count
    }
}

pub struct NewsService {
    feeds: Vec<FeedSource>,
    per_feed_limit: usize,
    digest_size: usize,
    client: Arc<dyn FeedClient>,
    db: Arc<CyberBotDb>,
}

impl NewsService {
    pub fn new(config: &NewsConfig, client: Arc<dyn FeedClient>, db: Arc<CyberBotDb>) -> Self {
        Self {
            feeds: config.feeds.clone(),
            per_feed_limit: config.per_feed_limit,
            digest_size: config.digest_size,
            client,
            db,
        }
    }

    /// Pull every feed concurrently and store entries whose link is new.
    ///
    /// Feeds are interleaved and written oldest-first so that the newest
    /// article of every source ends up at the top of the digest.
    pub async fn fetch_and_store(&self) -> FetchReport {
        let downloads = self.feeds.iter().map(|feed| async move {
            let result = self.client.fetch(&feed.url).await;
            (feed, result)
        });
        let results = futures::future::join_all(downloads).await;

        let mut report = FetchReport::default();
        let mut per_feed: Vec<(&FeedSource, Vec<FeedEntry>)> = Vec::new();
        for (feed, result) in results {
            match result {
                Ok(xml) => {
                    let entries = parse_feed(&xml, self.per_feed_limit);
                    tracing::debug!("📰 {}: {} entries", feed.name, entries.len());
                    report.fetched += entries.len();
                    per_feed.push((feed, entries));
                }
                Err(e) => {
                    tracing::warn!("⚠️ Feed '{}' failed: {e}", feed.name);
                    report.failed_feeds.push(feed.name.clone());
                }
            }
        }

        let depth = per_feed.iter().map(|(_, e)| e.len()).max().unwrap_or(0);
        let mut ordered: Vec<(&FeedSource, &FeedEntry)> = Vec::with_capacity(report.fetched);
        for round in 0..depth {
            for (feed, entries) in &per_feed {
                if let Some(entry) = entries.get(round) {
                    ordered.push((*feed, entry));
                }
            }
        }

        for (feed, entry) in ordered.into_iter().rev() {
            let item = NewsItem {
                title: entry.title.clone(),
                link: entry.link.clone(),
                summary: entry.summary.clone(),
                source: feed.name.clone(),
                published: entry.published.clone(),
                timestamp: Utc::now(),
            };
            match self.db.insert_news_if_new(&item) {
                Ok(true) => report.inserted += 1,
                Ok(false) => {}
                Err(e) => tracing::error!("❌ Failed to store news '{}': {e}", item.link),
            }
        }

        tracing::info!(
            "📰 News fetch: {} parsed, {} new, {} feed(s) failed",
            report.fetched,
            report.inserted,
            report.failed_feeds.len()
        );
        report
    }

    /// Render the latest stored items.
    pub fn digest(&self) -> Result<String> {
        let items = self.db.latest_news(self.digest_size)?;
        if items.is_empty() {
            return Ok(NO_NEWS.to_string());
        }
        let mut out = String::from("📰 Latest cybersecurity news:\n");
        for (i, item) in items.iter().enumerate() {
            let title = if item.title.is_empty() { "(untitled)" } else { item.title.as_str() };
            out.push_str(&format!("\n{}. {} ({})\n   {}", i + 1, title, item.source, item.link));
        }
        Ok(out)
    }

    /// Fetch, store and answer with a digest. Never fails.
    pub async fn latest_news_reply(&self) -> String {
        let report = self.fetch_and_store().await;
        match self.digest() {
            Ok(text) if text == NO_NEWS && report.all_failed(self.feeds.len()) => {
                NEWS_UNAVAILABLE.to_string()
            }
            Ok(text) => text,
            Err(e) => {
                tracing::error!("❌ News digest failed: {e}");
                NEWS_UNAVAILABLE.to_string()
            }
        }
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cyberbot_core::error::CyberBotError;
    use std::collections::HashMap;
    use std::path::Path;

    struct FakeFeeds(HashMap<String, String>);

    #[async_trait]
    impl FeedClient for FakeFeeds {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| CyberBotError::Feed(format!("{url}: connection refused")))
        }
    }

    fn rss(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|l| format!("<item><title>Story {l}</title><link>https://news.example/{l}</link></item>"))
            .collect();
        format!("<rss><channel>{items}</channel></rss>")
    }

    fn feed(name: &str) -> FeedSource {
        FeedSource { name: name.into(), url: format!("https://{name}.example/feed") }
    }

    fn service(feeds: Vec<FeedSource>, docs: HashMap<String, String>) -> (NewsService, Arc<CyberBotDb>) {
        let db = Arc::new(CyberBotDb::open(Path::new(":memory:")).unwrap());
        let config = NewsConfig { feeds, digest_size: 3, ..NewsConfig::default() };
        (NewsService::new(&config, Arc::new(FakeFeeds(docs)), db.clone()), db)
    }

    #[tokio::test]
    async fn test_fetch_twice_never_duplicates() {
        let docs = HashMap::from([("https://a.example/feed".to_string(), rss(&["1", "2", "3"]))]);
        let (svc, db) = service(vec![feed("a")], docs);

        let first = svc.fetch_and_store().await;
        assert_eq!(first.fetched, 3);
        assert_eq!(first.inserted, 3);

        let second = svc.fetch_and_store().await;
        assert_eq!(second.fetched, 3);
        assert_eq!(second.inserted, 0);
        assert_eq!(db.news_count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_feed_is_skipped() {
        let docs = HashMap::from([("https://a.example/feed".to_string(), rss(&["1"]))]);
        let (svc, db) = service(vec![feed("a"), feed("down")], docs);

        let report = svc.fetch_and_store().await;
        assert_eq!(report.inserted, 1);
        assert_eq!(report.failed_feeds, vec!["down".to_string()]);
        assert!(!report.all_failed(svc.feed_count()));
        assert_eq!(db.news_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_per_feed_limit() {
        let docs = HashMap::from([(
            "https://a.example/feed".to_string(),
            rss(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"]),
        )]);
        let (svc, db) = service(vec![feed("a")], docs);
        svc.fetch_and_store().await;
        assert_eq!(db.news_count().unwrap(), 10);
    }

    #[tokio::test]
    async fn test_digest_interleaves_newest_of_each_feed() {
        let docs = HashMap::from([
            ("https://a.example/feed".to_string(), rss(&["a1", "a2"])),
            ("https://b.example/feed".to_string(), rss(&["b1", "b2"])),
        ]);
        let (svc, _db) = service(vec![feed("a"), feed("b")], docs);

        let reply = svc.latest_news_reply().await;
        assert!(reply.starts_with("📰 Latest cybersecurity news:"));
        let a1 = reply.find("Story a1").unwrap();
        let b1 = reply.find("Story b1").unwrap();
        let a2 = reply.find("Story a2").unwrap();
        assert!(a1 < b1 && b1 < a2);
        assert!(reply.contains("1. Story a1 (a)\n   https://news.example/a1"));
        assert!(!reply.contains("b2"), "digest is capped at three items");
    }

    #[tokio::test]
    async fn test_all_feeds_down_and_empty_store() {
        let (svc, _db) = service(vec![feed("x"), feed("y")], HashMap::new());
        assert_eq!(svc.latest_news_reply().await, NEWS_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_all_feeds_down_serves_stored_news() {
        let (svc, db) = service(vec![feed("x")], HashMap::new());
        db.insert_news_if_new(&NewsItem {
            title: "Cached story".into(),
            link: "https://news.example/cached".into(),
            summary: String::new(),
            source: "x".into(),
            published: String::new(),
            timestamp: Utc::now(),
        })
        .unwrap();
        let reply = svc.latest_news_reply().await;
        assert!(reply.contains("Cached story"));
    }

    #[tokio::test]
    async fn test_empty_feeds_give_no_news_text() {
        let docs = HashMap::from([("https://a.example/feed".to_string(), rss(&[]))]);
        let (svc, _db) = service(vec![feed("a")], docs);
        assert_eq!(svc.latest_news_reply().await, NO_NEWS);
    }
}
