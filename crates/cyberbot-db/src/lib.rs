//! CyberBot SQLite database.
//!
//! Two collections live here:
//! - `logs` — append-only record of every `/chat` exchange, read back
//!   oldest-first (history) or newest-first (admin view).
//! - `news` — feed articles, unique by link so repeated fetches never
//!   duplicate an article.

use chrono::{DateTime, SecondsFormat, Utc};
use cyberbot_core::error::{CyberBotError, Result};
use cyberbot_core::types::{Intent, LogEntry, NewsItem};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// Persistent store for logs and news.
pub struct CyberBotDb {
    conn: Mutex<Connection>,
}

fn storage_err(e: impl std::fmt::Display) -> CyberBotError {
    CyberBotError::Storage(e.to_string())
}

/// RFC 3339 with fixed microsecond precision, so string order is time order.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            tracing::warn!("⚠️ Bad timestamp '{s}' in database: {e}");
            DateTime::<Utc>::default()
        })
}

impl CyberBotDb {
    /// Open or create the database. Use `":memory:"` for an ephemeral store.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && path != Path::new(":memory:") {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| CyberBotError::Storage(format!("DB open error: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

        let db = Self { conn: Mutex::new(conn) };
        db.migrate()?;
        Ok(db)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| CyberBotError::Storage(format!("Lock: {e}")))
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_message TEXT NOT NULL,
                bot_reply TEXT NOT NULL,
                intent TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);

            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL UNIQUE,
                summary TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT '',
                published TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_news_timestamp ON news(timestamp);
        ").map_err(|e| CyberBotError::Storage(format!("Migration error: {e}")))?;
        Ok(())
    }

    // ── Logs ──────────────────────────────────────────────

    /// Append one exchange. Returns the new row id.
    pub fn append_log(&self, entry: &LogEntry) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO logs (user_message, bot_reply, intent, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.user_message,
                entry.bot_reply,
                entry.intent.as_str(),
                format_ts(&entry.timestamp),
            ],
        ).map_err(storage_err)?;
        Ok(conn.last_insert_rowid())
    }

    /// Chat history, oldest first. With a limit, the most recent `limit`
    /// entries are returned, still oldest first.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        self.query_logs(
            "SELECT user_message, bot_reply, intent, timestamp FROM (
                SELECT id, user_message, bot_reply, intent, timestamp FROM logs
                ORDER BY timestamp DESC, id DESC LIMIT ?1
             ) ORDER BY timestamp ASC, id ASC",
            limit,
        )
    }

    /// Admin view, newest first.
    pub fn recent_logs(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        self.query_logs(
            "SELECT user_message, bot_reply, intent, timestamp FROM logs
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
            limit,
        )
    }

    fn query_logs(&self, sql: &str, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(storage_err)?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(storage_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let (user_message, bot_reply, intent, ts) = row.map_err(storage_err)?;
            let intent = intent.parse::<Intent>().unwrap_or_else(|e| {
                tracing::warn!("⚠️ {e} in logs table, treating as ai");
                Intent::Ai
            });
            entries.push(LogEntry {
                user_message,
                bot_reply,
                intent,
                timestamp: parse_ts(&ts),
            });
        }
        Ok(entries)
    }

    pub fn log_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM logs", [], |r| r.get(0))
            .map_err(storage_err)?;
        Ok(n as usize)
    }

    // ── News ──────────────────────────────────────────────

    /// Insert a news item unless one with the same link already exists.
    /// Returns `true` when a row was written.
    pub fn insert_news_if_new(&self, item: &NewsItem) -> Result<bool> {
        if item.link.trim().is_empty() {
            return Ok(false);
        }
        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO news (title, link, summary, source, published, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.title,
                item.link,
                item.summary,
                item.source,
                item.published,
                format_ts(&item.timestamp),
            ],
        ).map_err(storage_err)?;
        Ok(changed > 0)
    }

    /// Most recently stored news, newest first.
    pub fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT title, link, summary, source, published, timestamp FROM news
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )
            .map_err(storage_err)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(NewsItem {
                    title: row.get(0)?,
                    link: row.get(1)?,
                    summary: row.get(2)?,
                    source: row.get(3)?,
                    published: row.get(4)?,
                    timestamp: parse_ts(&row.get::<_, String>(5)?),
                })
            })
            .map_err(storage_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(storage_err)
    }

    pub fn news_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM news", [], |r| r.get(0))
            .map_err(storage_err)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> CyberBotDb {
        CyberBotDb::open(Path::new(":memory:")).unwrap()
    }

    fn at(offset_secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + offset_secs, 0).unwrap()
    }

    fn entry_at(msg: &str, intent: Intent, offset_secs: i64) -> LogEntry {
        let mut e = LogEntry::new(msg, &format!("re: {msg}"), intent);
        e.timestamp = at(offset_secs);
        e
    }

    fn news(link: &str, offset_secs: i64) -> NewsItem {
        NewsItem {
            title: format!("Title {link}"),
            link: link.to_string(),
            summary: "summary".into(),
            source: "Test Feed".into(),
            published: "Mon, 01 Jan 2024 00:00:00 GMT".into(),
            timestamp: at(offset_secs),
        }
    }

    #[test]
    fn test_append_and_history_order() {
        let db = temp_db();
        db.append_log(&entry_at("second", Intent::Spam, 10)).unwrap();
        db.append_log(&entry_at("first", Intent::Ai, 0)).unwrap();
        db.append_log(&entry_at("third", Intent::Phishing, 20)).unwrap();

        let history = db.history(None).unwrap();
        let msgs: Vec<_> = history.iter().map(|e| e.user_message.as_str()).collect();
        assert_eq!(msgs, vec!["first", "second", "third"]);
        assert_eq!(history[2].intent, Intent::Phishing);

        let admin = db.recent_logs(None).unwrap();
        let msgs: Vec<_> = admin.iter().map(|e| e.user_message.as_str()).collect();
        assert_eq!(msgs, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_history_limit_keeps_latest_in_ascending_order() {
        let db = temp_db();
        for i in 0..5 {
            db.append_log(&entry_at(&format!("m{i}"), Intent::Ai, i)).unwrap();
        }
        let history = db.history(Some(2)).unwrap();
        let msgs: Vec<_> = history.iter().map(|e| e.user_message.as_str()).collect();
        assert_eq!(msgs, vec!["m3", "m4"]);

        let admin = db.recent_logs(Some(2)).unwrap();
        let msgs: Vec<_> = admin.iter().map(|e| e.user_message.as_str()).collect();
        assert_eq!(msgs, vec!["m4", "m3"]);
    }

    #[test]
    fn test_log_limit_edges() {
        let db = temp_db();
        for i in 0..3 {
            db.append_log(&entry_at(&format!("m{i}"), Intent::Ai, i)).unwrap();
        }
        assert!(db.history(Some(0)).unwrap().is_empty());
        assert!(db.recent_logs(Some(0)).unwrap().is_empty());
        assert_eq!(db.history(Some(usize::MAX)).unwrap().len(), 3);
        assert_eq!(db.recent_logs(Some(10)).unwrap().len(), 3);
    }

    #[test]
    fn test_log_roundtrip_preserves_fields() {
        let db = temp_db();
        let e = entry_at("What is phishing?", Intent::Learning, 42);
        db.append_log(&e).unwrap();
        let back = db.history(None).unwrap();
        assert_eq!(back, vec![e]);
        assert_eq!(db.log_count().unwrap(), 1);
    }

    #[test]
    fn test_news_dedup_by_link() {
        let db = temp_db();
        assert!(db.insert_news_if_new(&news("https://a.example/1", 0)).unwrap());
        assert!(!db.insert_news_if_new(&news("https://a.example/1", 5)).unwrap());
        assert!(db.insert_news_if_new(&news("https://a.example/2", 5)).unwrap());
        assert_eq!(db.news_count().unwrap(), 2);
    }

    #[test]
    fn test_news_empty_link_skipped() {
        let db = temp_db();
        assert!(!db.insert_news_if_new(&news("  ", 0)).unwrap());
        assert_eq!(db.news_count().unwrap(), 0);
    }

    #[test]
    fn test_latest_news_newest_first() {
        let db = temp_db();
        db.insert_news_if_new(&news("https://a.example/old", 0)).unwrap();
        db.insert_news_if_new(&news("https://a.example/new", 100)).unwrap();
        db.insert_news_if_new(&news("https://a.example/mid", 50)).unwrap();

        let latest = db.latest_news(2).unwrap();
        let links: Vec<_> = latest.iter().map(|n| n.link.as_str()).collect();
        assert_eq!(links, vec!["https://a.example/new", "https://a.example/mid"]);
        assert_eq!(latest[0].source, "Test Feed");
    }

    #[test]
    fn test_open_on_disk_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cyberbot.db");
        let db = CyberBotDb::open(&path).unwrap();
        db.append_log(&entry_at("hi", Intent::Ai, 0)).unwrap();
        drop(db);

        let reopened = CyberBotDb::open(&path).unwrap();
        assert_eq!(reopened.log_count().unwrap(), 1);
    }
}
