//! # CyberBot News
//!
//! Pulls security news from RSS/Atom feeds, stores new articles (unique by
//! link) and renders a short digest for the chat reply.

pub mod client;
pub mod feed;
pub mod service;

pub use client::HttpFeedClient;
pub use feed::{FeedEntry, parse_feed};
pub use service::{FetchReport, NewsService};
