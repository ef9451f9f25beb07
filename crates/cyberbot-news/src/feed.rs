//! Minimal RSS 2.0 / Atom parsing.
//!
//! Only the four fields CyberBot stores are extracted. The parser is
//! tolerant: anything it cannot read becomes an empty string rather than
//! an error.

use regex::Regex;
use std::sync::LazyLock;

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<(item|entry)\b[^>]*>(.*?)</(?:item|entry)>").unwrap());
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<link\b[^>]*?\bhref\s*=\s*["']([^"']*)["']"#).unwrap());
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());

/// One article as found in the feed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: String,
}

/// Parse up to `limit` entries, in document order.
pub fn parse_feed(xml: &str, limit: usize) -> Vec<FeedEntry> {
    ITEM_RE
        .captures_iter(xml)
        .take(limit)
        .map(|cap| {
            let block = cap.get(2).map_or("", |m| m.as_str());
            FeedEntry {
                title: first_text(block, &["title"]).map(|t| clean_text(&t)).unwrap_or_default(),
                link: entry_link(block),
                summary: first_text(block, &["description", "summary", "content"])
                    .map(|s| clean_html(&s))
                    .unwrap_or_default(),
                published: first_text(block, &["pubDate", "published", "updated", "dc:date"])
                    .map(|p| clean_text(&p))
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// RSS puts the URL in `<link>` text, Atom in `<link href="...">`.
fn entry_link(block: &str) -> String {
    if let Some(text) = element_text(block, "link").map(|t| clean_text(&t)) {
        if !text.is_empty() {
            return text;
        }
    }
    HREF_RE
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()).trim().to_string())
        .unwrap_or_default()
}

fn first_text(block: &str, tags: &[&str]) -> Option<String> {
    tags.iter().find_map(|tag| element_text(block, tag))
}

/// Inner text of the first `<tag ...>...</tag>` element, if any.
fn element_text(block: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search_from = 0;

    while let Some(rel) = block[search_from..].find(&open) {
        let start = search_from + rel;
        let after_name = start + open.len();
        search_from = after_name;

        // `<link` must not match `<linkage>`
        match block[after_name..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_whitespace() => {}
            _ => continue,
        }
        let tag_end = after_name + block[after_name..].find('>')?;
        if block[..tag_end].ends_with('/') {
            continue;
        }
        let body_start = tag_end + 1;
        let body_end = body_start + block[body_start..].find(&close)?;
        return Some(block[body_start..body_end].to_string());
    }
    None
}

fn unwrap_cdata(s: &str) -> String {
    CDATA_RE.replace_all(s, "$1").into_owned()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_text(s: &str) -> String {
    collapse_whitespace(&decode_entities(&unwrap_cdata(s)))
}

/// Summaries are often escaped HTML: decode first, then drop the markup.
fn clean_html(s: &str) -> String {
    let decoded = decode_entities(&unwrap_cdata(s));
    collapse_whitespace(&TAG_RE.replace_all(&decoded, " "))
}

fn decode_entities(s: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(s, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
