//! Nitter-style feed pages
//!
//! Queries, URL building, rate-limit detection and timeline parsing. Pages are
//! plain HTML; items are delimited by the repeated `timeline-item` marker.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::models::Tweet;

/// Repeated structural marker present once per feed item
pub const TIMELINE_MARKER: &str = "class=\"timeline-item";

/// Lowercased substrings that identify a mirror's rate-limit page
const RATE_LIMIT_SIGNATURES: [&str; 3] = ["rate limited", "rate limit exceeded", "too many requests"];

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r#"class="username"[^>]*title="@([^"]+)""#).unwrap();
    static ref LINK_RE: Regex = Regex::new(r##"class="tweet-link"[^>]*href="([^"#]+)"##).unwrap();
    static ref DATE_RE: Regex = Regex::new(r#"class="tweet-date"[^>]*>\s*<a[^>]*title="([^"]+)""#).unwrap();
    static ref CONTENT_RE: Regex = Regex::new(r#"(?s)class="tweet-content[^"]*"[^>]*>(.*?)</div>"#).unwrap();
    static ref RETWEETS_RE: Regex = Regex::new(r#"icon-retweet[^>]*>\s*</span>\s*([0-9][0-9,.]*[KkMm]?)"#).unwrap();
    static ref LIKES_RE: Regex = Regex::new(r#"icon-heart[^>]*>\s*</span>\s*([0-9][0-9,.]*[KkMm]?)"#).unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref STATUS_429_RE: Regex = Regex::new(r"(?i)\b(?:error|status|http)\s*:?\s*429\b|<title>[^<]*\b429\b").unwrap();
}

/// One logical social resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedQuery {
    /// Timeline of the project's own account
    Profile { handle: String },
    /// Search for `$SYMBOL` mentions
    Ticker { symbol: String },
}

impl FeedQuery {
    pub fn profile(handle: impl Into<String>) -> Self {
        Self::Profile {
            handle: handle.into(),
        }
    }

    pub fn ticker(symbol: impl Into<String>) -> Self {
        Self::Ticker {
            symbol: symbol.into(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Profile { handle } => format!("@{}", handle),
            Self::Ticker { symbol } => format!("${}", symbol),
        }
    }

    /// Page URL on one mirror
    pub fn url_for(&self, mirror: &str) -> Option<String> {
        let base = mirror.trim_end_matches('/');
        let url = match self {
            Self::Profile { handle } => Url::parse(&format!("{}/{}", base, handle)).ok()?,
            Self::Ticker { symbol } => Url::parse_with_params(
                &format!("{}/search", base),
                &[("f", "tweets"), ("q", &format!("${}", symbol))],
            )
            .ok()?,
        };
        Some(url.to_string())
    }

    /// Semantic filter: profile items must be authored by the handle,
    /// search items must actually mention the ticker
    pub fn matches(&self, tweet: &Tweet) -> bool {
        match self {
            Self::Profile { handle } => tweet.author.eq_ignore_ascii_case(handle),
            Self::Ticker { symbol } => {
                let needle = format!("${}", symbol.to_lowercase());
                tweet.text.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Only the page chrome before the first item is inspected, so tweet text
/// mentioning rate limits or the number 429 never disqualifies a timeline
pub fn is_rate_limited(body: &str) -> bool {
    let chrome = body.split(TIMELINE_MARKER).next().unwrap_or(body);
    let lower = chrome.to_lowercase();
    RATE_LIMIT_SIGNATURES.iter().any(|sig| lower.contains(sig)) || STATUS_429_RE.is_match(chrome)
}

pub fn has_timeline_structure(body: &str) -> bool {
    body.contains(TIMELINE_MARKER)
}

/// Parse every structurally valid item, in page order
pub fn parse_timeline(body: &str) -> Vec<Tweet> {
    body.split(TIMELINE_MARKER)
        .skip(1)
        .filter_map(parse_item)
        .collect()
}

fn parse_item(chunk: &str) -> Option<Tweet> {
    let author = USERNAME_RE.captures(chunk)?.get(1)?.as_str().to_string();
    let raw_text = CONTENT_RE.captures(chunk)?.get(1)?.as_str();
    let text = clean_text(raw_text);
    if text.is_empty() {
        return None;
    }

    let url = LINK_RE
        .captures(chunk)
        .and_then(|c| c.get(1))
        .map(|m| format!("https://x.com{}", m.as_str()))
        .unwrap_or_default();
    let date = DATE_RE
        .captures(chunk)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let retweets = capture_count(&RETWEETS_RE, chunk);
    let likes = capture_count(&LIKES_RE, chunk);

    Some(Tweet {
        text,
        author,
        date,
        likes,
        retweets,
        url,
    })
}

fn capture_count(re: &Regex, chunk: &str) -> u64 {
    re.captures(chunk)
        .and_then(|c| c.get(1))
        .map(|m| parse_count(m.as_str()))
        .unwrap_or(0)
}

/// "1,234" -> 1234, "1.2K" -> 1200, "3M" -> 3000000
pub fn parse_count(raw: &str) -> u64 {
    let raw = raw.trim().replace(',', "");
    let (number, multiplier) = match raw.chars().last() {
        Some('K') | Some('k') => (&raw[..raw.len() - 1], 1_000.0),
        Some('M') | Some('m') => (&raw[..raw.len() - 1], 1_000_000.0),
        _ => (raw.as_str(), 1.0),
    };
    number
        .parse::<f64>()
        .map(|n| (n * multiplier).round() as u64)
        .unwrap_or(0)
}

fn clean_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_parse_timeline_items() {
        let page = timeline_page(&[
            ("bonk_inu", "The <a href=\"/search?q=%24BONK\">$BONK</a> army &amp; friends", 12, 340),
            ("someone", "gm", 0, 2),
        ]);
        let tweets = parse_timeline(&page);
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].author, "bonk_inu");
        assert_eq!(tweets[0].text, "The $BONK army & friends");
        assert_eq!(tweets[0].retweets, 12);
        assert_eq!(tweets[0].likes, 340);
        assert_eq!(tweets[0].url, "https://x.com/bonk_inu/status/0");
        assert!(tweets[0].date.contains("2025"));
    }

    #[test]
    fn test_page_classification() {
        assert!(has_timeline_structure(&timeline_page(&[("a", "b", 0, 0)])));
        assert!(!has_timeline_structure("<html><body>No items found</body></html>"));
        assert!(is_rate_limited(&rate_limited_page()));
    }

    #[test]
    fn test_rate_limit_signatures() {
        assert!(is_rate_limited("<html><body>You are being rate limited.</body></html>"));
        assert!(is_rate_limited("<html><body><h1>Too Many Requests</h1></body></html>"));
        assert!(is_rate_limited("<html><head><title>429</title></head><body>nginx</body></html>"));
        assert!(is_rate_limited("<html><body>Error 429: slow down</body></html>"));
        assert!(!is_rate_limited("<html><body>No items found</body></html>"));
    }

    #[test]
    fn test_item_text_never_reads_as_rate_limit() {
        let page = timeline_page(&[("dev", "got rate limited again, HTTP 429 everywhere", 429, 429)]);
        assert!(!is_rate_limited(&page));
        assert_eq!(parse_timeline(&page).len(), 1);
    }

    #[test]
    fn test_semantic_filters() {
        let tweet = Tweet {
            text: "Loading up on $bonk today".to_string(),
            author: "Trader".to_string(),
            date: String::new(),
            likes: 0,
            retweets: 0,
            url: String::new(),
        };
        assert!(FeedQuery::ticker("BONK").matches(&tweet));
        assert!(!FeedQuery::ticker("WIF").matches(&tweet));
        assert!(FeedQuery::profile("trader").matches(&tweet));
        assert!(!FeedQuery::profile("bonk_inu").matches(&tweet));
    }

    #[test]
    fn test_urls() {
        let url = FeedQuery::ticker("BONK").url_for("https://nitter.net/").unwrap();
        assert_eq!(url, "https://nitter.net/search?f=tweets&q=%24BONK");
        let url = FeedQuery::profile("bonk_inu").url_for("https://nitter.net").unwrap();
        assert_eq!(url, "https://nitter.net/bonk_inu");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,234"), 1234);
        assert_eq!(parse_count("1.2K"), 1200);
        assert_eq!(parse_count("3M"), 3_000_000);
        assert_eq!(parse_count("n/a"), 0);
    }
}
