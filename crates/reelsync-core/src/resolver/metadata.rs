//! Best-effort post metadata scraped from page markup.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostMetadata {
    pub caption: Option<String>,
    pub author: Option<String>,
    pub view_count: Option<u64>,
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""username"\s*:\s*"([A-Za-z0-9._]+)""#).expect("valid username regex"))
}

fn handle_in_parens_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(@([A-Za-z0-9._]+)\)").expect("valid handle regex"))
}

fn description_author_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" - ([A-Za-z0-9._]+) on ").expect("valid author regex"))
}

fn view_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""(?:video_view_count|play_count|view_count)"\s*:\s*(\d+)"#)
            .expect("valid view count regex")
    })
}

impl PostMetadata {
    /// Extracts caption, author handle and view count. Missing pieces are `None`.
    pub fn from_html(html: &str) -> Self {
        let meta = meta_properties(html);
        let title = meta.get("og:title").map(String::as_str);
        let description = meta
            .get("og:description")
            .or_else(|| meta.get("description"))
            .map(String::as_str);

        let caption = title
            .and_then(quoted_tail)
            .or_else(|| description.and_then(quoted_tail));

        let author = title
            .and_then(|t| capture(handle_in_parens_regex(), t))
            .or_else(|| capture(username_regex(), html))
            .or_else(|| description.and_then(|d| capture(description_author_regex(), d)));

        let view_count = capture(view_count_regex(), html).and_then(|v| v.parse().ok());

        Self {
            caption,
            author,
            view_count,
        }
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `property`/`name` → `content` for every meta tag, entities decoded.
fn meta_properties(html: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Ok(selector) = Selector::parse("meta[content]") else {
        return out;
    };
    let document = Html::parse_document(html);
    for meta in document.select(&selector) {
        let el = meta.value();
        let Some(key) = el.attr("property").or_else(|| el.attr("name")) else {
            continue;
        };
        if let Some(content) = el.attr("content") {
            out.entry(key.to_ascii_lowercase())
                .or_insert_with(|| content.to_string());
        }
    }
    out
}

/// Text inside the quotes after `: "`, e.g. `Name on Instagram: "caption"`.
fn quoted_tail(text: &str) -> Option<String> {
    let start = text.find(": \"")? + 3;
    let rest = &text[start..];
    let end = rest.rfind('"').unwrap_or(rest.len());
    let caption = rest[..end].trim();
    if caption.is_empty() {
        None
    } else {
        Some(caption.to_string())
    }
}
