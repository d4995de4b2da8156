//! Post links and their shortcodes.

use std::fmt;

/// Path segments that precede a shortcode in a post URL.
const POST_PATH_KINDS: &[&str] = &["p", "reel", "reels", "tv"];

/// URL of a single post. Always carries a shortcode; two links with the same
/// shortcode refer to the same post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostLink {
    url: String,
    short_code: String,
}

impl PostLink {
    /// Parses an absolute post URL. Returns `None` when no shortcode is present.
    pub fn parse(url: &str) -> Option<Self> {
        let short_code = short_code_from_url(url)?;
        Some(Self {
            url: url.to_string(),
            short_code,
        })
    }

    /// Parses an anchor `href`, which may be site-relative (`/reel/ABC/`).
    /// The link is rewritten to its canonical `{site}/reel/{code}/` form.
    pub fn from_href(site_base_url: &str, href: &str) -> Option<Self> {
        let base = url::Url::parse(site_base_url).ok()?;
        let absolute = base.join(href).ok()?;
        let short_code = short_code_from_url(absolute.as_str())?;
        Some(Self::canonical(site_base_url, &short_code))
    }

    pub fn canonical(site_base_url: &str, short_code: &str) -> Self {
        Self {
            url: format!(
                "{}/reel/{}/",
                site_base_url.trim_end_matches('/'),
                short_code
            ),
            short_code: short_code.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn short_code(&self) -> &str {
        &self.short_code
    }
}

impl fmt::Display for PostLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Extracts the shortcode from `/p/{code}`, `/reel/{code}`, `/reels/{code}` or
/// `/tv/{code}` anywhere in the URL path (profile prefixes are allowed).
pub fn short_code_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    segments
        .windows(2)
        .find(|w| POST_PATH_KINDS.contains(&w[0]) && is_short_code(w[1]))
        .map(|w| w[1].to_string())
}

fn is_short_code(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
