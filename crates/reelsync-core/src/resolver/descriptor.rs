//! Quality descriptors embedded in CDN media URLs.
//!
//! Media URLs carry an `efg` query parameter: base64 JSON such as
//! `{"vencode_tag":"...C3.720.dash_baseline_1_v1","bitrate":1026470}`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

const DESCRIPTOR_PARAM: &str = "efg";
const ASSET_HOST_SUFFIXES: &[&str] = &["cdninstagram.com", "fbcdn.net"];
const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".m4v", ".mov", ".webm"];
/// Substrings of a quality tag that mark an audio-only rendition.
const AUDIO_TOKENS: &[&str] = &["audio", "heaac"];

pub const UNKNOWN_QUALITY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub bitrate: u64,
    pub quality_tag: String,
}

impl AssetDescriptor {
    /// Heuristic: matches known tokens in the quality tag. Upstream format
    /// changes can make this miss audio tracks or drop real video.
    pub fn is_audio_only(&self) -> bool {
        let tag = self.quality_tag.to_ascii_lowercase();
        AUDIO_TOKENS.iter().any(|t| tag.contains(t))
    }
}

/// True for media-container URLs served from the asset CDN.
pub fn is_asset_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let host_ok = parsed
        .host_str()
        .map(|h| ASSET_HOST_SUFFIXES.iter().any(|s| h == *s || h.ends_with(&format!(".{s}"))))
        .unwrap_or(false);
    let path = parsed.path().to_ascii_lowercase();
    host_ok && MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Decodes the `efg` descriptor of an asset URL. `None` if the parameter is
/// missing or not base64 JSON.
pub fn decode_descriptor(url: &str) -> Option<AssetDescriptor> {
    let parsed = url::Url::parse(url).ok()?;
    let raw = parsed
        .query_pairs()
        .find(|(k, _)| k == DESCRIPTOR_PARAM)
        .map(|(_, v)| v.into_owned())?;

    // Accept standard or URL-safe alphabets, padded or not.
    let normalized: String = raw
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            // A raw '+' arrives as a space after query decoding.
            '+' | ' ' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized.as_bytes()).ok()?;
    let json: Value = serde_json::from_slice(&bytes).ok()?;

    let bitrate = match json.get("bitrate") {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .unwrap_or(0);
    let quality_tag = json
        .get("vencode_tag")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_QUALITY)
        .to_string();

    Some(AssetDescriptor {
        bitrate,
        quality_tag,
    })
}

#[cfg(test)]
pub(crate) fn encode_descriptor(json: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(json)
}
