//! Turning observed responses into the best rendition per logical asset.

use super::descriptor::{decode_descriptor, is_asset_url, UNKNOWN_QUALITY};
use crate::browser::{ObservedResponse, ResponsePredicate};
use std::sync::Arc;

/// Query parameters that select a byte range of the same asset.
const RANGE_PARAMS: &[&str] = &["bytestart", "byteend"];

/// One media rendition observed in network traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAsset {
    /// Normalized URL (range parameters removed).
    pub url: String,
    pub bitrate: u64,
    pub quality_tag: String,
}

/// Observer predicate: successful responses for CDN media containers.
pub fn asset_response_predicate() -> ResponsePredicate {
    Arc::new(|r: &ObservedResponse| (200..300).contains(&r.status) && is_asset_url(&r.url))
}

/// Removes byte-range parameters so chunked requests for the same asset
/// share one key. Unparseable URLs are returned unchanged.
pub fn normalize_url(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    // Filter raw pairs so signed parameters keep their exact encoding.
    let kept = match parsed.query() {
        Some(query) => query
            .split('&')
            .filter(|pair| {
                let key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
                !pair.is_empty() && !RANGE_PARAMS.contains(&key)
            })
            .collect::<Vec<_>>()
            .join("&"),
        None => return parsed.to_string(),
    };
    parsed.set_query(if kept.is_empty() { None } else { Some(&kept) });
    parsed.to_string()
}

/// Maps a response to a captured asset, or `None` for audio-only tracks.
/// URLs without a descriptor are kept with bitrate 0.
pub fn captured_from_response(response: &ObservedResponse) -> Option<CapturedAsset> {
    let (bitrate, quality_tag) = match decode_descriptor(&response.url) {
        Some(d) if d.is_audio_only() => return None,
        Some(d) => (d.bitrate, d.quality_tag),
        None => (0, UNKNOWN_QUALITY.to_string()),
    };
    Some(CapturedAsset {
        url: normalize_url(&response.url),
        bitrate,
        quality_tag,
    })
}

/// Keeps the highest-bitrate asset per normalized URL. Ties keep the first
/// seen. Output preserves first-seen order of keys.
pub fn best_by_normalized_url<I>(assets: I) -> Vec<CapturedAsset>
where
    I: IntoIterator<Item = CapturedAsset>,
{
    assets.into_iter().fold(Vec::new(), |mut best: Vec<CapturedAsset>, asset| {
        match best.iter_mut().find(|b| b.url == asset.url) {
            Some(existing) if asset.bitrate > existing.bitrate => *existing = asset,
            Some(_) => {}
            None => best.push(asset),
        }
        best
    })
}

/// Reduces a snapshot of responses to distinct renditions, highest bitrate first.
pub fn reduce_responses(responses: &[ObservedResponse]) -> Vec<CapturedAsset> {
    let mut assets = best_by_normalized_url(responses.iter().filter_map(captured_from_response));
    assets.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));
    assets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::response;
    use crate::resolver::descriptor::encode_descriptor;

    fn asset(url: &str, bitrate: u64) -> CapturedAsset {
        CapturedAsset {
            url: normalize_url(url),
            bitrate,
            quality_tag: UNKNOWN_QUALITY.to_string(),
        }
    }

    #[test]
    fn normalize_strips_range_params_only() {
        assert_eq!(
            normalize_url("https://a.cdninstagram.com/x.mp4?efg=abc&bytestart=0&byteend=999&oh=1"),
            "https://a.cdninstagram.com/x.mp4?efg=abc&oh=1"
        );
        assert_eq!(
            normalize_url("https://a.cdninstagram.com/x.mp4?bytestart=100"),
            "https://a.cdninstagram.com/x.mp4"
        );
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn range_requests_collapse_to_max_bitrate() {
        let best = best_by_normalized_url(vec![
            asset("https://a.cdninstagram.com/a.mp4?bytestart=0", 5),
            asset("https://a.cdninstagram.com/a.mp4?bytestart=100", 9),
        ]);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].bitrate, 9);
    }

    #[test]
    fn ties_keep_first_seen() {
        let mut first = asset("https://a.cdninstagram.com/a.mp4", 5);
        first.quality_tag = "first".to_string();
        let mut second = asset("https://a.cdninstagram.com/a.mp4", 5);
        second.quality_tag = "second".to_string();
        let best = best_by_normalized_url(vec![first, second]);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].quality_tag, "first");
    }

    #[test]
    fn reduce_drops_audio_and_sorts_descending() {
        let video_lo = format!(
            "https://a.cdninstagram.com/lo.mp4?efg={}&bytestart=0",
            encode_descriptor(r#"{"vencode_tag":"C3.480.dash_baseline","bitrate":400000}"#)
        );
        let video_hi = format!(
            "https://a.cdninstagram.com/hi.mp4?efg={}",
            encode_descriptor(r#"{"vencode_tag":"C3.720.dash_baseline","bitrate":1200000}"#)
        );
        let audio = format!(
            "https://a.cdninstagram.com/aud.mp4?efg={}",
            encode_descriptor(r#"{"vencode_tag":"dash_ln_heaac_vbr3_audio","bitrate":66000}"#)
        );
        let assets = reduce_responses(&[response(&video_lo), response(&audio), response(&video_hi)]);
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].bitrate, 1_200_000);
        assert_eq!(assets[1].bitrate, 400_000);
        assert!(!assets[1].url.contains("bytestart"));
    }

    #[test]
    fn predicate_requires_success_and_asset_url() {
        let p = asset_response_predicate();
        assert!(p(&response("https://a.cdninstagram.com/x.mp4")));
        let mut failed = response("https://a.cdninstagram.com/x.mp4");
        failed.status = 403;
        assert!(!p(&failed));
        assert!(!p(&response("https://www.instagram.com/reel/X/")));
    }
}
