//! Deterministic local filenames for downloaded posts.
//!
//! Names are `{stem}_{shortCode}.{ext}` where the stem is derived from the
//! caption, sanitized for Linux filesystems.

mod sanitize;

pub use sanitize::{file_stem, MAX_NAME_BYTES, MAX_STEM_CHARS};

/// Extension used when the asset URL path has none we recognize.
const DEFAULT_EXTENSION: &str = "mp4";

const KNOWN_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm"];

/// Extension of the asset URL path, lowercased, if it is a known container.
pub fn extension_from_url(url: &str) -> &'static str {
    let ext = url::Url::parse(url).ok().and_then(|u| {
        let last = u.path_segments()?.filter(|s| !s.is_empty()).last()?.to_string();
        let (_, ext) = last.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    });
    match ext {
        Some(e) => KNOWN_EXTENSIONS
            .iter()
            .copied()
            .find(|k| *k == e)
            .unwrap_or(DEFAULT_EXTENSION),
        None => DEFAULT_EXTENSION,
    }
}

/// Final filename for a post: `{file_stem}.{ext}`.
pub fn file_name(caption: Option<&str>, short_code: &str, asset_url: &str) -> String {
    format!(
        "{}.{}",
        file_stem(caption.unwrap_or(""), short_code),
        extension_from_url(asset_url)
    )
}
