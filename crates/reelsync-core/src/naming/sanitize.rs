//! Caption → filename stem sanitization.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum caption-derived characters before the `_{shortCode}` suffix.
pub const MAX_STEM_CHARS: usize = 80;

/// Filename limit of Linux filesystems, in bytes.
pub const MAX_NAME_BYTES: usize = 255;

/// Room kept after `{stem}_{shortCode}` for the longest extension (`.webm`)
/// plus the `.part` temp suffix.
const TAIL_RESERVE_BYTES: usize = 10;

const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[#@][\p{L}\p{N}_.]*").expect("valid tag regex"))
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF   // pictographs, emoticons, transport, flags, symbols
        | 0x2600..=0x27BF   // misc symbols, dingbats
        | 0x2B00..=0x2BFF   // arrows, stars
        | 0x2300..=0x23FF   // technical (⌚, ⏰)
        | 0x00A9 | 0x00AE   // © ®
        | 0x203C | 0x2049   // ‼ ⁉
        | 0x2122 | 0x2139   // ™ ℹ
        | 0x2194..=0x21AA   // ↔ .. ↪
        | 0x2934 | 0x2935   // ⤴ ⤵
        | 0x24C2            // Ⓜ
        | 0x25AA..=0x25FE   // ▪ ▶ ◀ ◻ ◼
        | 0xFE00..=0xFE0F   // variation selectors
        | 0x200D            // zero-width joiner
        | 0x20E3            // keycap
        | 0x3030 | 0x303D | 0x3297 | 0x3299
        | 0xE0020..=0xE007F // tag sequences
    )
}

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c == '.' || c.is_whitespace()
}

/// Builds `{stem}_{short_code}` from a caption, or just `short_code` when the
/// caption has nothing usable left after cleaning.
///
/// - Removes `#hashtags`, `@mentions`, emoji, control chars and `/ \ : * ? " < > |`
/// - Collapses whitespace and underscore runs into a single `_`
/// - Trims separators at both ends
/// - Truncates to [`MAX_STEM_CHARS`] characters, and further on a char
///   boundary so the final name plus `.part` fits in [`MAX_NAME_BYTES`]
pub fn file_stem(caption: &str, short_code: &str) -> String {
    let without_tags = tag_regex().replace_all(caption, " ");

    let mut out = String::with_capacity(without_tags.len());
    let mut prev_underscore = false;
    for c in without_tags.chars() {
        if is_emoji(c) {
            continue;
        }
        let mapped = if c.is_whitespace() || c.is_control() || RESERVED.contains(&c) || c == '_' {
            '_'
        } else {
            c
        };
        if mapped == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(mapped);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(is_separator);
    let byte_budget = MAX_NAME_BYTES.saturating_sub(TAIL_RESERVE_BYTES + 1 + short_code.len());
    let stem = truncate_to(trimmed, MAX_STEM_CHARS, byte_budget).trim_matches(is_separator);

    if stem.is_empty() {
        short_code.to_string()
    } else {
        format!("{stem}_{short_code}")
    }
}

/// Longest prefix of `s` with at most `max_chars` chars and `max_bytes` bytes.
fn truncate_to(s: &str, max_chars: usize, max_bytes: usize) -> &str {
    let mut end = 0;
    for (i, (idx, c)) in s.char_indices().enumerate() {
        if i == max_chars || idx + c.len_utf8() > max_bytes {
            break;
        }
        end = idx + c.len_utf8();
    }
    &s[..end]
}
