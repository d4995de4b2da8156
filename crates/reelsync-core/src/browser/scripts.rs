//! Page scripts evaluated through [`super::BrowserPage::evaluate`].

/// Returns the `href` of every post anchor currently in the DOM.
pub(crate) const POST_ANCHORS: &str = r#"
Array.from(document.querySelectorAll('a[href*="/reel/"], a[href*="/p/"]'))
    .map(a => a.getAttribute('href'))
    .filter(h => !!h)
"#;

/// Scrolls to the bottom of the document.
pub(crate) const SCROLL_TO_BOTTOM: &str = r#"
(() => { window.scrollTo(0, document.body.scrollHeight); return true; })()
"#;

/// Clicks the first visible button whose text is a known dismiss label.
/// Returns whether anything was clicked.
pub(crate) const DISMISS_OVERLAY: &str = r#"
(() => {
    const labels = ['not now', 'close', 'cancel', 'decline optional cookies',
                    'only allow essential cookies', 'allow all cookies'];
    const candidates = document.querySelectorAll('button, [role="button"], [aria-label="Close"]');
    for (const el of candidates) {
        const text = (el.innerText || el.getAttribute('aria-label') || '').trim().toLowerCase();
        if (labels.includes(text) && el.offsetParent !== null) {
            el.click();
            return true;
        }
    }
    return false;
})()
"#;

/// Selector of the inline play control on a post page.
pub(crate) const PLAY_CONTROL: &str = r#"[aria-label="Play"], div[role="button"] svg[aria-label="Play"], video"#;

/// Starts playback of the first video element directly.
pub(crate) const PLAY_VIDEO: &str = r#"
(() => {
    const v = document.querySelector('video');
    if (!v) { return false; }
    v.muted = true;
    const p = v.play();
    if (p && p.catch) { p.catch(() => {}); }
    return true;
})()
"#;
