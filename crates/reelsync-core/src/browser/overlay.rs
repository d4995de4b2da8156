//! Login/consent overlays and playback nudges.

use super::scripts;
use super::BrowserPage;

/// Tries to close a login or cookie overlay. Clicks a known dismiss control,
/// falling back to an `Escape` key press. Never fails.
pub async fn dismiss_overlay(page: &dyn BrowserPage) -> bool {
    match page.evaluate(scripts::DISMISS_OVERLAY).await {
        Ok(v) if v.as_bool() == Some(true) => {
            tracing::debug!("dismissed overlay via button");
            return true;
        }
        Ok(_) => {}
        Err(e) => tracing::debug!("overlay probe failed: {}", e),
    }
    if let Err(e) = page.press_key("Escape").await {
        tracing::debug!("escape key press failed: {}", e);
        return false;
    }
    false
}

/// Simulates a user starting playback. Returns true if a control or video was found.
pub async fn start_playback(page: &dyn BrowserPage) -> bool {
    match page.click(scripts::PLAY_CONTROL).await {
        Ok(true) => return true,
        Ok(false) => {}
        Err(e) => tracing::debug!("play control click failed: {}", e),
    }
    matches!(
        page.evaluate(scripts::PLAY_VIDEO).await,
        Ok(v) if v.as_bool() == Some(true)
    )
}
