use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::retry::RetryPolicy;

/// Desktop Chrome UA used for pages and asset transfers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per transfer (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// Headless browser timings and identity (`[browser]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub navigation_timeout_secs: u64,
    /// Observation window after page load before giving up on assets.
    pub settle_delay_ms: u64,
    /// Second, shorter window after simulating a play click.
    pub play_settle_delay_ms: u64,
    /// Wait after each scroll for lazy-loaded posts.
    pub scroll_delay_ms: u64,
    pub user_agent: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout_secs: 30,
            settle_delay_ms: 4000,
            play_settle_delay_ms: 2500,
            scroll_delay_ms: 1500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl BrowserSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn play_settle_delay(&self) -> Duration {
        Duration::from_millis(self.play_settle_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

/// A profile whose reels are synced on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedUser {
    pub handle: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides `default_max_videos` for this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_videos: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl TrackedUser {
    pub fn new(handle: &str) -> Self {
        Self {
            handle: normalize_handle(handle),
            enabled: true,
            max_videos: None,
            note: None,
        }
    }
}

/// Global configuration loaded from `~/.config/reelsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory; each handle gets its own subdirectory.
    pub download_dir: PathBuf,
    /// Posts collected per profile when a user has no override.
    pub default_max_videos: usize,
    /// Wall-clock limit for scrolling a profile feed.
    pub scroll_timeout_secs: u64,
    /// Number of transfers run concurrently.
    pub batch_size: usize,
    /// Base URL for profile and post pages; also sent as Referer on transfers.
    pub site_base_url: String,
    #[serde(default)]
    pub browser: BrowserSettings,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub users: Vec<TrackedUser>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            default_max_videos: 12,
            scroll_timeout_secs: 60,
            batch_size: 3,
            site_base_url: "https://www.instagram.com".to_string(),
            browser: BrowserSettings::default(),
            retry: None,
            users: Vec::new(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    xdg::BaseDirectories::with_prefix("reelsync")
        .map(|dirs| dirs.get_data_home().join("reelsync").join("videos"))
        .unwrap_or_else(|_| PathBuf::from("reelsync-videos"))
}

/// Strip a leading `@` and lowercase; handles are case-insensitive upstream.
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

/// Normalized handle, if it is usable as a directory name under the download
/// root: ASCII letters, digits, `.` and `_` only, and neither `.` nor `..`.
pub fn validate_handle(handle: &str) -> Result<String, CoreError> {
    let normalized = normalize_handle(handle);
    let allowed = normalized
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if normalized.is_empty() || normalized == "." || normalized == ".." || !allowed {
        return Err(CoreError::Config(format!("invalid handle {handle:?}")));
    }
    Ok(normalized)
}

impl AppConfig {
    pub fn scroll_timeout(&self) -> Duration {
        Duration::from_secs(self.scroll_timeout_secs)
    }

    /// Transfer retry policy from the `[retry]` section, or defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.clone().unwrap_or_default();
        RetryPolicy {
            max_attempts: retry.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(retry.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(retry.max_delay_secs),
        }
    }

    pub fn max_videos_for(&self, user: &TrackedUser) -> usize {
        user.max_videos.unwrap_or(self.default_max_videos)
    }

    pub fn find_user(&self, handle: &str) -> Option<&TrackedUser> {
        let handle = normalize_handle(handle);
        self.users.iter().find(|u| u.handle == handle)
    }

    pub fn enabled_users(&self) -> impl Iterator<Item = &TrackedUser> {
        self.users.iter().filter(|u| u.enabled)
    }

    /// Track a new handle. Fails if it is already tracked.
    pub fn add_user(&mut self, user: TrackedUser) -> Result<(), CoreError> {
        let user = TrackedUser {
            handle: validate_handle(&user.handle)?,
            ..user
        };
        if self.find_user(&user.handle).is_some() {
            return Err(CoreError::Config(format!(
                "user @{} is already tracked",
                user.handle
            )));
        }
        self.users.push(user);
        Ok(())
    }

    /// Stop tracking a handle. Returns the removed entry.
    pub fn remove_user(&mut self, handle: &str) -> Result<TrackedUser, CoreError> {
        let handle = normalize_handle(handle);
        let idx = self
            .users
            .iter()
            .position(|u| u.handle == handle)
            .ok_or_else(|| CoreError::Config(format!("user @{handle} is not tracked")))?;
        Ok(self.users.remove(idx))
    }

    pub fn set_enabled(&mut self, handle: &str, enabled: bool) -> Result<(), CoreError> {
        let handle = normalize_handle(handle);
        let user = self
            .users
            .iter_mut()
            .find(|u| u.handle == handle)
            .ok_or_else(|| CoreError::Config(format!("user @{handle} is not tracked")))?;
        user.enabled = enabled;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("reelsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_cfg = AppConfig::default();
        save_to_path(&default_cfg, path)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

pub fn load_from_path(path: &Path) -> Result<AppConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&data)?;
    Ok(cfg)
}

pub fn save_to_path(cfg: &AppConfig, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}

/// Persist to the default location.
pub fn save(cfg: &AppConfig) -> Result<()> {
    save_to_path(cfg, &config_path()?)
}
