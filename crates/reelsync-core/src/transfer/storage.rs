//! Atomic placement of downloaded payloads.

use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Appends `.part` to the final path (`clip.mp4` → `clip.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `bytes` to `{dir}/{name}` via a `.part` file and rename, creating
/// `dir` as needed. Returns the final path.
pub async fn write_atomically(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let final_path = dir.join(name);
    let tmp = temp_path(&final_path);
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    tokio::fs::rename(&tmp, &final_path).await?;
    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("/tmp/clip.mp4"));
        assert_eq!(p.to_string_lossy(), "/tmp/clip.mp4.part");
    }

    #[tokio::test]
    async fn write_creates_dir_and_leaves_no_temp() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("natgeo");
        let path = write_atomically(&dir, "a_X.mp4", b"payload").await.unwrap();
        assert_eq!(path, dir.join("a_X.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let root = tempfile::tempdir().unwrap();
        write_atomically(root.path(), "f.mp4", b"old").await.unwrap();
        let path = write_atomically(root.path(), "f.mp4", b"newer").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"newer");
    }

    #[tokio::test]
    async fn long_multibyte_caption_name_is_writable() {
        let root = tempfile::tempdir().unwrap();
        let name = crate::naming::file_name(
            Some(&"\u{1D400}".repeat(100)),
            "C1a2B3c4D5e",
            "https://scontent.cdninstagram.com/v/t66/v.mp4",
        );
        assert!(name.len() + TEMP_SUFFIX.len() <= crate::naming::MAX_NAME_BYTES);
        let path = write_atomically(root.path(), &name, b"clip").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"clip");

        let cjk = crate::naming::file_name(Some(&"日".repeat(100)), "C1a2B3c4D5e", "https://x/v.webm");
        write_atomically(root.path(), &cjk, b"clip").await.unwrap();
    }
}
