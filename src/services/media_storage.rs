use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Write an uploaded file under `<media_root>/uploads/<year>/<month>/` with a
/// uuid prefix so distinct uploads of the same file name never collide.
/// Returns the path relative to the media root, which is what gets persisted.
pub fn store_upload(media_root: &str, file_name: &str, data: &[u8]) -> Result<String> {
    let now = Utc::now();
    let relative_dir = format!("uploads/{}/{:02}", now.format("%Y"), now.format("%m"));
    let dir = Path::new(media_root).join(&relative_dir);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

    let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(file_name));
    let full_path: PathBuf = dir.join(&stored_name);
    fs::write(&full_path, data)
        .with_context(|| format!("Failed to write upload {}", full_path.display()))?;

    Ok(format!("{}/{}", relative_dir, stored_name))
}

/// Keep only characters safe for a flat file name; path separators and
/// anything exotic become underscores.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("reef photo.jpg"), "reef_photo.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("dive-01_video.mp4"), "dive-01_video.mp4");
        assert_eq!(sanitize_file_name("___"), "upload");
    }

    #[test]
    fn test_store_upload_partitions_by_date() {
        let tmp = std::env::temp_dir().join(format!("reefguard-test-{}", Uuid::new_v4()));
        let media_root = tmp.to_string_lossy().to_string();

        let relative = store_upload(&media_root, "reef.jpg", b"fake-bytes").unwrap();
        let now = Utc::now();
        let expected_prefix = format!("uploads/{}/{:02}/", now.format("%Y"), now.format("%m"));
        assert!(relative.starts_with(&expected_prefix), "got {}", relative);
        assert!(relative.ends_with("_reef.jpg"));

        let stored = std::fs::read(Path::new(&media_root).join(&relative)).unwrap();
        assert_eq!(stored, b"fake-bytes");

        std::fs::remove_dir_all(&tmp).ok();
    }
}
