use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::models::gallery_item::MediaType;

pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];
const ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "mp4", "mov"];

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("File type '{0}' is not allowed. Allowed: JPG, PNG, GIF, MP4, MOV")]
    DisallowedExtension(String),
    #[error("You selected \"Photo\" but uploaded a video file. Please select \"Video\" as media type.")]
    VideoFileForPhoto,
    #[error("You selected \"Video\" but uploaded an image file. Please select \"Photo\" as media type.")]
    ImageFileForVideo,
    #[error("File too large. Maximum size is {0} MB.")]
    TooLarge(usize),
    #[error("File name has no extension")]
    MissingExtension,
}

fn file_extension(file_name: &str) -> Option<String> {
    let ext = file_name.rsplit('.').next()?;
    if ext == file_name || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Validate an upload against the declared media type: extension allow-list,
/// extension/media-type consistency, and size ceilings (10MB photo, 50MB video).
pub fn validate_upload(
    file_name: &str,
    size_bytes: usize,
    media_type: &MediaType,
) -> std::result::Result<(), UploadError> {
    let ext = file_extension(file_name).ok_or(UploadError::MissingExtension)?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadError::DisallowedExtension(ext));
    }

    match media_type {
        MediaType::Photo if VIDEO_EXTENSIONS.contains(&ext.as_str()) => {
            return Err(UploadError::VideoFileForPhoto);
        }
        MediaType::Video if IMAGE_EXTENSIONS.contains(&ext.as_str()) => {
            return Err(UploadError::ImageFileForVideo);
        }
        _ => {}
    }

    let max = match media_type {
        MediaType::Photo => MAX_PHOTO_BYTES,
        MediaType::Video => MAX_VIDEO_BYTES,
    };
    if size_bytes > max {
        return Err(UploadError::TooLarge(max / (1024 * 1024)));
    }

    Ok(())
}

/// Validate reef coordinates and dimensions.
pub fn validate_reef_geometry(
    latitude: f64,
    longitude: f64,
    area_km2: f64,
    depth_meters: f64,
) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(anyhow!("Latitude must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!("Longitude must be between -180 and 180"));
    }
    if area_km2 < 0.0 {
        return Err(anyhow!("Area must not be negative"));
    }
    if depth_meters < 0.0 {
        return Err(anyhow!("Depth must not be negative"));
    }
    Ok(())
}

/// Validate username (alphanumeric, hyphens, underscores, 1-150 chars).
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > 150 {
        return Err(anyhow!("Username must be between 1 and 150 characters"));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!(
            "Username can only contain alphanumeric characters, hyphens, and underscores"
        ));
    }

    Ok(())
}

/// Validate an article slug (lowercase alphanumeric and hyphens, 1-200 chars).
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 200 {
        return Err(anyhow!("Slug must be between 1 and 200 characters"));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(anyhow!(
            "Slug can only contain lowercase letters, digits, and hyphens"
        ));
    }

    Ok(())
}

/// Escape LIKE wildcards in a user-supplied search term so the term is
/// matched literally.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_extension_allow_list() {
        assert!(validate_upload("reef.jpg", 1024, &MediaType::Photo).is_ok());
        assert!(validate_upload("dive.mov", 1024, &MediaType::Video).is_ok());
        assert_eq!(
            validate_upload("notes.txt", 1024, &MediaType::Photo),
            Err(UploadError::DisallowedExtension("txt".to_string()))
        );
        assert_eq!(
            validate_upload("noext", 1024, &MediaType::Photo),
            Err(UploadError::MissingExtension)
        );
    }

    #[test]
    fn test_upload_media_type_mismatch() {
        assert_eq!(
            validate_upload("photo.mp4", 1024, &MediaType::Photo),
            Err(UploadError::VideoFileForPhoto)
        );
        assert_eq!(
            validate_upload("clip.jpg", 1024, &MediaType::Video),
            Err(UploadError::ImageFileForVideo)
        );
    }

    #[test]
    fn test_upload_size_ceilings() {
        assert!(validate_upload("reef.jpg", MAX_PHOTO_BYTES, &MediaType::Photo).is_ok());
        assert_eq!(
            validate_upload("reef.jpg", MAX_PHOTO_BYTES + 1, &MediaType::Photo),
            Err(UploadError::TooLarge(10))
        );
        assert!(validate_upload("dive.mp4", MAX_PHOTO_BYTES + 1, &MediaType::Video).is_ok());
        assert_eq!(
            validate_upload("dive.mp4", MAX_VIDEO_BYTES + 1, &MediaType::Video),
            Err(UploadError::TooLarge(50))
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(
            validate_upload("PHOTO.MP4", 1024, &MediaType::Photo),
            Err(UploadError::VideoFileForPhoto)
        );
        assert!(validate_upload("REEF.JPG", 1024, &MediaType::Photo).is_ok());
    }

    #[test]
    fn test_validate_reef_geometry() {
        assert!(validate_reef_geometry(-18.2871, 147.6992, 344.4, 35.0).is_ok());
        assert!(validate_reef_geometry(90.0, -180.0, 0.0, 0.0).is_ok());
        assert!(validate_reef_geometry(90.1, 0.0, 1.0, 1.0).is_err());
        assert!(validate_reef_geometry(0.0, 180.5, 1.0, 1.0).is_err());
        assert!(validate_reef_geometry(0.0, 0.0, -1.0, 1.0).is_err());
        assert!(validate_reef_geometry(0.0, 0.0, 1.0, -0.1).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("reef_watcher-1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("user@example").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("coral-bleaching-101").is_ok());
        assert!(validate_slug("Coral-Bleaching").is_err());
        assert!(validate_slug("slug with spaces").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_sale"), "50\\% off\\_sale");
        assert_eq!(escape_like("plain"), "plain");
    }
}
