use crate::error::ScanError;

use super::ImageFile;

const INVALID_IMAGE: &str = "Please select a valid image file";

/// Reject inputs that are not images or exceed `max_bytes`.
///
/// A declared media type must be `image/*`. Without one, the leading bytes
/// must look like a known raster format.
pub fn validate_image(file: &ImageFile, max_bytes: u64) -> Result<(), ScanError> {
    if file.is_empty() {
        return Err(ScanError::InvalidFile(INVALID_IMAGE.into()));
    }

    let looks_like_image = match file.media_type.as_deref().map(str::trim) {
        Some(media_type) if !media_type.is_empty() => media_type
            .to_ascii_lowercase()
            .starts_with("image/"),
        _ => image::guess_format(&file.bytes).is_ok(),
    };
    if !looks_like_image {
        return Err(ScanError::InvalidFile(INVALID_IMAGE.into()));
    }

    if file.len() as u64 > max_bytes {
        return Err(ScanError::InvalidFile(format!(
            "File size must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}
