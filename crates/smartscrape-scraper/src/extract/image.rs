//! Product image thumbnails.

use image::codecs::jpeg::JpegEncoder;
use image::ImageError;

/// Decodes `bytes`, shrinks the image to fit a `max_px` square keeping its
/// aspect ratio, converts it to RGB, and re-encodes it as JPEG at `quality`.
///
/// Images already inside the box are re-encoded without resizing.
///
/// # Errors
///
/// Returns [`ImageError`] when the bytes are not a decodable image or the
/// JPEG encoder fails.
pub fn make_thumbnail(bytes: &[u8], max_px: u32, quality: u8) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let fitted = if decoded.width() > max_px || decoded.height() > max_px {
        decoded.thumbnail(max_px, max_px)
    } else {
        decoded
    };
    let rgb = fitted.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out)
}
