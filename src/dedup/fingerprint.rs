use crate::utils::constants::FINGERPRINT_EDGE;
use image::{imageops::FilterType, DynamicImage};
use sha2::{Digest, Sha256};

/// Fingerprint a raw downloaded payload.
///
/// Catches byte-identical re-downloads of the same content served from
/// different URLs.
pub fn payload_fingerprint(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Fingerprint a decoded image by its normalized pixel content.
///
/// The image is reduced to a fixed-size single-channel luminance buffer
/// before hashing, so re-encodings of the same visual content collide while
/// any geometric change (flip, rotation, crop) produces a distinct digest.
pub fn image_fingerprint(image: &DynamicImage) -> String {
    let reduced = image
        .resize_exact(FINGERPRINT_EDGE, FINGERPRINT_EDGE, FilterType::Triangle)
        .to_luma8();

    let mut hasher = Sha256::new();
    hasher.update(reduced.as_raw());
    hex::encode(hasher.finalize())
}
