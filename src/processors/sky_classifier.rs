use crate::utils::constants::{DEFAULT_BLUE_THRESHOLD, DEFAULT_CLOUD_THRESHOLD};
use image::DynamicImage;

/// Heuristic sky detector over an image's color distribution.
///
/// Works in HSV using OpenCV's value scale (hue 0-180, saturation and value
/// 0-255) so the band constants match the conventional ranges: blue sky is
/// hue 90-130 with enough saturation and brightness, cloud cover is
/// low-saturation high-value. An image counts as sky when either fraction
/// clears its threshold. This is a coarse pre-filter, not ground truth;
/// misclassifications are expected and tolerated.
pub struct SkyClassifier {
    blue_threshold: f64,
    cloud_threshold: f64,
}

impl SkyClassifier {
    pub fn new() -> Self {
        Self {
            blue_threshold: DEFAULT_BLUE_THRESHOLD,
            cloud_threshold: DEFAULT_CLOUD_THRESHOLD,
        }
    }

    pub fn with_thresholds(blue_threshold: f64, cloud_threshold: f64) -> Self {
        Self {
            blue_threshold,
            cloud_threshold,
        }
    }

    /// Deterministic: the same image bytes always yield the same answer.
    pub fn is_sky(&self, image: &DynamicImage) -> bool {
        let rgb = image.to_rgb8();
        let total = (rgb.width() as u64 * rgb.height() as u64) as f64;
        if total == 0.0 {
            return false;
        }

        let mut blue_pixels = 0u64;
        let mut white_pixels = 0u64;

        for pixel in rgb.pixels() {
            let (h, s, v) = rgb_to_hsv(pixel.0);

            if (90.0..=130.0).contains(&h) && s >= 50.0 && v >= 50.0 {
                blue_pixels += 1;
            }
            if s <= 30.0 && v >= 200.0 {
                white_pixels += 1;
            }
        }

        let blue_ratio = blue_pixels as f64 / total;
        let white_ratio = white_pixels as f64 / total;

        blue_ratio >= self.blue_threshold || white_ratio >= self.cloud_threshold
    }
}

impl Default for SkyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// RGB to HSV on OpenCV's scale: hue in [0, 180), saturation and value in
/// [0, 255].
fn rgb_to_hsv([r, g, b]: [u8; 3]) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue_degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    (hue_degrees / 2.0, saturation * 255.0, max * 255.0)
}
