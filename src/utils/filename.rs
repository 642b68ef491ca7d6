use crate::utils::constants::IMAGE_EXTENSIONS;
use std::path::Path;

/// District suffix marker for Seoul administrative districts
const DISTRICT_MARKER: &str = "-gu";

/// Extract the district token from a pool filename.
///
/// Pool files are named `{source}_{district}_{tag}_{seq}.{ext}`, e.g.
/// `unsplash_Gangbuk-gu_sky_25.jpg`. The first `_`-separated token containing
/// the district marker wins; filenames without one yield `None`.
pub fn extract_district(filename: &str) -> Option<&str> {
    filename
        .split('_')
        .find(|part| part.contains(DISTRICT_MARKER))
}

/// Generate a pool filename: `{source}_{district}_{tag}_{seq:05}.jpg`
pub fn pool_filename(source: &str, district: &str, tag: &str, seq: usize) -> String {
    format!("{}_{}_{}_{:05}.jpg", source, district, tag, seq)
}

/// Whether a path carries an extension the pipeline treats as an image
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|&e| e == ext)
        })
        .unwrap_or(false)
}

/// File stem without extension, for deriving augmentation output names
pub fn file_stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename)
}
