use crate::error::{PipelineError, Result};
use crate::models::AugmentReport;
use crate::utils::constants::{BLEND_ALPHA, ROTATION_ANGLES};
use crate::utils::filename::file_stem;
use crate::utils::progress::ProgressReporter;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Default)]
struct FileOutcome {
    written: usize,
    skipped_existing: usize,
    pair_skipped: bool,
    decode_failed: bool,
}

/// Augmentation stage: expand the filtered pool with deterministic geometric
/// variants and paired blending variants.
///
/// Output names derive from the source stem plus a transform tag, and a
/// variant is only written when its output file is absent, so re-running the
/// stage over an unchanged pool is a no-op. Rotation keeps the original
/// canvas size; content rotated outside the frame is clipped.
pub struct AugmentationStage {
    max_workers: usize,
    seed: u64,
}

impl AugmentationStage {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            seed: 0,
        }
    }

    /// Seed for partner selection and cut-point choice. Combined with each
    /// source stem so per-image decisions are stable across re-runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn run(
        &self,
        filtered_pool: &Path,
        augmented_pool: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<AugmentReport> {
        fs::create_dir_all(augmented_pool)?;

        let files = crate::readers::list_pool(filtered_pool)?;
        let mut report = AugmentReport {
            source_images: files.len(),
            ..Default::default()
        };

        if let Some(p) = progress {
            p.set_message(&format!("Augmenting {} images...", files.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let outcomes: Vec<Result<FileOutcome>> = pool.install(|| {
            files
                .par_iter()
                .map(|path| self.augment_file(path, &files, augmented_pool))
                .collect()
        });

        for (index, outcome) in outcomes.into_iter().enumerate() {
            let outcome = outcome?;
            report.written += outcome.written;
            report.skipped_existing += outcome.skipped_existing;
            if outcome.pair_skipped {
                report.pairs_skipped += 1;
            }
            if outcome.decode_failed {
                report.decode_failures += 1;
            }

            if let Some(p) = progress {
                p.update(index as u64 + 1);
            }
        }

        info!(
            written = report.written,
            existing = report.skipped_existing,
            "augmentation complete"
        );

        Ok(report)
    }

    fn augment_file(
        &self,
        path: &Path,
        all_files: &[PathBuf],
        output_pool: &Path,
    ) -> Result<FileOutcome> {
        let mut outcome = FileOutcome::default();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let stem = file_stem(name);

        let image = match image::open(path) {
            Ok(image) => image.to_rgb8(),
            Err(e) => {
                warn!(file = %name, error = %e, "failed to decode image");
                outcome.decode_failed = true;
                return Ok(outcome);
            }
        };

        self.write_variant(&image, stem, "original", output_pool, &mut outcome)?;

        let flipped_lr = image::imageops::flip_horizontal(&image);
        self.write_variant(&flipped_lr, stem, "flipped_lr", output_pool, &mut outcome)?;

        let flipped_ud = image::imageops::flip_vertical(&image);
        self.write_variant(&flipped_ud, stem, "flipped_ud", output_pool, &mut outcome)?;

        for angle in ROTATION_ANGLES {
            let rotated = rotate_about_center(
                &image,
                angle.to_radians(),
                Interpolation::Bilinear,
                Rgb([0u8, 0, 0]),
            );
            let tag = format!("rotated_{}", angle);
            self.write_variant(&rotated, stem, &tag, output_pool, &mut outcome)?;
        }

        // Paired variants: partner choice is derived from the stage seed and
        // the source stem, so re-runs pick the same partner.
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ stem_seed(stem));
        let partner_path = &all_files[rng.gen_range(0..all_files.len())];

        match image::open(partner_path) {
            Ok(partner) => {
                let partner = partner.to_rgb8();
                // The cut point needs an interior band on both axes
                if partner.dimensions() == image.dimensions()
                    && image.width() >= 4
                    && image.height() >= 4
                {
                    let cut = cut_merge(&image, &partner, &mut rng);
                    self.write_variant(&cut, stem, "cutmix", output_pool, &mut outcome)?;

                    let blended = alpha_blend(&image, &partner, BLEND_ALPHA);
                    self.write_variant(&blended, stem, "mixup", output_pool, &mut outcome)?;
                } else {
                    outcome.pair_skipped = true;
                }
            }
            Err(_) => outcome.pair_skipped = true,
        }

        Ok(outcome)
    }

    fn write_variant(
        &self,
        image: &RgbImage,
        stem: &str,
        tag: &str,
        output_pool: &Path,
        outcome: &mut FileOutcome,
    ) -> Result<()> {
        let output_path = output_pool.join(format!("{}_{}.jpg", stem, tag));

        if output_path.exists() {
            outcome.skipped_existing += 1;
            return Ok(());
        }

        image.save(&output_path)?;
        debug!(file = %output_path.display(), "saved augmented image");
        outcome.written += 1;

        Ok(())
    }
}

/// Rectangular cut-and-paste merge: the partner's bottom-right region, split
/// at a random interior point in the middle half of each axis, replaces the
/// primary's.
fn cut_merge(primary: &RgbImage, partner: &RgbImage, rng: &mut ChaCha8Rng) -> RgbImage {
    let (width, height) = primary.dimensions();
    let cut_x = rng.gen_range(width / 4..3 * width / 4);
    let cut_y = rng.gen_range(height / 4..3 * height / 4);

    let mut merged = primary.clone();
    for y in cut_y..height {
        for x in cut_x..width {
            merged.put_pixel(x, y, *partner.get_pixel(x, y));
        }
    }

    merged
}

/// Weighted pixel-wise blend at a fixed mixing ratio.
fn alpha_blend(primary: &RgbImage, partner: &RgbImage, alpha: f32) -> RgbImage {
    let (width, height) = primary.dimensions();
    let mut blended = RgbImage::new(width, height);

    for (x, y, pixel) in blended.enumerate_pixels_mut() {
        let a = primary.get_pixel(x, y);
        let b = partner.get_pixel(x, y);
        for channel in 0..3 {
            let value = alpha * a.0[channel] as f32 + (1.0 - alpha) * b.0[channel] as f32;
            pixel.0[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    blended
}

/// Stable per-stem seed component.
fn stem_seed(stem: &str) -> u64 {
    let digest = Sha256::digest(stem.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
