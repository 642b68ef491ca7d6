use crate::error::{PipelineError, Result};
use crate::models::{MappingRow, PrepareReport};
use crate::utils::constants::{DEFAULT_SPLIT_SEED, MIN_SPLIT_SAMPLES, TARGET_EDGE, TRAIN_RATIO};
use crate::utils::progress::ProgressReporter;
use crate::writers::DatasetSplit;
use image::imageops::FilterType;
use image::RgbImage;
use ndarray::{Array1, Array4};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

enum RowOutcome {
    Missing(String),
    DecodeFailed(String),
    Pair(Box<RgbImage>, f32),
}

/// The materialized dataset: three disjoint splits plus the pre-split corpus.
pub struct MaterializedDataset {
    pub train: DatasetSplit,
    pub validation: DatasetSplit,
    pub test: DatasetSplit,
    pub corpus_images: Array4<u8>,
    pub corpus_labels: Array1<f32>,
    pub report: PrepareReport,
}

/// Dataset materializer: resolve mapping rows to decoded, resized image
/// tensors and partition them into train/validation/test.
///
/// Rows that fail to resolve (file missing from every pool, undecodable
/// bytes) are dropped with a warning. The split is a seeded shuffle, so the
/// same seed over the same row ordering reproduces the same partition.
pub struct DatasetMaterializer {
    max_workers: usize,
    seed: u64,
}

impl DatasetMaterializer {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            seed: DEFAULT_SPLIT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn materialize(
        &self,
        rows: &[MappingRow],
        pools: &[&Path],
        progress: Option<&ProgressReporter>,
    ) -> Result<MaterializedDataset> {
        let mut report = PrepareReport {
            mapping_rows: rows.len(),
            ..Default::default()
        };

        if let Some(p) = progress {
            p.set_message(&format!("Resolving {} mapping rows...", rows.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let outcomes: Vec<RowOutcome> = pool.install(|| {
            rows.par_iter()
                .map(|row| resolve_row(row, pools))
                .collect()
        });

        let mut pairs: Vec<(Box<RgbImage>, f32)> = Vec::with_capacity(rows.len());
        for outcome in outcomes {
            match outcome {
                RowOutcome::Missing(name) => {
                    warn!(file = %name, "image not found in any pool, dropping row");
                    report.missing_files += 1;
                }
                RowOutcome::DecodeFailed(name) => {
                    warn!(file = %name, "failed to decode image, dropping row");
                    report.decode_failures += 1;
                }
                RowOutcome::Pair(image, label) => pairs.push((image, label)),
            }
        }

        report.valid_pairs = pairs.len();
        if pairs.len() < MIN_SPLIT_SAMPLES {
            return Err(PipelineError::InsufficientSamples {
                found: pairs.len(),
                required: MIN_SPLIT_SAMPLES,
            });
        }

        let (train_idx, val_idx, test_idx) = split_indices(pairs.len(), self.seed);
        report.train = train_idx.len();
        report.validation = val_idx.len();
        report.test = test_idx.len();

        let corpus_images = stack_images(pairs.iter().map(|(image, _)| image.as_ref()))?;
        let corpus_labels = Array1::from_iter(pairs.iter().map(|&(_, label)| label));

        let dataset = MaterializedDataset {
            train: select_split(&pairs, &train_idx)?,
            validation: select_split(&pairs, &val_idx)?,
            test: select_split(&pairs, &test_idx)?,
            corpus_images,
            corpus_labels,
            report,
        };

        info!(
            train = dataset.train.len(),
            validation = dataset.validation.len(),
            test = dataset.test.len(),
            "materialization complete"
        );

        Ok(dataset)
    }
}

fn resolve_row(row: &MappingRow, pools: &[&Path]) -> RowOutcome {
    // First pool containing the filename wins
    let Some(path) = pools
        .iter()
        .map(|pool| pool.join(&row.image_name))
        .find(|path| path.exists())
    else {
        return RowOutcome::Missing(row.image_name.clone());
    };

    let image = match image::open(&path) {
        Ok(image) => image,
        Err(_) => return RowOutcome::DecodeFailed(row.image_name.clone()),
    };

    let resized = image
        .resize_exact(TARGET_EDGE, TARGET_EDGE, FilterType::Triangle)
        .to_rgb8();

    RowOutcome::Pair(Box::new(resized), row.pm25 as f32)
}

/// Partition `0..n` into train/validation/test index sets with a seeded
/// shuffle.
///
/// Rounding rule: train takes `round(0.7 * n)`, validation takes the floor
/// half of the remainder, test takes the rest. For n = 3 that is (2, 0, 1).
pub fn split_indices(n: usize, seed: u64) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_len = ((n as f64) * TRAIN_RATIO).round().min(n as f64) as usize;
    let val_len = (n - train_len) / 2;

    let train = indices[..train_len].to_vec();
    let validation = indices[train_len..train_len + val_len].to_vec();
    let test = indices[train_len + val_len..].to_vec();

    (train, validation, test)
}

fn select_split(pairs: &[(Box<RgbImage>, f32)], indices: &[usize]) -> Result<DatasetSplit> {
    let images = stack_images(indices.iter().map(|&i| pairs[i].0.as_ref()))?;
    let labels = Array1::from_iter(indices.iter().map(|&i| pairs[i].1));
    Ok(DatasetSplit { images, labels })
}

fn stack_images<'a, I>(images: I) -> Result<Array4<u8>>
where
    I: Iterator<Item = &'a RgbImage>,
{
    let edge = TARGET_EDGE as usize;
    let mut count = 0;
    let mut flat: Vec<u8> = Vec::new();

    for image in images {
        flat.extend_from_slice(image.as_raw());
        count += 1;
    }

    Ok(Array4::from_shape_vec((count, edge, edge, 3), flat)?)
}
