use crate::dedup::{image_fingerprint, FingerprintStore};
use crate::error::{PipelineError, Result};
use crate::models::FilterReport;
use crate::processors::SkyClassifier;
use crate::utils::filename::has_image_extension;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

enum FileOutcome {
    NonImage,
    DecodeFailed(String),
    Analyzed {
        path: PathBuf,
        name: String,
        fingerprint: String,
        is_sky: bool,
    },
}

/// Filtering stage: re-deduplicate the raw pool at the decoded-pixel level
/// and keep only images the sky classifier accepts.
///
/// Decode and classification fan out across a rayon pool; the dedup gate runs
/// afterwards in sorted-filename order, so the first of two visually identical
/// files always wins regardless of scheduling.
pub struct FilteringStage {
    max_workers: usize,
    classifier: SkyClassifier,
}

impl FilteringStage {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            classifier: SkyClassifier::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: SkyClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn run(
        &self,
        raw_pool: &Path,
        filtered_pool: &Path,
        store: &mut FingerprintStore,
        progress: Option<&ProgressReporter>,
    ) -> Result<FilterReport> {
        fs::create_dir_all(filtered_pool)?;

        let mut files: Vec<PathBuf> = fs::read_dir(raw_pool)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut report = FilterReport {
            total_files: files.len(),
            ..Default::default()
        };

        if let Some(p) = progress {
            p.set_message(&format!("Analyzing {} files...", files.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .map(|path| self.analyze_file(path))
                .collect()
        });

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                FileOutcome::NonImage => report.non_image += 1,
                FileOutcome::DecodeFailed(name) => {
                    warn!(file = %name, "failed to decode image");
                    report.decode_failures += 1;
                }
                FileOutcome::Analyzed {
                    path,
                    name,
                    fingerprint,
                    is_sky,
                } => {
                    if !store.insert(fingerprint) {
                        debug!(file = %name, "duplicate image skipped");
                        report.duplicates += 1;
                    } else if is_sky {
                        fs::copy(&path, filtered_pool.join(&name))?;
                        debug!(file = %name, "sky image retained");
                        report.accepted += 1;
                    } else {
                        debug!(file = %name, "non-sky image dropped");
                        report.rejected += 1;
                    }
                }
            }

            if let Some(p) = progress {
                p.update(index as u64 + 1);
            }
        }

        store.flush()?;

        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            duplicates = report.duplicates,
            "filtering complete"
        );

        Ok(report)
    }

    fn analyze_file(&self, path: &Path) -> FileOutcome {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if !has_image_extension(path) {
            return FileOutcome::NonImage;
        }

        let image = match image::open(path) {
            Ok(image) => image,
            Err(_) => return FileOutcome::DecodeFailed(name),
        };

        FileOutcome::Analyzed {
            path: path.to_path_buf(),
            fingerprint: image_fingerprint(&image),
            is_sky: self.classifier.is_sky(&image),
            name,
        }
    }
}
