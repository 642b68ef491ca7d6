use std::collections::BTreeMap;

/// Outcome counts for one acquisition task (source x district).
#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    pub target: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub fetch_failures: usize,
    pub pages: u32,
}

impl TaskReport {
    pub fn reached_target(&self) -> bool {
        self.accepted >= self.target
    }
}

/// Aggregate report for an acquisition run.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionReport {
    pub tasks: BTreeMap<(String, String), TaskReport>,
}

impl AcquisitionReport {
    pub fn total_accepted(&self) -> usize {
        self.tasks.values().map(|t| t.accepted).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.tasks.values().map(|t| t.duplicates).sum()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Acquisition Report ===\n");
        summary.push_str(&format!(
            "Accepted: {}, Duplicates: {}\n",
            self.total_accepted(),
            self.total_duplicates()
        ));

        for ((source, district), task) in &self.tasks {
            let status = if task.reached_target() {
                "ok"
            } else {
                "short"
            };
            summary.push_str(&format!(
                "  {:>9} / {:<16} accepted {}/{} (dup {}, failed {}, pages {}) [{}]\n",
                source,
                district,
                task.accepted,
                task.target,
                task.duplicates,
                task.fetch_failures,
                task.pages,
                status
            ));
        }

        summary
    }
}

/// Report for the filtering stage.
#[derive(Debug, Clone, Default)]
pub struct FilterReport {
    pub total_files: usize,
    pub non_image: usize,
    pub decode_failures: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub accepted: usize,
}

impl FilterReport {
    pub fn summary(&self) -> String {
        format!(
            "=== Filter Report ===\n\
             Total files: {}\n\
             Accepted (sky): {}\n\
             Rejected (non-sky): {}\n\
             Duplicates: {}\n\
             Decode failures: {}\n\
             Non-image files: {}\n",
            self.total_files,
            self.accepted,
            self.rejected,
            self.duplicates,
            self.decode_failures,
            self.non_image
        )
    }
}

/// Report for the augmentation stage.
#[derive(Debug, Clone, Default)]
pub struct AugmentReport {
    pub source_images: usize,
    pub decode_failures: usize,
    pub written: usize,
    pub skipped_existing: usize,
    pub pairs_skipped: usize,
}

impl AugmentReport {
    pub fn summary(&self) -> String {
        format!(
            "=== Augmentation Report ===\n\
             Source images: {}\n\
             Variants written: {}\n\
             Already present: {}\n\
             Pairings skipped (dimension mismatch): {}\n\
             Decode failures: {}\n",
            self.source_images,
            self.written,
            self.skipped_existing,
            self.pairs_skipped,
            self.decode_failures
        )
    }
}

/// Report for the AQI join stage.
#[derive(Debug, Clone, Default)]
pub struct JoinReport {
    pub total_images: usize,
    pub no_district: usize,
    pub no_station_match: usize,
    pub no_label: usize,
    pub mapped: usize,
}

impl JoinReport {
    pub fn dropped(&self) -> usize {
        self.no_district + self.no_station_match + self.no_label
    }

    pub fn summary(&self) -> String {
        format!(
            "=== Join Report ===\n\
             Images scanned: {}\n\
             Mapped: {}\n\
             No district token: {}\n\
             No station match: {}\n\
             No PM2.5 label: {}\n",
            self.total_images, self.mapped, self.no_district, self.no_station_match, self.no_label
        )
    }
}

/// Report for dataset materialization.
#[derive(Debug, Clone, Default)]
pub struct PrepareReport {
    pub mapping_rows: usize,
    pub missing_files: usize,
    pub decode_failures: usize,
    pub valid_pairs: usize,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

impl PrepareReport {
    pub fn summary(&self) -> String {
        format!(
            "=== Prepare Report ===\n\
             Mapping rows: {}\n\
             Valid pairs: {}\n\
             Missing files: {}\n\
             Decode failures: {}\n\
             Split: train {}, validation {}, test {}\n",
            self.mapping_rows,
            self.valid_pairs,
            self.missing_files,
            self.decode_failures,
            self.train,
            self.validation,
            self.test
        )
    }
}
