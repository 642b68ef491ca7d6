use crate::error::{PipelineError, Result};
use crate::models::{AqiRecord, JoinReport, MappingRow};
use crate::readers::pool_filenames;
use crate::utils::filename::extract_district;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// AQI joiner: associate every pooled image with the air-quality record of
/// the district named in its filename.
///
/// The join is silently lossy by design. Images without a district token,
/// without a matching station, or whose station lacks a PM2.5 reading are
/// warned about and dropped; only the configurable drop-ratio guard can turn
/// loss into a failure.
pub struct AqiJoiner {
    max_drop_ratio: Option<f64>,
}

impl AqiJoiner {
    pub fn new() -> Self {
        Self {
            max_drop_ratio: None,
        }
    }

    /// Fail the stage when more than this fraction of scanned images drops
    /// out of the join.
    pub fn with_max_drop_ratio(mut self, max_drop_ratio: Option<f64>) -> Self {
        self.max_drop_ratio = max_drop_ratio;
        self
    }

    pub fn join(
        &self,
        pools: &[&Path],
        aqi_records: &[AqiRecord],
    ) -> Result<(Vec<MappingRow>, JoinReport)> {
        let mut rows = Vec::new();
        let mut report = JoinReport::default();

        for pool in pools {
            for name in pool_filenames(pool)? {
                report.total_images += 1;

                let Some(district) = extract_district(&name) else {
                    warn!(file = %name, "no district token in filename");
                    report.no_district += 1;
                    continue;
                };

                // First match in table order wins
                let Some(record) = aqi_records
                    .iter()
                    .find(|record| record.matches_district(district))
                else {
                    warn!(district, file = %name, "no AQI station match");
                    report.no_station_match += 1;
                    continue;
                };

                match MappingRow::from_match(&name, record) {
                    Some(row) => {
                        rows.push(row);
                        report.mapped += 1;
                    }
                    None => {
                        warn!(station = %record.station, file = %name, "station has no PM2.5 reading");
                        report.no_label += 1;
                    }
                }
            }
        }

        if let Some(max_ratio) = self.max_drop_ratio {
            let dropped = report.dropped();
            if report.total_images > 0
                && dropped as f64 / report.total_images as f64 > max_ratio
            {
                return Err(PipelineError::DropRatioExceeded {
                    dropped,
                    total: report.total_images,
                    max_ratio,
                });
            }
        }

        info!(
            mapped = report.mapped,
            dropped = report.dropped(),
            "join complete"
        );

        Ok((rows, report))
    }

    /// Restrict an existing mapping to rows whose image is still present in
    /// the given pool. Returns the surviving rows and the number removed.
    pub fn refresh_mapping(
        &self,
        rows: Vec<MappingRow>,
        pool: &Path,
    ) -> Result<(Vec<MappingRow>, usize)> {
        let present: HashSet<String> = pool_filenames(pool)?.into_iter().collect();
        let before = rows.len();

        let surviving: Vec<MappingRow> = rows
            .into_iter()
            .filter(|row| present.contains(&row.image_name))
            .collect();

        let removed = before - surviving.len();
        info!(kept = surviving.len(), removed, "mapping refreshed");

        Ok((surviving, removed))
    }
}

impl Default for AqiJoiner {
    fn default() -> Self {
        Self::new()
    }
}
