use crate::dedup::{payload_fingerprint, FingerprintStore};
use crate::error::{PipelineError, Result};
use crate::fetchers::{ImageSource, SearchPage};
use crate::models::{AcquisitionReport, TaskReport};
use crate::utils::constants::QUERY_TAG;
use crate::utils::filename::pool_filename;
use crate::utils::progress::ProgressReporter;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Acquisition stage: paginate each source for each district until the target
/// count is reached or the source runs dry, deduplicating payloads against
/// the persisted fingerprint store.
///
/// Tasks are independent (source x district) units scheduled on tokio with a
/// bounded permit pool. Each worker dedups against a start-of-run snapshot
/// plus its own additions; new fingerprints merge into the store after all
/// tasks complete, and the store is flushed once at end of run. Workers never
/// share an output namespace, so the post-hoc merge cannot lose a name.
pub struct AcquisitionStage {
    max_workers: usize,
}

impl AcquisitionStage {
    pub fn new(max_workers: usize) -> Self {
        Self { max_workers }
    }

    pub async fn run(
        &self,
        sources: &[Arc<dyn ImageSource>],
        districts: &[String],
        target_per_task: usize,
        raw_pool: &Path,
        store: &mut FingerprintStore,
        progress: Option<&ProgressReporter>,
    ) -> Result<AcquisitionReport> {
        std::fs::create_dir_all(raw_pool)?;

        let snapshot = Arc::new(store.snapshot());
        let semaphore = Arc::new(Semaphore::new(self.max_workers.max(1)));
        let total_tasks = sources.len() * districts.len();

        if let Some(p) = progress {
            p.set_message(&format!("Running {} acquisition tasks...", total_tasks));
        }

        let mut handles = Vec::with_capacity(total_tasks);
        for source in sources {
            for district in districts {
                let source = source.clone();
                let district = district.clone();
                let snapshot = snapshot.clone();
                let semaphore = semaphore.clone();
                let pool = raw_pool.to_path_buf();

                handles.push(tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| PipelineError::Config(e.to_string()))?;
                    run_task(source, district, target_per_task, pool, snapshot).await
                }));
            }
        }

        let mut report = AcquisitionReport::default();
        for (index, handle) in handles.into_iter().enumerate() {
            let (key, task, fingerprints) = handle.await??;
            store.merge(fingerprints);
            report.tasks.insert(key, task);

            if let Some(p) = progress {
                p.update(index as u64 + 1);
            }
        }

        store.flush()?;

        info!(
            accepted = report.total_accepted(),
            duplicates = report.total_duplicates(),
            "acquisition complete"
        );

        Ok(report)
    }
}

type TaskResult = Result<((String, String), TaskReport, Vec<String>)>;

async fn run_task(
    source: Arc<dyn ImageSource>,
    district: String,
    target: usize,
    pool: PathBuf,
    seen: Arc<HashSet<String>>,
) -> TaskResult {
    let mut task = TaskReport {
        target,
        ..Default::default()
    };
    let mut accepted_fingerprints: HashSet<String> = HashSet::new();
    let mut page = 1u32;

    'pages: while task.accepted < target {
        let urls = match source.search_page(&district, page).await? {
            SearchPage::Items(urls) => urls,
            SearchPage::Exhausted => {
                debug!(source = source.name(), %district, page, "source exhausted");
                break;
            }
            SearchPage::RateLimited => {
                warn!(
                    source = source.name(),
                    %district, "rate limited, ending query early"
                );
                break;
            }
        };
        task.pages += 1;

        for url in urls {
            if task.accepted >= target {
                break 'pages;
            }

            let payload = match source.fetch_payload(&url).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(source = source.name(), %url, error = %e, "fetch failed, skipping");
                    task.fetch_failures += 1;
                    continue;
                }
            };

            let fingerprint = payload_fingerprint(&payload);
            if seen.contains(&fingerprint) || accepted_fingerprints.contains(&fingerprint) {
                debug!(source = source.name(), %district, %url, "duplicate payload skipped");
                task.duplicates += 1;
                continue;
            }

            let name = pool_filename(source.name(), &district, QUERY_TAG, task.accepted);
            tokio::fs::write(pool.join(&name), &payload).await?;
            accepted_fingerprints.insert(fingerprint);
            task.accepted += 1;
            info!(source = source.name(), %district, file = %name, "downloaded image");
        }

        page += 1;
    }

    if !task.reached_target() {
        info!(
            source = source.name(),
            %district,
            accepted = task.accepted,
            target,
            "task ended with short count"
        );
    }

    Ok((
        (source.name().to_string(), district),
        task,
        accepted_fingerprints.into_iter().collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Source serving one page of synthetic payload URLs, then exhaustion.
    struct StubSource {
        payloads: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl ImageSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn search_page(&self, _district: &str, page: u32) -> Result<SearchPage> {
            if page == 1 {
                Ok(SearchPage::Items(
                    (0..self.payloads.len()).map(|i| format!("p{}", i)).collect(),
                ))
            } else {
                Ok(SearchPage::Exhausted)
            }
        }

        async fn fetch_payload(&self, url: &str) -> Result<Vec<u8>> {
            let index: usize = url[1..].parse().unwrap();
            Ok(self.payloads[index].clone())
        }
    }

    fn districts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_accepts_and_names_payloads() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("images");
        let mut store = FingerprintStore::load(&dir.path().join("fp.txt")).unwrap();

        let source: Arc<dyn ImageSource> = Arc::new(StubSource {
            payloads: vec![b"one".to_vec(), b"two".to_vec()],
        });

        let report = AcquisitionStage::new(2)
            .run(
                &[source],
                &districts(&["Gangnam-gu"]),
                10,
                &pool,
                &mut store,
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.total_accepted(), 2);
        assert!(pool.join("stub_Gangnam-gu_sky_00000.jpg").exists());
        assert!(pool.join("stub_Gangnam-gu_sky_00001.jpg").exists());

        // Short count is reported, not an error
        let task = &report.tasks[&("stub".to_string(), "Gangnam-gu".to_string())];
        assert!(!task.reached_target());
    }

    #[tokio::test]
    async fn test_duplicate_payloads_are_skipped() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("images");
        let mut store = FingerprintStore::load(&dir.path().join("fp.txt")).unwrap();

        let source: Arc<dyn ImageSource> = Arc::new(StubSource {
            payloads: vec![b"same".to_vec(), b"same".to_vec(), b"other".to_vec()],
        });

        let report = AcquisitionStage::new(1)
            .run(
                &[source],
                &districts(&["Mapo-gu"]),
                10,
                &pool,
                &mut store,
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.total_accepted(), 2);
        assert_eq!(report.total_duplicates(), 1);
    }

    #[tokio::test]
    async fn test_persisted_fingerprints_reject_across_runs() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("images");
        let store_path = dir.path().join("fp.txt");

        let make_source = || -> Arc<dyn ImageSource> {
            Arc::new(StubSource {
                payloads: vec![b"payload".to_vec()],
            })
        };

        {
            let mut store = FingerprintStore::load(&store_path).unwrap();
            let report = AcquisitionStage::new(1)
                .run(
                    &[make_source()],
                    &districts(&["Jongno-gu"]),
                    5,
                    &pool,
                    &mut store,
                    None,
                )
                .await
                .unwrap();
            assert_eq!(report.total_accepted(), 1);
        }

        // Fresh invocation loads the flushed store and rejects the payload
        {
            let mut store = FingerprintStore::load(&store_path).unwrap();
            assert_eq!(store.len(), 1);
            let report = AcquisitionStage::new(1)
                .run(
                    &[make_source()],
                    &districts(&["Jongno-gu"]),
                    5,
                    &pool,
                    &mut store,
                    None,
                )
                .await
                .unwrap();
            assert_eq!(report.total_accepted(), 0);
            assert_eq!(report.total_duplicates(), 1);
        }
    }

    #[tokio::test]
    async fn test_stops_at_target_count() {
        let dir = TempDir::new().unwrap();
        let pool = dir.path().join("images");
        let mut store = FingerprintStore::load(&dir.path().join("fp.txt")).unwrap();

        let source: Arc<dyn ImageSource> = Arc::new(StubSource {
            payloads: vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
        });

        let report = AcquisitionStage::new(1)
            .run(
                &[source],
                &districts(&["Guro-gu"]),
                2,
                &pool,
                &mut store,
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.total_accepted(), 2);
        let task = &report.tasks[&("stub".to_string(), "Guro-gu".to_string())];
        assert!(task.reached_target());
    }
}
