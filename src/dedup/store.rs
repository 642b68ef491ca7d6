use crate::error::Result;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A persisted set of content fingerprints, one hex digest per line.
///
/// Loaded at stage start and rewritten wholesale at stage end. The rewrite
/// goes through a sibling temp file and a rename so a crash mid-flush leaves
/// the previous store intact.
#[derive(Debug)]
pub struct FingerprintStore {
    path: PathBuf,
    fingerprints: HashSet<String>,
}

impl FingerprintStore {
    /// Load the store from disk; a missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let mut fingerprints = HashSet::new();

        if path.exists() {
            let file = File::open(path)?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    fingerprints.insert(trimmed.to_string());
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            fingerprints,
        })
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    /// Insert a fingerprint, returning `false` if it was already present.
    pub fn insert(&mut self, fingerprint: String) -> bool {
        self.fingerprints.insert(fingerprint)
    }

    /// Merge fingerprints collected by parallel workers.
    pub fn merge<I: IntoIterator<Item = String>>(&mut self, fingerprints: I) {
        self.fingerprints.extend(fingerprints);
    }

    /// Clone the current membership for read-only use by workers.
    pub fn snapshot(&self) -> HashSet<String> {
        self.fingerprints.clone()
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Rewrite the store on disk.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for fingerprint in &self.fingerprints {
                writeln!(writer, "{}", fingerprint)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FingerprintStore::load(&dir.path().join("absent.txt")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_and_contains() {
        let dir = TempDir::new().unwrap();
        let mut store = FingerprintStore::load(&dir.path().join("fp.txt")).unwrap();

        assert!(store.insert("abc123".to_string()));
        assert!(!store.insert("abc123".to_string()));
        assert!(store.contains("abc123"));
        assert!(!store.contains("def456"));
    }

    #[test]
    fn test_flush_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fp.txt");

        let mut store = FingerprintStore::load(&path).unwrap();
        store.insert("aaa".to_string());
        store.insert("bbb".to_string());
        store.flush().unwrap();

        let reloaded = FingerprintStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("aaa"));
        assert!(reloaded.contains("bbb"));
    }

    #[test]
    fn test_merge_from_workers() {
        let dir = TempDir::new().unwrap();
        let mut store = FingerprintStore::load(&dir.path().join("fp.txt")).unwrap();
        store.insert("shared".to_string());

        store.merge(vec!["shared".to_string(), "worker1".to_string()]);
        store.merge(vec!["worker2".to_string()]);

        assert_eq!(store.len(), 3);
    }
}
